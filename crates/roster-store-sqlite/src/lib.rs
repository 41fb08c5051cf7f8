//! SQLite backend for the Roster people registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each write is one transaction spanning
//! the person row and its influencer profile.

mod encode;
mod people;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
