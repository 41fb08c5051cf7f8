//! Domain types for the Roster people registry: people and their influencer
//! profiles, record identifiers, accounts, and the store traits every backend
//! implements.
//!
//! No HTTP or database dependencies live here.

pub mod account;
pub mod error;
pub mod input;
pub mod person;
pub mod record_id;
pub mod store;

pub use error::{Classify, Error, ErrorKind, Result};
