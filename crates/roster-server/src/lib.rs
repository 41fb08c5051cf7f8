//! Roster server: configuration and the import job behind the `roster`
//! binary.

pub mod config;
pub mod import;

pub use config::{ImportConfig, ServerConfig};
pub use import::{ImportError, ImportReport, RawPersonRow, read_rows, run_import};
