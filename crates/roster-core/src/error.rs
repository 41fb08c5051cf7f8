//! Error types for `roster-core`.

use thiserror::Error;

use crate::person::PersonType;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(i64),

  #[error("unknown person type {0:?}; expected \"INF\" or \"IND\"")]
  UnknownPersonType(String),

  #[error("person type is required")]
  MissingPersonType,

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("invalid date {0:?}")]
  InvalidDate(String),

  #[error("malformed record id: {0:?}")]
  MalformedRecordId(String),

  #[error("record id {0} already exists")]
  DuplicateRecordId(String),

  #[error("account already exists")]
  DuplicateAccount,

  #[error("could not allocate a {0} record id after repeated conflicts")]
  AllocationExhausted(PersonType),

  #[error("the {0} record id sequence is full")]
  SequenceFull(PersonType),

  #[error("{0}")]
  InvalidArgument(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse failure category shared by every layer. The HTTP boundary maps each
/// kind to exactly one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  InvalidArgument,
  NotFound,
  Conflict,
  Internal,
}

/// Implemented by every error that can cross the store boundary.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::PersonNotFound(_) => ErrorKind::NotFound,
      Self::UnknownPersonType(_)
      | Self::MissingPersonType
      | Self::UnknownRole(_)
      | Self::InvalidDate(_)
      | Self::MalformedRecordId(_)
      | Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
      Self::DuplicateRecordId(_)
      | Self::DuplicateAccount
      | Self::AllocationExhausted(_)
      | Self::SequenceFull(_) => ErrorKind::Conflict,
    }
  }
}
