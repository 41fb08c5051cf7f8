//! Human-readable record identifiers of the form `"{TYPE}-{NNN}"`.
//!
//! Each person type has its own independent sequence. Numbers are zero-padded
//! to three digits but the width is not fixed: the successor of `IND-999` is
//! `IND-1000`. Ordering is always numeric, never lexicographic.
//!
//! Numbers above [`MAX_NUMBER`] are rejected, so a sequence that reaches the
//! cap stops allocating rather than wrapping or repeating itself.

use std::{fmt, str::FromStr};

use crate::{Error, Result, person::PersonType};

/// Largest number a record identifier may carry.
pub const MAX_NUMBER: u64 = 999_999_999;

/// A parsed record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
  pub kind:   PersonType,
  pub number: u64,
}

impl RecordId {
  /// The first identifier in `kind`'s sequence.
  pub fn first(kind: PersonType) -> Self { Self { kind, number: 1 } }

  /// The next identifier in the same sequence, or `None` at [`MAX_NUMBER`].
  pub fn successor(self) -> Option<Self> {
    (self.number < MAX_NUMBER)
      .then(|| Self { kind: self.kind, number: self.number + 1 })
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{:03}", self.kind.code(), self.number)
  }
}

impl FromStr for RecordId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let malformed = || Error::MalformedRecordId(s.to_owned());

    let (prefix, digits) = s.split_once('-').ok_or_else(malformed)?;
    let kind = PersonType::from_str(prefix).map_err(|_| malformed())?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
      return Err(malformed());
    }
    let number: u64 = digits.parse().map_err(|_| malformed())?;
    if number > MAX_NUMBER {
      return Err(malformed());
    }

    Ok(Self { kind, number })
  }
}

/// Compute the next identifier in `kind`'s sequence given the identifiers
/// already in use.
///
/// Identifiers from other sequences, and identifiers that do not parse, are
/// ignored. Returns `None` once the sequence has reached [`MAX_NUMBER`].
pub fn next_record_id<'a>(
  kind: PersonType,
  existing: impl IntoIterator<Item = &'a str>,
) -> Option<RecordId> {
  let highest = existing
    .into_iter()
    .filter_map(|s| s.parse::<RecordId>().ok())
    .filter(|id| id.kind == kind)
    .max_by_key(|id| id.number);

  match highest {
    Some(id) => id.successor(),
    None => Some(RecordId::first(kind)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn formats_with_three_digit_padding() {
    assert_eq!(RecordId::first(PersonType::Individual).to_string(), "IND-001");
    let id = RecordId { kind: PersonType::Influencer, number: 42 };
    assert_eq!(id.to_string(), "INF-042");
  }

  #[test]
  fn grows_past_three_digits() {
    let id = RecordId { kind: PersonType::Individual, number: 999 };
    assert_eq!(id.successor().unwrap().to_string(), "IND-1000");
  }

  #[test]
  fn successor_stops_at_the_cap() {
    let last = RecordId { kind: PersonType::Individual, number: MAX_NUMBER };
    assert_eq!(last.successor(), None);
  }

  #[test]
  fn rejects_numbers_above_the_cap() {
    let at_cap: RecordId = "IND-999999999".parse().unwrap();
    assert_eq!(at_cap.number, MAX_NUMBER);

    for bad in ["IND-1000000000", "IND-18446744073709551615", "INF-99999999999999999999"] {
      assert!(
        matches!(bad.parse::<RecordId>(), Err(Error::MalformedRecordId(_))),
        "{bad:?} should not parse"
      );
    }
  }

  #[test]
  fn parses_valid_identifiers() {
    let id: RecordId = "INF-1203".parse().unwrap();
    assert_eq!(id.kind, PersonType::Influencer);
    assert_eq!(id.number, 1203);
  }

  #[test]
  fn rejects_malformed_identifiers() {
    for bad in ["", "IND", "IND-", "XYZ-001", "IND-00a", "IND--1", "ind-001"] {
      assert!(
        matches!(bad.parse::<RecordId>(), Err(Error::MalformedRecordId(_))),
        "{bad:?} should not parse"
      );
    }
  }

  #[test]
  fn next_on_empty_sequence_is_first() {
    let next = next_record_id(PersonType::Influencer, []).unwrap();
    assert_eq!(next.to_string(), "INF-001");
  }

  #[test]
  fn next_orders_numerically_not_lexically() {
    let existing = ["IND-999", "IND-1000", "IND-002"];
    let next = next_record_id(PersonType::Individual, existing).unwrap();
    assert_eq!(next.to_string(), "IND-1001");
  }

  #[test]
  fn next_ignores_other_sequences_and_garbage() {
    let existing = ["INF-050", "IND-003", "legacy-17", "IND-x"];
    let next = next_record_id(PersonType::Individual, existing).unwrap();
    assert_eq!(next.to_string(), "IND-004");
  }

  #[test]
  fn next_is_none_once_the_sequence_is_full() {
    let existing = ["IND-999999999", "INF-002"];
    assert_eq!(next_record_id(PersonType::Individual, existing), None);
    assert_eq!(
      next_record_id(PersonType::Influencer, existing).map(|id| id.to_string()),
      Some("INF-003".into())
    );
  }
}
