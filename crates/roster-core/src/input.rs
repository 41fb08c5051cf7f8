//! Statically declared write inputs and their validation.
//!
//! Request bodies deserialise into [`PersonInput`], which keeps the type and
//! date fields as raw strings. [`PersonInput::validate`] turns it into typed
//! values before anything reaches the store.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::{
  Error, Result,
  person::{PersonFields, PersonType, ProfileFields},
};

/// Parse an optional date string.
///
/// Absent, empty and whitespace-only values become `None`. Accepts plain
/// `YYYY-MM-DD` dates and RFC 3339 timestamps (the date part is kept).
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
  let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
    return Ok(None);
  };

  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(Some(date));
  }
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| Some(dt.date_naive()))
    .map_err(|_| Error::InvalidDate(raw.to_owned()))
}

/// Parse the person type discriminator.
pub fn parse_person_type(value: Option<&str>) -> Result<PersonType> {
  let raw = value.ok_or(Error::MissingPersonType)?;
  PersonType::from_str(raw).map_err(|_| Error::UnknownPersonType(raw.to_owned()))
}

/// Body accepted by create and update. Person fields and profile fields
/// arrive side by side; profile fields are ignored for individuals.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
  #[serde(rename = "type")]
  pub kind:                      Option<String>,

  pub full_name:                 Option<String>,
  pub preferred_name:            Option<String>,
  pub gender:                    Option<String>,
  pub birth_date:                Option<String>,
  pub email:                     Option<String>,
  pub phone:                     Option<String>,
  pub city:                      Option<String>,
  pub country:                   Option<String>,
  pub occupation:                Option<String>,
  pub interests:                 Option<String>,
  pub notes:                     Option<String>,
  pub collaboration_status:      Option<String>,
  pub languages:                 Option<String>,
  pub last_contact_date:         Option<String>,
  pub portfolio_url:             Option<String>,

  pub category:                  Option<String>,
  pub primary_platform:          Option<String>,
  pub primary_followers:         Option<i64>,
  pub total_followers_count:     Option<i64>,
  pub engagement_rate:           Option<f64>,
  pub engagement_rate_tier:      Option<String>,
  pub secondary_platform:        Option<String>,
  pub secondary_followers_count: Option<i64>,
  pub average_monthly_reach:     Option<i64>,
}

/// A validated write: the type, the person payload and the profile payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonWrite {
  pub kind:    PersonType,
  pub fields:  PersonFields,
  pub profile: ProfileFields,
}

impl PersonInput {
  /// Validate the type and dates. Fails before any write happens.
  pub fn validate(self) -> Result<PersonWrite> {
    let kind = parse_person_type(self.kind.as_deref())?;

    let fields = PersonFields {
      full_name:            self.full_name,
      preferred_name:       self.preferred_name,
      gender:               self.gender,
      birth_date:           parse_date(self.birth_date.as_deref())?,
      email:                self.email,
      phone:                self.phone,
      city:                 self.city,
      country:              self.country,
      occupation:           self.occupation,
      interests:            self.interests,
      notes:                self.notes,
      collaboration_status: self.collaboration_status,
      languages:            self.languages,
      last_contact_date:    parse_date(self.last_contact_date.as_deref())?,
      portfolio_url:        self.portfolio_url,
    };

    let profile = ProfileFields {
      category:                  self.category,
      primary_platform:          self.primary_platform,
      primary_followers:         self.primary_followers,
      total_followers_count:     self.total_followers_count,
      engagement_rate:           self.engagement_rate,
      engagement_rate_tier:      self.engagement_rate_tier,
      secondary_platform:        self.secondary_platform,
      secondary_followers_count: self.secondary_followers_count,
      average_monthly_reach:     self.average_monthly_reach,
    };

    Ok(PersonWrite { kind, fields, profile })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_dates_are_absent() {
    assert_eq!(parse_date(None).unwrap(), None);
    assert_eq!(parse_date(Some("")).unwrap(), None);
    assert_eq!(parse_date(Some("   ")).unwrap(), None);
  }

  #[test]
  fn plain_and_timestamp_dates_parse() {
    let expected = NaiveDate::from_ymd_opt(1990, 4, 12);
    assert_eq!(parse_date(Some("1990-04-12")).unwrap(), expected);
    assert_eq!(parse_date(Some("1990-04-12T08:30:00Z")).unwrap(), expected);
  }

  #[test]
  fn garbage_date_is_rejected() {
    assert!(matches!(
      parse_date(Some("12/04/1990")),
      Err(Error::InvalidDate(s)) if s == "12/04/1990"
    ));
  }

  #[test]
  fn missing_or_unknown_type_is_rejected() {
    let missing = PersonInput::default().validate();
    assert!(matches!(missing, Err(Error::MissingPersonType)));

    let unknown = PersonInput { kind: Some("VIP".into()), ..Default::default() }
      .validate();
    assert!(matches!(unknown, Err(Error::UnknownPersonType(s)) if s == "VIP"));
  }

  #[test]
  fn validate_splits_person_and_profile() {
    let input: PersonInput = serde_json::from_value(serde_json::json!({
      "type": "INF",
      "fullName": "Mina",
      "city": "Bangkok",
      "birthDate": "",
      "category": "travel",
      "primaryFollowers": 12000,
      "engagementRate": 3.5
    }))
    .unwrap();

    let write = input.validate().unwrap();
    assert_eq!(write.kind, PersonType::Influencer);
    assert_eq!(write.fields.full_name.as_deref(), Some("Mina"));
    assert_eq!(write.fields.birth_date, None);
    assert_eq!(write.profile.category.as_deref(), Some("travel"));
    assert_eq!(write.profile.primary_followers, Some(12000));
    assert_eq!(write.profile.engagement_rate, Some(3.5));
  }
}
