//! Person and influencer-profile types.
//!
//! A person is one of two subtypes. Only influencers own a sub-profile, and
//! the store keeps that 1:1 relationship in step with the person's current
//! type on every write.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Subtype ─────────────────────────────────────────────────────────────────

/// The discriminator selecting which sub-profile, if any, attaches to a
/// person. The wire and database form is the three-letter code.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
pub enum PersonType {
  #[serde(rename = "IND")]
  #[strum(serialize = "IND")]
  Individual,
  #[serde(rename = "INF")]
  #[strum(serialize = "INF")]
  Influencer,
}

impl PersonType {
  /// The prefix used in record identifiers and stored in the `type` column.
  pub fn code(self) -> &'static str {
    match self {
      Self::Individual => "IND",
      Self::Influencer => "INF",
    }
  }

  pub fn has_profile(self) -> bool { matches!(self, Self::Influencer) }
}

// ─── Descriptive payload ─────────────────────────────────────────────────────

/// Descriptive person attributes. Opaque to the lifecycle logic; replaced
/// wholesale on every update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonFields {
  pub full_name:            Option<String>,
  pub preferred_name:       Option<String>,
  pub gender:               Option<String>,
  pub birth_date:           Option<NaiveDate>,
  pub email:                Option<String>,
  pub phone:                Option<String>,
  pub city:                 Option<String>,
  pub country:              Option<String>,
  pub occupation:           Option<String>,
  pub interests:            Option<String>,
  pub notes:                Option<String>,
  pub collaboration_status: Option<String>,
  pub languages:            Option<String>,
  pub last_contact_date:    Option<NaiveDate>,
  pub portfolio_url:        Option<String>,
}

/// Influencer-specific attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
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

// ─── Stored entities ─────────────────────────────────────────────────────────

/// A persisted person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:         i64,
  /// Assigned once at creation; never regenerated, even if `kind` changes.
  pub record_id:  String,
  #[serde(rename = "type")]
  pub kind:       PersonType,
  #[serde(flatten)]
  pub fields:     PersonFields,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A persisted influencer sub-profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerProfile {
  pub id:         i64,
  pub people_id:  i64,
  #[serde(flatten)]
  pub fields:     ProfileFields,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Read and write models ───────────────────────────────────────────────────

/// A person with its profile joined in, serialised flat:
/// `{ ...person, "influencerProfile": {...} | null }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
  #[serde(flatten)]
  pub person:             Person,
  pub influencer_profile: Option<InfluencerProfile>,
}

/// The result of a create or update:
/// `{ "person": {...}, "influencerProfile": {...} | null }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPerson {
  pub person:             Person,
  pub influencer_profile: Option<InfluencerProfile>,
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Equality predicates for listing people. All present predicates must hold.
///
/// `category` and `engagement_rate_tier` constrain the joined profile, so a
/// filter using either only ever matches influencers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeopleFilter {
  pub kind:                 Option<PersonType>,
  pub city:                 Option<String>,
  pub collaboration_status: Option<String>,
  pub category:             Option<String>,
  pub engagement_rate_tier: Option<String>,
}
