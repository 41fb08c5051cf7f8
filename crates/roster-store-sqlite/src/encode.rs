//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`.
//! Enum discriminants are stored in their wire form (`"IND"`, `"editor"`).

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use roster_core::{
  account::{Account, AccountCredentials, AccountStatus, Role},
  person::{
    InfluencerProfile, Person, PersonFields, PersonType, PersonView,
    ProfileFields, SavedPerson,
  },
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Discriminants ───────────────────────────────────────────────────────────

pub fn decode_person_type(s: &str) -> Result<PersonType> {
  PersonType::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown person type: {s:?}")))
}

pub fn decode_role(s: &str) -> Result<Role> {
  Role::from_str(s).map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

pub fn decode_status(s: &str) -> Result<AccountStatus> {
  AccountStatus::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown account status: {s:?}")))
}

// ─── Column lists ────────────────────────────────────────────────────────────

/// `people` columns in the order [`RawPerson::from_row`] reads them.
pub const PERSON_COLUMNS: &str = "
  p.id, p.record_id, p.type, p.full_name, p.preferred_name, p.gender,
  p.birth_date, p.email, p.phone, p.city, p.country, p.occupation,
  p.interests, p.notes, p.collaboration_status, p.languages,
  p.last_contact_date, p.portfolio_url, p.created_at, p.updated_at";

const PERSON_COLUMN_COUNT: usize = 20;

/// `influencer_profiles` columns in the order [`RawProfile::from_row`] reads
/// them.
pub const PROFILE_COLUMNS: &str = "
  ip.id, ip.people_id, ip.category, ip.primary_platform,
  ip.primary_followers, ip.total_followers_count, ip.engagement_rate,
  ip.engagement_rate_tier, ip.secondary_platform,
  ip.secondary_followers_count, ip.average_monthly_reach,
  ip.created_at, ip.updated_at";

pub const ACCOUNT_COLUMNS: &str =
  "id, username, email, full_name, role, status, created_at, password_hash";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `people` row.
pub struct RawPerson {
  pub id:                   i64,
  pub record_id:            String,
  pub kind:                 String,
  pub full_name:            Option<String>,
  pub preferred_name:       Option<String>,
  pub gender:               Option<String>,
  pub birth_date:           Option<String>,
  pub email:                Option<String>,
  pub phone:                Option<String>,
  pub city:                 Option<String>,
  pub country:              Option<String>,
  pub occupation:           Option<String>,
  pub interests:            Option<String>,
  pub notes:                Option<String>,
  pub collaboration_status: Option<String>,
  pub languages:            Option<String>,
  pub last_contact_date:    Option<String>,
  pub portfolio_url:        Option<String>,
  pub created_at:           String,
  pub updated_at:           String,
}

impl RawPerson {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get(0)?,
      record_id:            row.get(1)?,
      kind:                 row.get(2)?,
      full_name:            row.get(3)?,
      preferred_name:       row.get(4)?,
      gender:               row.get(5)?,
      birth_date:           row.get(6)?,
      email:                row.get(7)?,
      phone:                row.get(8)?,
      city:                 row.get(9)?,
      country:              row.get(10)?,
      occupation:           row.get(11)?,
      interests:            row.get(12)?,
      notes:                row.get(13)?,
      collaboration_status: row.get(14)?,
      languages:            row.get(15)?,
      last_contact_date:    row.get(16)?,
      portfolio_url:        row.get(17)?,
      created_at:           row.get(18)?,
      updated_at:           row.get(19)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:         self.id,
      record_id:  self.record_id,
      kind:       decode_person_type(&self.kind)?,
      fields:     PersonFields {
        full_name:            self.full_name,
        preferred_name:       self.preferred_name,
        gender:               self.gender,
        birth_date:           decode_opt_date(self.birth_date)?,
        email:                self.email,
        phone:                self.phone,
        city:                 self.city,
        country:              self.country,
        occupation:           self.occupation,
        interests:            self.interests,
        notes:                self.notes,
        collaboration_status: self.collaboration_status,
        languages:            self.languages,
        last_contact_date:    decode_opt_date(self.last_contact_date)?,
        portfolio_url:        self.portfolio_url,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from an `influencer_profiles` row.
pub struct RawProfile {
  pub id:                        i64,
  pub people_id:                 i64,
  pub category:                  Option<String>,
  pub primary_platform:          Option<String>,
  pub primary_followers:         Option<i64>,
  pub total_followers_count:     Option<i64>,
  pub engagement_rate:           Option<f64>,
  pub engagement_rate_tier:      Option<String>,
  pub secondary_platform:        Option<String>,
  pub secondary_followers_count: Option<i64>,
  pub average_monthly_reach:     Option<i64>,
  pub created_at:                String,
  pub updated_at:                String,
}

impl RawProfile {
  /// Read profile columns starting at `offset`. Returns `None` when the
  /// profile id is NULL, i.e. a LEFT JOIN found no profile.
  pub fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Option<Self>> {
    let Some(id) = row.get::<_, Option<i64>>(offset)? else {
      return Ok(None);
    };
    Ok(Some(Self {
      id,
      people_id:                 row.get(offset + 1)?,
      category:                  row.get(offset + 2)?,
      primary_platform:          row.get(offset + 3)?,
      primary_followers:         row.get(offset + 4)?,
      total_followers_count:     row.get(offset + 5)?,
      engagement_rate:           row.get(offset + 6)?,
      engagement_rate_tier:      row.get(offset + 7)?,
      secondary_platform:        row.get(offset + 8)?,
      secondary_followers_count: row.get(offset + 9)?,
      average_monthly_reach:     row.get(offset + 10)?,
      created_at:                row.get(offset + 11)?,
      updated_at:                row.get(offset + 12)?,
    }))
  }

  pub fn into_profile(self) -> Result<InfluencerProfile> {
    Ok(InfluencerProfile {
      id:         self.id,
      people_id:  self.people_id,
      fields:     ProfileFields {
        category:                  self.category,
        primary_platform:          self.primary_platform,
        primary_followers:         self.primary_followers,
        total_followers_count:     self.total_followers_count,
        engagement_rate:           self.engagement_rate,
        engagement_rate_tier:      self.engagement_rate_tier,
        secondary_platform:        self.secondary_platform,
        secondary_followers_count: self.secondary_followers_count,
        average_monthly_reach:     self.average_monthly_reach,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// A person row joined with its (optional) profile row.
pub struct RawView {
  pub person:  RawPerson,
  pub profile: Option<RawProfile>,
}

impl RawView {
  /// Read a row selected as `PERSON_COLUMNS, PROFILE_COLUMNS`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person:  RawPerson::from_row(row)?,
      profile: RawProfile::from_row(row, PERSON_COLUMN_COUNT)?,
    })
  }

  pub fn into_view(self) -> Result<PersonView> {
    Ok(PersonView {
      person:             self.person.into_person()?,
      influencer_profile: self.profile.map(RawProfile::into_profile).transpose()?,
    })
  }

  pub fn into_saved(self) -> Result<SavedPerson> {
    let view = self.into_view()?;
    Ok(SavedPerson {
      person:             view.person,
      influencer_profile: view.influencer_profile,
    })
  }
}

/// Raw values read directly from an `accounts` row.
pub struct RawAccount {
  pub id:            i64,
  pub username:      String,
  pub email:         String,
  pub full_name:     Option<String>,
  pub role:          String,
  pub status:        String,
  pub created_at:    String,
  pub password_hash: String,
}

impl RawAccount {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      email:         row.get(2)?,
      full_name:     row.get(3)?,
      role:          row.get(4)?,
      status:        row.get(5)?,
      created_at:    row.get(6)?,
      password_hash: row.get(7)?,
    })
  }

  pub fn into_credentials(self) -> Result<AccountCredentials> {
    Ok(AccountCredentials {
      account:       Account {
        id:         self.id,
        username:   self.username,
        email:      self.email,
        full_name:  self.full_name,
        role:       decode_role(&self.role)?,
        status:     decode_status(&self.status)?,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(self.into_credentials()?.account)
  }
}
