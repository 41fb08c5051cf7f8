//! Synchronous statements over a single connection or transaction.
//!
//! Everything here runs inside a `tokio_rusqlite` closure. The async layer in
//! [`crate::store`] decides transaction boundaries; these helpers only issue
//! statements, so several of them compose into one atomic write.

use chrono::{DateTime, Utc};
use roster_core::{
  person::{PeopleFilter, PersonFields, PersonType, ProfileFields},
  record_id::{RecordId, next_record_id},
};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::encode::{
  PERSON_COLUMNS, PROFILE_COLUMNS, RawProfile, RawView, encode_date, encode_dt,
};

/// `true` if `err` is a UNIQUE violation on `target` (e.g. `people.record_id`).
pub fn is_unique_violation(err: &rusqlite::Error, target: &str) -> bool {
  match err {
    rusqlite::Error::SqliteFailure(e, Some(msg)) => {
      e.code == rusqlite::ErrorCode::ConstraintViolation
        && msg.starts_with("UNIQUE")
        && msg.contains(target)
    }
    _ => false,
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

fn select_views(
  conn: &Connection,
  where_clause: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawView>> {
  let sql = format!(
    "SELECT {PERSON_COLUMNS}, {PROFILE_COLUMNS}
     FROM people p
     LEFT JOIN influencer_profiles ip ON ip.people_id = p.id
     {where_clause}
     ORDER BY p.id"
  );
  let mut stmt = conn.prepare(&sql)?;
  stmt
    .query_map(params, RawView::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

pub fn load_view(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawView>> {
  Ok(select_views(conn, "WHERE p.id = ?1", params![id])?.into_iter().next())
}

pub fn load_view_by_record_id(
  conn: &Connection,
  record_id: &str,
) -> rusqlite::Result<Option<RawView>> {
  Ok(
    select_views(conn, "WHERE p.record_id = ?1", params![record_id])?
      .into_iter()
      .next(),
  )
}

pub fn list_views(
  conn: &Connection,
  filter: &PeopleFilter,
) -> rusqlite::Result<Vec<RawView>> {
  let mut values: Vec<String> = Vec::new();
  let mut conds: Vec<String> = Vec::new();

  let mut push = |column: &str, value: &str| {
    values.push(value.to_owned());
    conds.push(format!("{column} = ?{}", values.len()));
  };

  if let Some(kind) = filter.kind {
    push("p.type", kind.code());
  }
  if let Some(city) = &filter.city {
    push("p.city", city);
  }
  if let Some(status) = &filter.collaboration_status {
    push("p.collaboration_status", status);
  }
  // Against the LEFT JOIN these exclude people without a matching profile.
  if let Some(category) = &filter.category {
    push("ip.category", category);
  }
  if let Some(tier) = &filter.engagement_rate_tier {
    push("ip.engagement_rate_tier", tier);
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  select_views(conn, &where_clause, rusqlite::params_from_iter(values.iter()))
}

// ─── Identifier allocation ───────────────────────────────────────────────────

/// Derive the next record identifier in `kind`'s sequence.
///
/// Scans every identifier carrying the type's prefix, not only people whose
/// current type is `kind`: an `IND-` person later flipped to influencer still
/// occupies its number. `None` means the sequence is full.
pub fn allocate_record_id(
  conn: &Connection,
  kind: PersonType,
) -> rusqlite::Result<Option<RecordId>> {
  let pattern = format!("{}-%", kind.code());
  let mut stmt = conn.prepare("SELECT record_id FROM people WHERE record_id LIKE ?1")?;
  let existing = stmt
    .query_map(params![pattern], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(next_record_id(kind, existing.iter().map(String::as_str)))
}

// ─── Person writes ───────────────────────────────────────────────────────────

pub fn insert_person(
  conn: &Connection,
  record_id: &str,
  kind: PersonType,
  fields: &PersonFields,
  now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
  let now = encode_dt(now);
  conn.execute(
    "INSERT INTO people (
       record_id, type, full_name, preferred_name, gender, birth_date,
       email, phone, city, country, occupation, interests, notes,
       collaboration_status, languages, last_contact_date, portfolio_url,
       created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
               ?14, ?15, ?16, ?17, ?18, ?18)",
    params![
      record_id,
      kind.code(),
      fields.full_name,
      fields.preferred_name,
      fields.gender,
      fields.birth_date.map(encode_date),
      fields.email,
      fields.phone,
      fields.city,
      fields.country,
      fields.occupation,
      fields.interests,
      fields.notes,
      fields.collaboration_status,
      fields.languages,
      fields.last_contact_date.map(encode_date),
      fields.portfolio_url,
      now,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Overwrite every column except `record_id` and `created_at`. Returns
/// `false` if no person has this id.
pub fn replace_person(
  conn: &Connection,
  id: i64,
  kind: PersonType,
  fields: &PersonFields,
  now: DateTime<Utc>,
) -> rusqlite::Result<bool> {
  let changed = conn.execute(
    "UPDATE people SET
       type = ?2, full_name = ?3, preferred_name = ?4, gender = ?5,
       birth_date = ?6, email = ?7, phone = ?8, city = ?9, country = ?10,
       occupation = ?11, interests = ?12, notes = ?13,
       collaboration_status = ?14, languages = ?15, last_contact_date = ?16,
       portfolio_url = ?17, updated_at = ?18
     WHERE id = ?1",
    params![
      id,
      kind.code(),
      fields.full_name,
      fields.preferred_name,
      fields.gender,
      fields.birth_date.map(encode_date),
      fields.email,
      fields.phone,
      fields.city,
      fields.country,
      fields.occupation,
      fields.interests,
      fields.notes,
      fields.collaboration_status,
      fields.languages,
      fields.last_contact_date.map(encode_date),
      fields.portfolio_url,
      encode_dt(now),
    ],
  )?;
  Ok(changed > 0)
}

/// Delete a person and its profile. Returns `false` if no person has this id.
pub fn delete_person(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
  conn.execute("DELETE FROM influencer_profiles WHERE people_id = ?1", params![id])?;
  Ok(conn.execute("DELETE FROM people WHERE id = ?1", params![id])? > 0)
}

pub fn person_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM people WHERE id = ?1", params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

// ─── Profile reconciliation ──────────────────────────────────────────────────

/// Make the profile of person `id` agree with `kind`.
///
/// Influencer: update the existing profile in place, or insert one.
/// Individual: delete any existing profile.
///
/// An update that would not change any column is skipped, so a repeated call
/// leaves `updated_at` untouched as well.
pub fn reconcile_profile(
  conn: &Connection,
  id: i64,
  kind: PersonType,
  profile: &ProfileFields,
  now: DateTime<Utc>,
) -> rusqlite::Result<Option<RawProfile>> {
  if !kind.has_profile() {
    conn.execute("DELETE FROM influencer_profiles WHERE people_id = ?1", params![id])?;
    return Ok(None);
  }

  let existing: Option<i64> = conn
    .query_row(
      "SELECT id FROM influencer_profiles WHERE people_id = ?1",
      params![id],
      |row| row.get(0),
    )
    .optional()?;

  let now = encode_dt(now);
  let values = params![
    id,
    profile.category,
    profile.primary_platform,
    profile.primary_followers,
    profile.total_followers_count,
    profile.engagement_rate,
    profile.engagement_rate_tier,
    profile.secondary_platform,
    profile.secondary_followers_count,
    profile.average_monthly_reach,
    now,
  ];

  if existing.is_some() {
    conn.execute(
      "UPDATE influencer_profiles SET
         category = ?2, primary_platform = ?3, primary_followers = ?4,
         total_followers_count = ?5, engagement_rate = ?6,
         engagement_rate_tier = ?7, secondary_platform = ?8,
         secondary_followers_count = ?9, average_monthly_reach = ?10,
         updated_at = ?11
       WHERE people_id = ?1
         AND NOT (category IS ?2 AND primary_platform IS ?3
              AND primary_followers IS ?4 AND total_followers_count IS ?5
              AND engagement_rate IS ?6 AND engagement_rate_tier IS ?7
              AND secondary_platform IS ?8
              AND secondary_followers_count IS ?9
              AND average_monthly_reach IS ?10)",
      values,
    )?;
  } else {
    conn.execute(
      "INSERT INTO influencer_profiles (
         people_id, category, primary_platform, primary_followers,
         total_followers_count, engagement_rate, engagement_rate_tier,
         secondary_platform, secondary_followers_count, average_monthly_reach,
         created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
      values,
    )?;
  }

  conn.query_row(
    &format!("SELECT {PROFILE_COLUMNS} FROM influencer_profiles ip WHERE ip.people_id = ?1"),
    params![id],
    |row| RawProfile::from_row(row, 0),
  )
}
