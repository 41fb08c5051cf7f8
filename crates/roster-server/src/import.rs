//! Bulk import of raw people rows, plus bootstrap account seeding.
//!
//! Rows carry their own record identifiers. A row whose identifier already
//! exists is skipped, so running the same import twice changes nothing.
//! Rows are processed one at a time; two imports must not run against the
//! same store at once.

use std::{path::Path, str::FromStr};

use roster_api::auth::hash_password;
use roster_core::{
  Classify, ErrorKind,
  account::{AccountStatus, NewAccount, Role},
  input::{PersonWrite, parse_date},
  person::{Person, PersonFields, PersonType, ProfileFields},
  record_id::RecordId,
  store::{AccountStore, PeopleStore},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ImportConfig;

const FALLBACK_ADMIN_PASSWORD: &str = "admin123";
const FALLBACK_ACCOUNT_PASSWORD: &str = "password123";

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ImportError {
  #[error("failed to read {path:?}: {source}")]
  Read {
    path:   std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed import file: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("row {record_id:?}: {source}")]
  Row {
    record_id: String,
    #[source]
    source:    roster_core::Error,
  },

  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ImportError {
  fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// One row of the import file. Influencer attributes use their source names
/// (`influencerCategory`, `followersCount`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPersonRow {
  pub record_id:                 String,
  /// `"influencer"` selects INF; anything else, including absence, IND.
  pub record_type:               Option<String>,

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

  pub influencer_category:       Option<String>,
  pub primary_platform:          Option<String>,
  pub followers_count:           Option<i64>,
  pub total_followers_count:     Option<i64>,
  pub engagement_rate:           Option<f64>,
  pub engagement_rate_tier:      Option<String>,
  pub secondary_platform:        Option<String>,
  pub secondary_followers_count: Option<i64>,
  pub average_monthly_reach:     Option<i64>,
}

impl RawPersonRow {
  pub fn person_type(&self) -> PersonType {
    match self.record_type.as_deref() {
      Some("influencer") => PersonType::Influencer,
      _ => PersonType::Individual,
    }
  }

  /// Convert into a validated write. Profile fields are dropped for
  /// individuals.
  pub fn to_write(&self) -> roster_core::Result<PersonWrite> {
    let kind = self.person_type();

    let fields = PersonFields {
      full_name:            self.full_name.clone(),
      preferred_name:       self.preferred_name.clone(),
      gender:               self.gender.clone(),
      birth_date:           parse_date(self.birth_date.as_deref())?,
      email:                self.email.clone(),
      phone:                self.phone.clone(),
      city:                 self.city.clone(),
      country:              self.country.clone(),
      occupation:           self.occupation.clone(),
      interests:            self.interests.clone(),
      notes:                self.notes.clone(),
      collaboration_status: self.collaboration_status.clone(),
      languages:            self.languages.clone(),
      last_contact_date:    parse_date(self.last_contact_date.as_deref())?,
      portfolio_url:        self.portfolio_url.clone(),
    };

    let profile = if kind.has_profile() {
      ProfileFields {
        category:                  self.influencer_category.clone(),
        primary_platform:          self.primary_platform.clone(),
        primary_followers:         self.followers_count,
        total_followers_count:     self.total_followers_count,
        engagement_rate:           self.engagement_rate,
        engagement_rate_tier:      self.engagement_rate_tier.clone(),
        secondary_platform:        self.secondary_platform.clone(),
        secondary_followers_count: self.secondary_followers_count,
        average_monthly_reach:     self.average_monthly_reach,
      }
    } else {
      ProfileFields::default()
    };

    Ok(PersonWrite { kind, fields, profile })
  }
}

/// Read a JSON array of [`RawPersonRow`]s from `path`.
pub async fn read_rows(path: &Path) -> Result<Vec<RawPersonRow>, ImportError> {
  let bytes = tokio::fs::read(path).await.map_err(|source| ImportError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(serde_json::from_slice(&bytes)?)
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// What a single import run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
  pub people_created:   usize,
  pub profiles_created: usize,
  pub people_skipped:   usize,
  pub admin_created:    bool,
  pub accounts_created: usize,
  pub accounts_skipped: usize,
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// Import `rows` into `store`, then seed the admin and editor accounts.
///
/// Rows are processed in order, one transaction each. A row that fails
/// validation aborts the run; rows already written stay written and are
/// skipped on the next run.
pub async fn run_import<S>(
  store: &S,
  rows: &[RawPersonRow],
  config: &ImportConfig,
) -> Result<ImportReport, ImportError>
where
  S: PeopleStore + AccountStore,
{
  let mut report = ImportReport::default();
  let mut candidates: Vec<Person> = Vec::new();

  for row in rows {
    let row_error = |source| ImportError::Row {
      record_id: row.record_id.clone(),
      source,
    };

    // Kept verbatim once it parses; the allocator reads numbers numerically.
    let record_id = row.record_id.trim().to_owned();
    RecordId::from_str(&record_id).map_err(row_error)?;

    if store
      .find_by_record_id(&record_id)
      .await
      .map_err(ImportError::store)?
      .is_some()
    {
      report.people_skipped += 1;
      continue;
    }

    let write = row.to_write().map_err(row_error)?;
    let saved = match store.create_person_with_record_id(record_id.clone(), write).await {
      Ok(saved) => saved,
      Err(e) if e.kind() == ErrorKind::Conflict => {
        report.people_skipped += 1;
        continue;
      }
      Err(e) => return Err(ImportError::store(e)),
    };

    report.people_created += 1;
    tracing::info!(%record_id, name = ?saved.person.fields.full_name, "person created");

    if saved.influencer_profile.is_some() {
      report.profiles_created += 1;
      tracing::info!(%record_id, "influencer profile created");
    } else {
      candidates.push(saved.person);
    }
  }

  report.admin_created = ensure_admin(store, config).await?;
  provision_accounts(store, &candidates, config, &mut report).await?;

  tracing::info!(
    people_created = report.people_created,
    profiles_created = report.profiles_created,
    people_skipped = report.people_skipped,
    admin_created = report.admin_created,
    accounts_created = report.accounts_created,
    "import complete"
  );
  Ok(report)
}

/// Create the bootstrap admin unless an account with its email exists.
async fn ensure_admin<S>(store: &S, config: &ImportConfig) -> Result<bool, ImportError>
where
  S: AccountStore,
{
  if store
    .find_account_by_email(&config.admin_email)
    .await
    .map_err(ImportError::store)?
    .is_some()
  {
    tracing::info!(email = %config.admin_email, "admin account already exists");
    return Ok(false);
  }

  let password = config.admin_password.as_deref().unwrap_or_else(|| {
    tracing::warn!("no import.admin_password configured; using the built-in default");
    FALLBACK_ADMIN_PASSWORD
  });

  store
    .create_account(NewAccount {
      username:      config.admin_username.clone(),
      email:         config.admin_email.clone(),
      full_name:     Some("Administrator".to_owned()),
      password_hash: hash_secret(password)?,
      role:          Role::Admin,
      status:        AccountStatus::Active,
    })
    .await
    .map_err(ImportError::store)?;

  tracing::info!(username = %config.admin_username, "admin account created");
  Ok(true)
}

/// Give up to `account_limit` of this run's individuals an editor account.
///
/// Candidates without an email, or whose email already has an account, do not
/// count towards the limit. The username is the email's local part; a
/// username already taken by another email is skipped with a warning.
async fn provision_accounts<S>(
  store: &S,
  candidates: &[Person],
  config: &ImportConfig,
  report: &mut ImportReport,
) -> Result<(), ImportError>
where
  S: AccountStore,
{
  let mut password_hash: Option<String> = None;

  for person in candidates {
    if report.accounts_created >= config.account_limit {
      break;
    }
    let Some(email) = person.fields.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    else {
      continue;
    };
    if store
      .find_account_by_email(email)
      .await
      .map_err(ImportError::store)?
      .is_some()
    {
      continue;
    }

    let username = email.split('@').next().unwrap_or(email).to_owned();
    let hash = match &password_hash {
      Some(hash) => hash.clone(),
      None => {
        let password = config.account_password.as_deref().unwrap_or_else(|| {
          tracing::warn!("no import.account_password configured; using the built-in default");
          FALLBACK_ACCOUNT_PASSWORD
        });
        let fresh = hash_secret(password)?;
        password_hash = Some(fresh.clone());
        fresh
      }
    };

    let created = store
      .create_account(NewAccount {
        username:      username.clone(),
        email:         email.to_owned(),
        full_name:     person.fields.full_name.clone(),
        password_hash: hash,
        role:          Role::Editor,
        status:        AccountStatus::Active,
      })
      .await;

    match created {
      Ok(_) => {
        report.accounts_created += 1;
        tracing::info!(%username, record_id = %person.record_id, "editor account created");
      }
      Err(e) if e.kind() == ErrorKind::Conflict => {
        report.accounts_skipped += 1;
        tracing::warn!(%username, %email, "username already taken; account not created");
      }
      Err(e) => return Err(ImportError::store(e)),
    }
  }

  Ok(())
}

fn hash_secret(password: &str) -> Result<String, ImportError> {
  hash_password(password).map_err(|e| ImportError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
  use roster_core::person::PeopleFilter;
  use roster_store_sqlite::SqliteStore;
  use serde_json::json;

  use super::*;

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store")
  }

  fn config(limit: usize) -> ImportConfig {
    ImportConfig {
      admin_password: Some("admin-pass".into()),
      account_password: Some("editor-pass".into()),
      account_limit: limit,
      ..Default::default()
    }
  }

  fn rows() -> Vec<RawPersonRow> {
    serde_json::from_value(json!([
      {
        "recordId": "IND-001",
        "recordType": "individual",
        "fullName": "Jane Doe",
        "email": "jane@example.org",
        "birthDate": "1990-04-12"
      },
      {
        "recordId": "INF-001",
        "recordType": "influencer",
        "fullName": "Mina",
        "email": "mina@example.org",
        "birthDate": "",
        "influencerCategory": "travel",
        "followersCount": 52000,
        "engagementRate": 4.2,
        "engagementRateTier": "high"
      },
      { "recordId": "IND-002", "fullName": "No Email" },
      { "recordId": "IND-007", "recordType": "contact", "email": "sam@example.org" }
    ]))
    .unwrap()
  }

  #[test]
  fn record_type_tag_selects_person_type() {
    let rows = rows();
    assert_eq!(rows[0].person_type(), PersonType::Individual);
    assert_eq!(rows[1].person_type(), PersonType::Influencer);
    assert_eq!(rows[2].person_type(), PersonType::Individual);
    assert_eq!(rows[3].person_type(), PersonType::Individual);
  }

  #[test]
  fn influencer_fields_map_onto_profile() {
    let write = rows()[1].to_write().unwrap();
    assert_eq!(write.profile.category.as_deref(), Some("travel"));
    assert_eq!(write.profile.primary_followers, Some(52000));
    assert_eq!(write.fields.birth_date, None);

    let individual = rows()[0].to_write().unwrap();
    assert_eq!(individual.profile, ProfileFields::default());
  }

  #[tokio::test]
  async fn first_run_creates_people_profiles_and_accounts() {
    let s = store().await;
    let report = run_import(&s, &rows(), &config(10)).await.unwrap();

    assert_eq!(report, ImportReport {
      people_created:   4,
      profiles_created: 1,
      people_skipped:   0,
      admin_created:    true,
      accounts_created: 2,
      accounts_skipped: 0,
    });

    let mina = s.find_by_record_id("INF-001").await.unwrap().unwrap();
    assert_eq!(
      mina.influencer_profile.unwrap().fields.category.as_deref(),
      Some("travel")
    );
    assert!(s.find_by_record_id("IND-001").await.unwrap().unwrap().influencer_profile.is_none());

    let admin = s.find_account_by_email("admin@example.com").await.unwrap().unwrap();
    assert_eq!(admin.role, Role::Admin);

    let jane = s.find_credentials("jane").await.unwrap().unwrap();
    assert_eq!(jane.account.role, Role::Editor);
    assert!(s.find_credentials("sam").await.unwrap().is_some());
    // Influencers never receive an account.
    assert!(s.find_account_by_email("mina@example.org").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn import_is_idempotent() {
    let s = store().await;
    run_import(&s, &rows(), &config(10)).await.unwrap();
    let before = s.list_people(&PeopleFilter::default()).await.unwrap();
    let accounts_before = s.count_accounts().await.unwrap();

    let report = run_import(&s, &rows(), &config(10)).await.unwrap();
    assert_eq!(report, ImportReport { people_skipped: 4, ..Default::default() });

    let after = s.list_people(&PeopleFilter::default()).await.unwrap();
    assert_eq!(before, after);
    assert_eq!(s.count_accounts().await.unwrap(), accounts_before);
  }

  #[tokio::test]
  async fn account_limit_is_respected() {
    let s = store().await;
    let report = run_import(&s, &rows(), &config(1)).await.unwrap();

    assert_eq!(report.accounts_created, 1);
    // Admin plus one editor.
    assert_eq!(s.count_accounts().await.unwrap(), 2);
    assert!(s.find_credentials("jane").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn existing_people_are_left_alone() {
    let s = store().await;
    let mut write = rows()[0].to_write().unwrap();
    write.fields.full_name = Some("Edited".into());
    s.create_person_with_record_id("IND-001".into(), write).await.unwrap();

    let report = run_import(&s, &rows(), &config(10)).await.unwrap();
    assert_eq!(report.people_skipped, 1);
    assert_eq!(report.people_created, 3);

    let jane = s.find_by_record_id("IND-001").await.unwrap().unwrap();
    assert_eq!(jane.person.fields.full_name.as_deref(), Some("Edited"));
    // Only individuals created in this run are candidates.
    assert!(s.find_credentials("jane").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn imported_ids_seed_the_allocator() {
    let s = store().await;
    run_import(&s, &rows(), &config(0)).await.unwrap();

    assert_eq!(
      s.allocate_record_id(PersonType::Individual).await.unwrap().to_string(),
      "IND-008"
    );
    assert_eq!(
      s.allocate_record_id(PersonType::Influencer).await.unwrap().to_string(),
      "INF-002"
    );
  }

  #[tokio::test]
  async fn malformed_rows_abort_the_run() {
    let s = store().await;

    let bad_id: Vec<RawPersonRow> =
      serde_json::from_value(json!([{ "recordId": "person-1" }])).unwrap();
    let err = run_import(&s, &bad_id, &config(10)).await.unwrap_err();
    assert!(matches!(err, ImportError::Row { record_id, .. } if record_id == "person-1"));

    let oversized: Vec<RawPersonRow> =
      serde_json::from_value(json!([{ "recordId": "IND-18446744073709551615" }])).unwrap();
    let err = run_import(&s, &oversized, &config(10)).await.unwrap_err();
    assert!(matches!(
      err,
      ImportError::Row { source: roster_core::Error::MalformedRecordId(_), .. }
    ));

    let bad_date: Vec<RawPersonRow> =
      serde_json::from_value(json!([{ "recordId": "IND-001", "birthDate": "soon" }])).unwrap();
    let err = run_import(&s, &bad_date, &config(10)).await.unwrap_err();
    assert!(matches!(
      err,
      ImportError::Row { source: roster_core::Error::InvalidDate(_), .. }
    ));
    assert!(s.list_people(&PeopleFilter::default()).await.unwrap().is_empty());
  }
}
