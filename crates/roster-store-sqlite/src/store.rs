//! [`SqliteStore`], the SQLite implementation of [`PeopleStore`] and
//! [`AccountStore`].

use std::path::Path;

use chrono::Utc;
use roster_core::{
  account::{Account, AccountCredentials, NewAccount},
  input::PersonWrite,
  person::{
    InfluencerProfile, PeopleFilter, PersonType, PersonView, ProfileFields,
    SavedPerson,
  },
  record_id::RecordId,
  store::{AccountStore, PeopleStore},
};
use rusqlite::{OptionalExtension as _, Transaction, TransactionBehavior, params};

use crate::{
  Error, Result,
  encode::{ACCOUNT_COLUMNS, RawAccount, RawProfile, RawView, encode_dt},
  people::{
    allocate_record_id, delete_person, insert_person, is_unique_violation,
    list_views, load_view, load_view_by_record_id, person_exists,
    reconcile_profile, replace_person,
  },
  schema::SCHEMA,
};

/// How many times `create_person` re-derives a record identifier after
/// losing a race on the `people.record_id` UNIQUE constraint.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 3;

const RECORD_ID_KEY: &str = "people.record_id";

fn record_id_conflict(err: &tokio_rusqlite::Error) -> bool {
  matches!(err, tokio_rusqlite::Error::Rusqlite(e) if is_unique_violation(e, RECORD_ID_KEY))
}

fn account_conflict(err: &tokio_rusqlite::Error) -> bool {
  matches!(err, tokio_rusqlite::Error::Rusqlite(e) if is_unique_violation(e, "accounts."))
}

/// Insert a person under `record_id` and attach its profile. Runs inside the
/// caller's transaction.
fn insert_with_profile(
  tx: &Transaction<'_>,
  record_id: &str,
  input: &PersonWrite,
) -> rusqlite::Result<RawView> {
  let now = Utc::now();
  let id = insert_person(tx, record_id, input.kind, &input.fields, now)?;
  if input.kind.has_profile() {
    reconcile_profile(tx, id, input.kind, &input.profile, now)?;
  }
  load_view(tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Outcome of one allocate-and-insert attempt.
enum Allocated {
  Saved(RawView),
  SequenceFull,
}

/// Allocate the next record identifier and insert under it, in one immediate
/// transaction.
fn allocate_and_insert(
  conn: &mut rusqlite::Connection,
  input: &PersonWrite,
) -> rusqlite::Result<Allocated> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let Some(record_id) = allocate_record_id(&tx, input.kind)? else {
    return Ok(Allocated::SequenceFull);
  };
  let view = insert_with_profile(&tx, &record_id.to_string(), input)?;
  tx.commit()?;
  Ok(Allocated::Saved(view))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster store backed by a single SQLite file.
///
/// Cloning shares the inner connection. All statements run on the
/// connection's dedicated thread, so writes through one `SqliteStore` are
/// already serialised; the retry in `create_person` covers other processes
/// writing the same file.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PeopleStore impl ────────────────────────────────────────────────────────

impl PeopleStore for SqliteStore {
  type Error = Error;

  async fn list_people(&self, filter: &PeopleFilter) -> Result<Vec<PersonView>> {
    let filter = filter.clone();
    let raws = self
      .conn
      .call(move |conn| Ok(list_views(conn, &filter)?))
      .await?;
    raws.into_iter().map(RawView::into_view).collect()
  }

  async fn get_person(&self, id: i64) -> Result<Option<PersonView>> {
    let raw = self.conn.call(move |conn| Ok(load_view(conn, id)?)).await?;
    raw.map(RawView::into_view).transpose()
  }

  async fn find_by_record_id(&self, record_id: &str) -> Result<Option<PersonView>> {
    let record_id = record_id.to_owned();
    let raw = self
      .conn
      .call(move |conn| Ok(load_view_by_record_id(conn, &record_id)?))
      .await?;
    raw.map(RawView::into_view).transpose()
  }

  async fn allocate_record_id(&self, kind: PersonType) -> Result<RecordId> {
    let next = self
      .conn
      .call(move |conn| Ok(allocate_record_id(conn, kind)?))
      .await?;
    next.ok_or_else(|| roster_core::Error::SequenceFull(kind).into())
  }

  async fn create_person(&self, input: PersonWrite) -> Result<SavedPerson> {
    let kind = input.kind;

    let outcome: Option<Allocated> = self
      .conn
      .call(move |conn| {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
          match allocate_and_insert(conn, &input) {
            Ok(outcome) => return Ok(Some(outcome)),
            Err(e) if is_unique_violation(&e, RECORD_ID_KEY) => {
              tracing::warn!(%kind, attempt, "record id allocation collided; retrying");
            }
            Err(e) => return Err(e.into()),
          }
        }
        Ok(None)
      })
      .await?;

    match outcome {
      Some(Allocated::Saved(raw)) => raw.into_saved(),
      Some(Allocated::SequenceFull) => {
        Err(roster_core::Error::SequenceFull(kind).into())
      }
      None => Err(roster_core::Error::AllocationExhausted(kind).into()),
    }
  }

  async fn create_person_with_record_id(
    &self,
    record_id: String,
    input: PersonWrite,
  ) -> Result<SavedPerson> {
    let key = record_id.clone();
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let view = insert_with_profile(&tx, &key, &input)?;
        tx.commit()?;
        Ok(view)
      })
      .await;

    match result {
      Ok(raw) => raw.into_saved(),
      Err(e) if record_id_conflict(&e) => {
        Err(roster_core::Error::DuplicateRecordId(record_id).into())
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn update_person(&self, id: i64, input: PersonWrite) -> Result<SavedPerson> {
    let raw: Option<RawView> = self
      .conn
      .call(move |conn| {
        let now = Utc::now();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !replace_person(&tx, id, input.kind, &input.fields, now)? {
          return Ok(None);
        }
        reconcile_profile(&tx, id, input.kind, &input.profile, now)?;

        let view = load_view(&tx, id)?;
        tx.commit()?;
        Ok(view)
      })
      .await?;

    raw
      .ok_or(roster_core::Error::PersonNotFound(id))?
      .into_saved()
  }

  async fn remove_person(&self, id: i64) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !delete_person(&tx, id)? {
          return Ok(false);
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if removed {
      Ok(())
    } else {
      Err(roster_core::Error::PersonNotFound(id).into())
    }
  }

  async fn reconcile_profile(
    &self,
    id: i64,
    kind: PersonType,
    profile: ProfileFields,
  ) -> Result<Option<InfluencerProfile>> {
    let raw: Option<Option<RawProfile>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !person_exists(&tx, id)? {
          return Ok(None);
        }
        let profile = reconcile_profile(&tx, id, kind, &profile, Utc::now())?;
        tx.commit()?;
        Ok(Some(profile))
      })
      .await?;

    raw
      .ok_or(roster_core::Error::PersonNotFound(id))?
      .map(RawProfile::into_profile)
      .transpose()
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = Error;

  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let role_str = input.role.to_string();
    let status_str = input.status.to_string();

    let username = input.username.clone();
    let email = input.email.clone();
    let full_name = input.full_name.clone();
    let hash = input.password_hash;

    let result = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (
             username, email, full_name, password_hash, role, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![username, email, full_name, hash, role_str, status_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await;

    let id = match result {
      Ok(id) => id,
      Err(e) if account_conflict(&e) => {
        return Err(roster_core::Error::DuplicateAccount.into());
      }
      Err(e) => return Err(e.into()),
    };

    Ok(Account {
      id,
      username: input.username,
      email: input.email,
      full_name: input.full_name,
      role: input.role,
      status: input.status,
      created_at,
    })
  }

  async fn find_credentials(&self, username: &str) -> Result<Option<AccountCredentials>> {
    let username = username.to_owned();
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"),
              params![username],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_credentials).transpose()
  }

  async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
    let email = email.to_owned();
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
              params![email],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn count_accounts(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?)
      })
      .await?;
    Ok(u64::try_from(count).unwrap_or_default())
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run arbitrary SQL against the underlying connection.
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Total number of profile rows, orphaned or not.
  pub(crate) async fn count_profiles(&self) -> Result<i64> {
    Ok(
      self
        .conn
        .call(|conn| {
          Ok(conn.query_row("SELECT COUNT(*) FROM influencer_profiles", [], |row| {
            row.get(0)
          })?)
        })
        .await?,
    )
  }
}
