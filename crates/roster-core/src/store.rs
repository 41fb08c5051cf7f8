//! The `PeopleStore` and `AccountStore` traits.
//!
//! Implemented by storage backends (e.g. `roster-store-sqlite`). The HTTP
//! layer and the import job depend on these abstractions, not on any concrete
//! backend.
//!
//! Every write on [`PeopleStore`] is a single transaction covering the person
//! row and its influencer profile, so the profile invariant (present iff the
//! person is an influencer) holds after every successful call.

use std::future::Future;

use crate::{
  account::{Account, AccountCredentials, NewAccount},
  error::Classify,
  input::PersonWrite,
  person::{InfluencerProfile, PeopleFilter, PersonType, PersonView, ProfileFields, SavedPerson},
  record_id::RecordId,
};

// ─── People ──────────────────────────────────────────────────────────────────

pub trait PeopleStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// List people matching every predicate in `filter`, each with its
  /// profile joined in. Ordered by surrogate id.
  fn list_people<'a>(
    &'a self,
    filter: &'a PeopleFilter,
  ) -> impl Future<Output = Result<Vec<PersonView>, Self::Error>> + Send + 'a;

  /// Retrieve a person by surrogate id. Returns `None` if not found.
  fn get_person(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<PersonView>, Self::Error>> + Send + '_;

  /// Retrieve a person by record identifier. Returns `None` if not found.
  fn find_by_record_id<'a>(
    &'a self,
    record_id: &'a str,
  ) -> impl Future<Output = Result<Option<PersonView>, Self::Error>> + Send + 'a;

  /// Compute the identifier the next `create_person` of `kind` would receive.
  ///
  /// Informational only: the value is not reserved. Fails with
  /// [`Error::SequenceFull`](crate::Error::SequenceFull) once the sequence
  /// has reached its cap.
  fn allocate_record_id(
    &self,
    kind: PersonType,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  /// Create a person with a freshly allocated record identifier, plus its
  /// profile when the type is influencer.
  fn create_person(
    &self,
    input: PersonWrite,
  ) -> impl Future<Output = Result<SavedPerson, Self::Error>> + Send + '_;

  /// Create a person under a caller-supplied record identifier.
  ///
  /// Used by the import job to preserve external identifiers. Returns a
  /// conflict error if the identifier is already taken.
  fn create_person_with_record_id(
    &self,
    record_id: String,
    input: PersonWrite,
  ) -> impl Future<Output = Result<SavedPerson, Self::Error>> + Send + '_;

  /// Replace every descriptive field of person `id`, set its type, and
  /// reconcile the profile against the new type. The record identifier is
  /// left unchanged.
  fn update_person(
    &self,
    id: i64,
    input: PersonWrite,
  ) -> impl Future<Output = Result<SavedPerson, Self::Error>> + Send + '_;

  /// Delete person `id` together with its profile.
  fn remove_person(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Bring the profile of person `id` into agreement with `kind`: update or
  /// create it for influencers, delete it for individuals. Idempotent.
  fn reconcile_profile(
    &self,
    id: i64,
    kind: PersonType,
    profile: ProfileFields,
  ) -> impl Future<Output = Result<Option<InfluencerProfile>, Self::Error>> + Send + '_;
}

// ─── Accounts ────────────────────────────────────────────────────────────────

pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Persist a new account. Fails with a conflict if the username or email
  /// is already registered.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Look up an account and its password hash by username.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<AccountCredentials>, Self::Error>> + Send + 'a;

  fn find_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn count_accounts(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
