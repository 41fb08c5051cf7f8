//! Accounts: the authentication identities that may mutate the registry.
//!
//! Accounts are not owned by people. The password credential is an argon2 PHC
//! string and only ever travels inside [`AccountCredentials`], which has no
//! `Serialize` impl.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Permission level of an account.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  #[default]
  Editor,
  Viewer,
}

/// Whether an account may log in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccountStatus {
  #[default]
  Active,
  Disabled,
}

/// A persisted account, without its credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub id:         i64,
  pub username:   String,
  pub email:      String,
  pub full_name:  Option<String>,
  pub role:       Role,
  pub status:     AccountStatus,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::AccountStore::create_account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:      String,
  pub email:         String,
  pub full_name:     Option<String>,
  pub password_hash: String,
  pub role:          Role,
  pub status:        AccountStatus,
}

/// An account together with its stored password hash; used only for login.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
  pub account:       Account,
  pub password_hash: String,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn roles_are_lowercase_on_the_wire() {
    assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
    assert_eq!(Role::Editor.to_string(), "editor");
    assert!(Role::from_str("root").is_err());
    assert_eq!(serde_json::to_value(Role::Viewer).unwrap(), "viewer");
  }

  #[test]
  fn default_role_is_editor() {
    assert_eq!(Role::default(), Role::Editor);
    assert_eq!(AccountStatus::default(), AccountStatus::Active);
  }
}
