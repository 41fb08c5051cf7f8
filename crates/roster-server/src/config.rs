//! Runtime configuration.
//!
//! Read from an optional TOML file, then overridden by environment variables
//! prefixed with `ROSTER`. Nested keys use `__`, e.g. `ROSTER__PORT=8080` or
//! `ROSTER__IMPORT__ACCOUNT_LIMIT=5`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("roster.db") }

fn default_jwt_expiry_secs() -> u64 { 3600 }

/// Top-level configuration, shared by every subcommand.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// HS256 signing secret. Required by `serve`.
  pub jwt_secret:      Option<String>,
  #[serde(default = "default_jwt_expiry_secs")]
  pub jwt_expiry_secs: u64,
  #[serde(default)]
  pub import:          ImportConfig,
}

/// Account seeding performed by `roster import`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
  pub admin_email:      String,
  pub admin_username:   String,
  /// Falls back to a built-in password, with a warning.
  pub admin_password:   Option<String>,
  /// Initial password for provisioned editor accounts. Falls back to a
  /// built-in password, with a warning.
  pub account_password: Option<String>,
  /// Upper bound on editor accounts provisioned per run.
  pub account_limit:    usize,
}

impl Default for ImportConfig {
  fn default() -> Self {
    Self {
      admin_email:      "admin@example.com".to_owned(),
      admin_username:   "admin".to_owned(),
      admin_password:   None,
      account_password: None,
      account_limit:    10,
    }
  }
}

impl ServerConfig {
  /// Load from `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("ROSTER")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  /// `store_path` with a leading `~/` replaced by `$HOME`.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn defaults_fill_missing_keys() {
    let cfg = parse("");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.store_path, PathBuf::from("roster.db"));
    assert_eq!(cfg.jwt_secret, None);
    assert_eq!(cfg.jwt_expiry_secs, 3600);
    assert_eq!(cfg.import.admin_email, "admin@example.com");
    assert_eq!(cfg.import.admin_username, "admin");
    assert_eq!(cfg.import.account_limit, 10);
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = parse(
      r#"
        port = 8080
        store_path = "/var/lib/roster/roster.db"
        jwt_secret = "0123456789abcdef0123456789abcdef"

        [import]
        account_limit = 3
        account_password = "changeme"
      "#,
    );
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/roster/roster.db"));
    assert!(cfg.jwt_secret.is_some());
    assert_eq!(cfg.import.account_limit, 3);
    assert_eq!(cfg.import.account_password.as_deref(), Some("changeme"));
    assert_eq!(cfg.import.admin_username, "admin");
  }

  #[test]
  fn tilde_expands_only_at_the_start() {
    let plain = Path::new("/tmp/roster.db");
    assert_eq!(expand_tilde(plain), plain);

    let odd = Path::new("data/~/roster.db");
    assert_eq!(expand_tilde(odd), odd);
  }
}
