//! The access gate: password hashing, bearer tokens, and the role-checking
//! extractors.
//!
//! | Extractor | Rejects with |
//! |-----------|--------------|
//! | [`Authenticated`] | 401 on a missing, malformed, invalid or expired token |
//! | [`Authorized<P>`] | 401 as above; 403 when the role is not in `P::ROLES` |

use std::marker::PhantomData;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use roster_core::account::{Account, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AppState, error::ApiError};

/// Shortest accepted HMAC secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::internal(format!("argon2 error: {e}")))
}

/// `true` if `password` matches the PHC string `hash`. An unparseable hash
/// never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
  pub id:       i64,
  pub username: String,
  pub role:     Role,
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// Account id, as a decimal string.
  pub sub:      String,
  pub username: String,
  pub role:     Role,
  pub iat:      i64,
  pub exp:      i64,
}

#[derive(Debug, Error)]
#[error("jwt secret must be at least {MIN_SECRET_LEN} characters")]
pub struct WeakSecret;

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenKeys {
  encoding:    EncodingKey,
  decoding:    DecodingKey,
  expiry_secs: i64,
}

impl TokenKeys {
  pub fn new(secret: &str, expiry_secs: u64) -> Result<Self, WeakSecret> {
    if secret.len() < MIN_SECRET_LEN {
      return Err(WeakSecret);
    }
    Ok(Self {
      encoding:    EncodingKey::from_secret(secret.as_bytes()),
      decoding:    DecodingKey::from_secret(secret.as_bytes()),
      expiry_secs: i64::try_from(expiry_secs).unwrap_or(i64::MAX),
    })
  }

  /// Sign a token for `account`, valid for the configured lifetime.
  pub fn issue(&self, account: &Account) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
      sub:      account.id.to_string(),
      username: account.username.clone(),
      role:     account.role,
      iat:      now,
      exp:      now.saturating_add(self.expiry_secs),
    };
    encode(&Header::default(), &claims, &self.encoding)
      .map_err(|e| ApiError::internal(format!("failed to sign token: {e}")))
  }

  /// Check signature and expiry, then turn the claims into a [`Principal`].
  pub fn verify(&self, token: &str) -> Result<Principal, ApiError> {
    let data = decode::<Claims>(token, &self.decoding, &Validation::default())
      .map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        ApiError::Unauthenticated("invalid or expired token".into())
      })?;

    let id = data
      .claims
      .sub
      .parse()
      .map_err(|_| ApiError::Unauthenticated("invalid or expired token".into()))?;

    Ok(Principal {
      id,
      username: data.claims.username,
      role: data.claims.role,
    })
  }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .ok_or_else(|| ApiError::Unauthenticated("authentication required".into()))?;

  value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .ok_or_else(|| ApiError::Unauthenticated("malformed authorization header".into()))
}

// ─── Authorization ───────────────────────────────────────────────────────────

/// Check `principal` against `allowed`.
pub fn authorize<'a>(
  principal: Option<&'a Principal>,
  allowed: &[Role],
) -> Result<&'a Principal, ApiError> {
  let principal = principal
    .ok_or_else(|| ApiError::Forbidden("authentication required".into()))?;

  if allowed.contains(&principal.role) {
    Ok(principal)
  } else {
    tracing::warn!(
      username = %principal.username,
      role = %principal.role,
      "access denied"
    );
    Err(ApiError::Forbidden("insufficient permissions".into()))
  }
}

/// A named set of roles admitted to a route.
pub trait RolePolicy: Send + Sync + 'static {
  const ROLES: &'static [Role];
}

/// Admins and editors: may create and update people.
pub struct Editors;

impl RolePolicy for Editors {
  const ROLES: &'static [Role] = &[Role::Admin, Role::Editor];
}

/// Admins only: may remove people.
pub struct Admins;

impl RolePolicy for Admins {
  const ROLES: &'static [Role] = &[Role::Admin];
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Present in a handler means the request carried a valid token.
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    Ok(Authenticated(state.tokens.verify(token)?))
  }
}

/// Present in a handler means the request carried a valid token whose role
/// is admitted by `P`.
pub struct Authorized<P: RolePolicy>(pub Principal, pub PhantomData<P>);

impl<S, P> FromRequestParts<AppState<S>> for Authorized<P>
where
  S: Send + Sync + 'static,
  P: RolePolicy,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Authenticated(principal) =
      Authenticated::from_request_parts(parts, state).await?;
    authorize(Some(&principal), P::ROLES)?;
    Ok(Authorized(principal, PhantomData))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::{HeaderValue, StatusCode};
  use roster_core::account::AccountStatus;

  use super::*;

  const SECRET: &str = "an-hs256-secret-of-at-least-32-bytes";

  fn account(role: Role) -> Account {
    Account {
      id: 7,
      username: "jane".into(),
      email: "jane@example.com".into(),
      full_name: None,
      role,
      status: AccountStatus::Active,
      created_at: Utc::now(),
    }
  }

  fn principal(role: Role) -> Principal {
    Principal { id: 1, username: "p".into(), role }
  }

  #[test]
  fn short_secret_is_refused() {
    assert!(TokenKeys::new("too-short", 3600).is_err());
    assert!(TokenKeys::new(SECRET, 3600).is_ok());
  }

  #[test]
  fn token_round_trip() {
    let keys = TokenKeys::new(SECRET, 3600).unwrap();
    let token = keys.issue(&account(Role::Editor)).unwrap();

    let principal = keys.verify(&token).unwrap();
    assert_eq!(principal, Principal {
      id:       7,
      username: "jane".into(),
      role:     Role::Editor,
    });
  }

  #[test]
  fn token_from_another_secret_is_rejected() {
    let keys = TokenKeys::new(SECRET, 3600).unwrap();
    let other = TokenKeys::new("a-completely-different-32-byte-secret", 3600)
      .unwrap();
    let token = other.issue(&account(Role::Admin)).unwrap();

    assert!(matches!(keys.verify(&token), Err(ApiError::Unauthenticated(_))));
    assert!(matches!(keys.verify("garbage"), Err(ApiError::Unauthenticated(_))));
  }

  #[test]
  fn expired_token_is_rejected() {
    let keys = TokenKeys::new(SECRET, 3600).unwrap();
    let past = Utc::now().timestamp() - 3600;
    let claims = Claims {
      sub:      "7".into(),
      username: "jane".into(),
      role:     Role::Admin,
      iat:      past - 60,
      exp:      past,
    };
    let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

    assert!(matches!(keys.verify(&token), Err(ApiError::Unauthenticated(_))));
  }

  #[test]
  fn bearer_header_parsing() {
    let mut headers = HeaderMap::new();
    assert!(matches!(bearer_token(&headers), Err(ApiError::Unauthenticated(_))));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert!(matches!(bearer_token(&headers), Err(ApiError::Unauthenticated(_))));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert!(matches!(bearer_token(&headers), Err(ApiError::Unauthenticated(_))));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
    assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
  }

  #[test]
  fn role_policies() {
    let admin = principal(Role::Admin);
    let editor = principal(Role::Editor);
    let viewer = principal(Role::Viewer);

    assert!(authorize(Some(&admin), Editors::ROLES).is_ok());
    assert!(authorize(Some(&editor), Editors::ROLES).is_ok());
    assert!(authorize(Some(&viewer), Editors::ROLES).is_err());

    assert!(authorize(Some(&admin), Admins::ROLES).is_ok());
    let denied = authorize(Some(&editor), Admins::ROLES).unwrap_err();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let anonymous = authorize(None, Admins::ROLES).unwrap_err();
    assert_eq!(anonymous.status(), StatusCode::FORBIDDEN);
  }

  #[test]
  fn password_hash_verifies() {
    let hash = hash_password("hunter2").unwrap();
    assert!(verify_password("hunter2", &hash));
    assert!(!verify_password("hunter3", &hash));
    assert!(!verify_password("hunter2", "not-a-phc-string"));
  }
}
