//! Handlers for `/api/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth/register` | Body: [`RegisterBody`]; 201 + account, 409 on duplicates |
//! | `POST` | `/api/auth/login` | Body: [`LoginBody`]; 200 + `{token, user}`, 401 on bad credentials |

use std::str::FromStr;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  account::{Account, AccountStatus, NewAccount, Role},
  store::AccountStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{hash_password, verify_password},
  error::ApiError,
};

fn required(value: String, field: &str) -> Result<String, ApiError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(ApiError::BadRequest(format!("{field} is required")));
  }
  Ok(trimmed.to_owned())
}

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
  pub username:  String,
  pub email:     String,
  pub password:  String,
  /// Defaults to `editor`. Registration is open, and any known role may be
  /// requested, `admin` included. This is intended, not an oversight.
  pub role:      Option<String>,
  pub full_name: Option<String>,
}

/// `POST /api/auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AccountStore,
{
  let Json(body) = body?;

  let username = required(body.username, "username")?;
  let email = required(body.email, "email")?;
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password is required".into()));
  }
  let role = match body.role.as_deref().map(str::trim) {
    None | Some("") => Role::default(),
    Some(raw) => Role::from_str(raw)
      .map_err(|_| roster_core::Error::UnknownRole(raw.to_owned()))?,
  };

  let account = state
    .store
    .create_account(NewAccount {
      username,
      email,
      full_name: body.full_name,
      password_hash: hash_password(&body.password)?,
      role,
      status: AccountStatus::Active,
    })
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(username = %account.username, role = %account.role, "registered account");
  Ok((StatusCode::CREATED, Json(account)))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  Account,
}

/// `POST /api/auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: AccountStore,
{
  let Json(body) = body?;
  let invalid = || ApiError::Unauthenticated("invalid credentials".into());

  let credentials = state
    .store
    .find_credentials(body.username.trim())
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(invalid)?;

  if !verify_password(&body.password, &credentials.password_hash) {
    tracing::debug!(username = %body.username, "login failed");
    return Err(invalid());
  }
  if credentials.account.status != AccountStatus::Active {
    return Err(ApiError::Unauthenticated("account is disabled".into()));
  }

  let token = state.tokens.issue(&credentials.account)?;
  Ok(Json(LoginResponse { token, user: credentials.account }))
}
