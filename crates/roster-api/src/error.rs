//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::{Classify, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  /// Missing, malformed, invalid or expired credential.
  #[error("{0}")]
  Unauthenticated(String),

  /// Authenticated but not permitted, or no principal where one is required.
  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map any classified store or domain error onto its response category.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match err.kind() {
      ErrorKind::InvalidArgument => Self::BadRequest(err.to_string()),
      ErrorKind::NotFound => Self::NotFound(err.to_string()),
      ErrorKind::Conflict => Self::Conflict(err.to_string()),
      ErrorKind::Internal => Self::Internal(Box::new(err)),
    }
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal(message.into().into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(err: roster_core::Error) -> Self { Self::from_store(err) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        "Something went wrong".to_owned()
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn store_errors_map_by_kind() {
    let not_found = ApiError::from(roster_core::Error::PersonNotFound(4));
    assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

    let conflict = ApiError::from(roster_core::Error::DuplicateAccount);
    assert_eq!(conflict.status(), StatusCode::CONFLICT);

    let bad = ApiError::from(roster_core::Error::InvalidDate("x".into()));
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn internal_details_stay_out_of_the_body() {
    let response = ApiError::internal("disk on fire").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
