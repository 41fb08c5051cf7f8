//! JSON REST API for the Roster people registry.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`PeopleStore`] and [`AccountStore`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(store, TokenKeys::new(&secret, 3600)?);
//! axum::serve(listener, roster_api::router(state)).await?;
//! ```

pub mod accounts;
pub mod auth;
pub mod error;
pub mod people;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::store::{AccountStore, PeopleStore};

pub use auth::TokenKeys;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenKeys>,
}

impl<S> AppState<S> {
  pub fn new(store: S, tokens: TokenKeys) -> Self {
    Self { store: Arc::new(store), tokens: Arc::new(tokens) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), tokens: Arc::clone(&self.tokens) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: PeopleStore + AccountStore + 'static,
{
  Router::new()
    // Accounts
    .route("/api/auth/register", post(accounts::register::<S>))
    .route("/api/auth/login", post(accounts::login::<S>))
    // People
    .route("/api/people", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/api/people/{id}",
      get(people::get_one::<S>)
        .put(people::update::<S>)
        .delete(people::remove::<S>),
    )
    .with_state(state)
}
