//! Handlers for `/api/people` endpoints.
//!
//! | Method   | Path | Access | Notes |
//! |----------|------|--------|-------|
//! | `GET`    | `/api/people` | open | Optional `?type`, `city`, `status`, `category`, `tier` |
//! | `GET`    | `/api/people/:id` | open | 404 if not found |
//! | `POST`   | `/api/people` | admin, editor | Body: [`PersonInput`]; 201 + `{person, influencerProfile}` |
//! | `PUT`    | `/api/people/:id` | admin, editor | Body: [`PersonInput`]; full replacement |
//! | `DELETE` | `/api/people/:id` | admin | Removes the person and its profile |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  input::{PersonInput, parse_person_type},
  person::{PeopleFilter, PersonView, SavedPerson},
  store::PeopleStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState,
  auth::{Admins, Authorized, Editors},
  error::ApiError,
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(rename = "type")]
  pub kind:     Option<String>,
  pub city:     Option<String>,
  pub status:   Option<String>,
  pub category: Option<String>,
  pub tier:     Option<String>,
}

impl ListParams {
  /// Empty query values are treated as absent.
  pub fn into_filter(self) -> Result<PeopleFilter, ApiError> {
    fn present(value: Option<String>) -> Option<String> {
      value.filter(|v| !v.trim().is_empty())
    }

    let kind = present(self.kind)
      .map(|raw| parse_person_type(Some(&raw)))
      .transpose()?;

    Ok(PeopleFilter {
      kind,
      city: present(self.city),
      collaboration_status: present(self.status),
      category: present(self.category),
      engagement_rate_tier: present(self.tier),
    })
  }
}

/// `GET /api/people[?type=&city=&status=&category=&tier=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<PersonView>>, ApiError>
where
  S: PeopleStore,
{
  let Query(params) = params?;
  let filter = params.into_filter()?;

  let people = state
    .store
    .list_people(&filter)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(people))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /api/people/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PeopleStore,
{
  let Path(id) = id?;
  let person = state
    .store
    .get_person(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("Person not found".into()))?;
  Ok(Json(person))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /api/people`
pub async fn create<S>(
  Authorized(principal, ..): Authorized<Editors>,
  State(state): State<AppState<S>>,
  body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PeopleStore,
{
  let Json(body) = body?;
  let write = body.validate()?;

  let saved: SavedPerson = state
    .store
    .create_person(write)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(
    record_id = %saved.person.record_id,
    by = %principal.username,
    "created person"
  );
  Ok((StatusCode::CREATED, Json(saved)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /api/people/:id`
pub async fn update<S>(
  Authorized(principal, ..): Authorized<Editors>,
  State(state): State<AppState<S>>,
  id: Result<Path<i64>, PathRejection>,
  body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Json<SavedPerson>, ApiError>
where
  S: PeopleStore,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let write = body.validate()?;

  let saved = state
    .store
    .update_person(id, write)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(
    record_id = %saved.person.record_id,
    by = %principal.username,
    "updated person"
  );
  Ok(Json(saved))
}

// ─── Remove ──────────────────────────────────────────────────────────────────

/// `DELETE /api/people/:id`
pub async fn remove<S>(
  Authorized(principal, ..): Authorized<Admins>,
  State(state): State<AppState<S>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: PeopleStore,
{
  let Path(id) = id?;
  state
    .store
    .remove_person(id)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(id, by = %principal.username, "removed person");
  Ok(Json(json!({ "message": "Person deleted successfully" })))
}

#[cfg(test)]
mod tests {
  use roster_core::person::PersonType;

  use super::*;

  #[test]
  fn empty_query_values_are_ignored() {
    let params = ListParams {
      kind: Some(String::new()),
      city: Some(" ".into()),
      ..Default::default()
    };
    assert_eq!(params.into_filter().unwrap(), PeopleFilter::default());
  }

  #[test]
  fn query_maps_onto_filter() {
    let params = ListParams {
      kind: Some("INF".into()),
      status: Some("active".into()),
      tier: Some("high".into()),
      ..Default::default()
    };
    let filter = params.into_filter().unwrap();
    assert_eq!(filter.kind, Some(PersonType::Influencer));
    assert_eq!(filter.collaboration_status.as_deref(), Some("active"));
    assert_eq!(filter.engagement_rate_tier.as_deref(), Some("high"));
  }

  #[test]
  fn unknown_type_in_query_is_a_bad_request() {
    let params = ListParams { kind: Some("VIP".into()), ..Default::default() };
    let err = params.into_filter().unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
  }
}
