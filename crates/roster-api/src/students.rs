//! Handlers for `/students` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/students` | Active students only |
//! | `GET`    | `/students/all` | Active and inactive |
//! | `GET`    | `/students/search` | `?query=<text>`; literal, case-insensitive |
//! | `POST`   | `/students` | Body: [`StudentInput`] with `password`; returns 201 |
//! | `GET`    | `/students/{id}` | 404 if not found |
//! | `PUT`    | `/students/{id}` | Partial update |
//! | `DELETE` | `/students/{id}` | Soft delete |
//! | `POST`/`PATCH` | `/students/{id}/restore` | Undo soft delete |
//! | `GET`    | `/students/{id}/profile` | Own profile |
//! | `PUT`    | `/students/{id}/profile` | Own profile update |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{CredentialHasher, Roster, Student, StudentInput, StudentStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam},
};

type Shared<S, H> = State<Arc<Roster<S, H>>>;

// ─── Lists ────────────────────────────────────────────────────────────────────

/// `GET /students`
pub async fn list_active<S, H>(State(roster): Shared<S, H>) -> Result<Json<Vec<Student>>, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  Ok(Json(roster.list_active().await?))
}

/// `GET /students/all`
pub async fn list_all<S, H>(State(roster): Shared<S, H>) -> Result<Json<Vec<Student>>, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  Ok(Json(roster.list_all().await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Substring of name or matricula. Missing or empty matches all active.
  #[serde(alias = "q")]
  pub query: Option<String>,
}

/// `GET /students/search[?query=...]`
pub async fn search<S, H>(
  State(roster): Shared<S, H>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  Ok(Json(roster.search(params.query.as_deref()).await?))
}

// ─── Single record ────────────────────────────────────────────────────────────

/// `GET /students/{id}` and `GET /students/{id}/profile`
pub async fn get_one<S, H>(
  State(roster): Shared<S, H>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Student>, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  Ok(Json(roster.get_by_id(id).await?))
}

/// `POST /students`: returns 201 and the created [`Student`].
pub async fn create<S, H>(
  State(roster): Shared<S, H>,
  JsonBody(body): JsonBody<StudentInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  let student = roster.create(body).await?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `PUT /students/{id}`
pub async fn update<S, H>(
  State(roster): Shared<S, H>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<StudentInput>,
) -> Result<Json<Student>, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  Ok(Json(roster.update(id, body).await?))
}

/// `PUT /students/{id}/profile`
pub async fn update_profile<S, H>(
  State(roster): Shared<S, H>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<StudentInput>,
) -> Result<Json<Student>, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  Ok(Json(roster.update_own_profile(id, body).await?))
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `DELETE /students/{id}`: returns the now-inactive [`Student`].
pub async fn soft_delete<S, H>(
  State(roster): Shared<S, H>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Student>, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  Ok(Json(roster.soft_delete(id).await?))
}

/// `POST|PATCH /students/{id}/restore`
pub async fn restore<S, H>(
  State(roster): Shared<S, H>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Student>, ApiError>
where
  S: StudentStore,
  H: CredentialHasher,
{
  Ok(Json(roster.restore(id).await?))
}
