//! Handlers for `/jobs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/jobs` | Employees: open jobs. Employers: their posted jobs |
//! | `POST`   | `/jobs` | Employer. Body: [`NewJob`]; returns 201 + stored job |
//! | `DELETE` | `/jobs/{id}?confirm=true` | Employer. 409 unless confirmed |
//! | `POST`   | `/jobs/{id}/apply` | Employee. Returns 201 + the application |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use gigboard_core::{
  document::Stored,
  job::{Job, NewJob},
  profile::Role,
  store::{DocumentStore, IdentityProvider},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /jobs`
pub async fn list<I, D>(
  State(state): State<AppState<I, D>>,
) -> Result<Json<Vec<Stored<Job>>>, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let dashboard = state.dashboard().await?;
  let jobs = match dashboard.role() {
    Role::Employee => dashboard.available_jobs().await?,
    Role::Employer => dashboard.posted_jobs().await?,
  };
  Ok(Json(jobs))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /jobs` — returns 201 + the stored job.
pub async fn create<I, D>(
  State(state): State<AppState<I, D>>,
  Json(form): Json<NewJob>,
) -> Result<impl IntoResponse, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let job = state.dashboard().await?.post_job(form).await?;
  Ok((StatusCode::CREATED, Json(job)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
  /// Answer to the delete confirmation. Absent means "no".
  #[serde(default)]
  pub confirm: bool,
}

/// `DELETE /jobs/{id}?confirm=true` — soft delete, 204.
pub async fn remove<I, D>(
  State(state): State<AppState<I, D>>,
  Path(id): Path<Uuid>,
  Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  state.dashboard().await?.delete_job(id, &params.confirm).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Apply ────────────────────────────────────────────────────────────────────

/// `POST /jobs/{id}/apply` — returns 201 + the pending application.
pub async fn apply<I, D>(
  State(state): State<AppState<I, D>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let application = state.dashboard().await?.apply_for_job(id).await?;
  Ok((StatusCode::CREATED, Json(application)))
}
