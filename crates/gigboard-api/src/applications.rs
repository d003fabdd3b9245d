//! Handlers for `/applications` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/applications` | Employees: their own. Employers: those for their jobs, with actions |
//! | `POST` | `/applications/{id}/status` | Employer. Body: `{"status":"accepted"\|"rejected"}` |

use axum::{
  Json,
  extract::{Path, State},
};
use gigboard_core::{
  application::{Application, ApplicationStatus},
  document::Stored,
  profile::Role,
  store::{DocumentStore, IdentityProvider},
};
use gigboard_session::view::ApplicationEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// The applications visible to the signed-in role.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApplicationList {
  Submitted(Vec<Stored<Application>>),
  Received(Vec<ApplicationEntry>),
}

/// `GET /applications`
pub async fn list<I, D>(
  State(state): State<AppState<I, D>>,
) -> Result<Json<ApplicationList>, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let dashboard = state.dashboard().await?;
  let list = match dashboard.role() {
    Role::Employee => ApplicationList::Submitted(dashboard.my_applications().await?),
    Role::Employer => ApplicationList::Received(dashboard.job_applications().await?),
  };
  Ok(Json(list))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: ApplicationStatus,
}

/// `POST /applications/{id}/status` — returns the updated application.
pub async fn set_status<I, D>(
  State(state): State<AppState<I, D>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Stored<Application>>, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let updated = state
    .dashboard()
    .await?
    .update_application_status(id, body.status)
    .await?;
  Ok(Json(updated))
}
