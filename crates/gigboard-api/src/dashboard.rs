//! Handler for `GET /dashboard`: the role view of the signed-in user.

use axum::{Json, extract::State};
use gigboard_core::store::{DocumentStore, IdentityProvider};
use gigboard_session::view::DashboardView;

use crate::{AppState, error::ApiError};

/// `GET /dashboard` — 401 when signed out, 503 when the profile is missing.
pub async fn view<I, D>(
  State(state): State<AppState<I, D>>,
) -> Result<Json<DashboardView>, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let dashboard = state.dashboard().await?;
  Ok(Json(dashboard.view().await?))
}
