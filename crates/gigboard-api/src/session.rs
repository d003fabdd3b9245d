//! Handlers for `/session` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/session` | Identity, profile and navigation; never 401 |
//! | `POST` | `/session/register` | Body: [`RegisterBody`]; returns 201 + identity |
//! | `POST` | `/session/login` | Body: `{"email":"...","password":"..."}` |
//! | `POST` | `/session/logout` | 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use gigboard_core::{
  identity::{Credentials, Identity},
  profile::{NewProfile, Profile},
  store::{DocumentStore, IdentityProvider},
};
use gigboard_session::NavState;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

// ─── Current ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionBody {
  pub identity: Option<Identity>,
  pub profile:  Option<Profile>,
  pub nav:      NavState,
}

/// `GET /session`
pub async fn current<I, D>(State(state): State<AppState<I, D>>) -> Json<SessionBody>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let snapshot = state.session.state();
  Json(SessionBody {
    identity: snapshot.identity,
    profile:  snapshot.profile,
    nav:      state.session.nav(),
  })
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /session/register`: credentials plus the
/// profile form, e.g.
/// `{"email":"a@x.com","password":"...","name":"Alice","phone":"","role":"employee"}`.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  #[serde(flatten)]
  pub credentials: Credentials,
  #[serde(flatten)]
  pub profile:     NewProfile,
}

/// `POST /session/register` — returns 201 + the new [`Identity`].
pub async fn register<I, D>(
  State(state): State<AppState<I, D>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let identity = state.session.register(&body.credentials, body.profile).await?;
  Ok((StatusCode::CREATED, Json(identity)))
}

// ─── Login / logout ───────────────────────────────────────────────────────────

/// `POST /session/login`
pub async fn login<I, D>(
  State(state): State<AppState<I, D>>,
  Json(credentials): Json<Credentials>,
) -> Result<Json<Identity>, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  Ok(Json(state.session.login(&credentials).await?))
}

/// `POST /session/logout`
pub async fn logout<I, D>(
  State(state): State<AppState<I, D>>,
) -> Result<StatusCode, ApiError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  state.session.logout().await?;
  Ok(StatusCode::NO_CONTENT)
}
