//! JSON REST API for Gigboard.
//!
//! Exposes an axum [`Router`] over one [`SessionManager`]: the server acts as
//! a single local client, so there is exactly one signed-in identity at a
//! time and the session endpoints switch it.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gigboard_api::api_router(AppState::new(session, policy)))
//! ```

pub mod applications;
pub mod dashboard;
pub mod error;
pub mod jobs;
pub mod session;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{delete, get, post},
};
use gigboard_core::{
  identity::Identity,
  store::{DocumentStore, IdentityProvider},
};
use gigboard_session::{Dashboard, RetryPolicy, SessionManager};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Profile reads a request may spend before answering 503, when the policy
/// itself is unbounded.
pub const DEFAULT_REQUEST_ATTEMPTS: u32 = 3;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<I, D> {
  pub session: Arc<SessionManager<I, D>>,
  /// Always bounded: a request never waits indefinitely for a profile.
  pub policy:  RetryPolicy,
}

impl<I, D> Clone for AppState<I, D> {
  fn clone(&self) -> Self { Self { session: self.session.clone(), policy: self.policy } }
}

impl<I, D> AppState<I, D>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  pub fn new(session: Arc<SessionManager<I, D>>, mut policy: RetryPolicy) -> Self {
    policy.max_profile_attempts =
      Some(policy.max_profile_attempts.unwrap_or(DEFAULT_REQUEST_ATTEMPTS));
    Self { session, policy }
  }

  /// The signed-in identity, or 401.
  pub(crate) fn identity(&self) -> Result<Identity, ApiError> {
    self.session.current_identity().ok_or_else(ApiError::not_signed_in)
  }

  /// Open a dashboard for the signed-in session: 401 without an identity,
  /// 503 if its profile does not load within the policy.
  pub(crate) async fn dashboard(&self) -> Result<Dashboard<D>, ApiError> {
    self.identity()?;

    // The identity may disappear while waiting; bound the wait so the
    // request does not hang on the identity half of the handshake.
    let opened = tokio::time::timeout(
      self.request_budget(),
      Dashboard::open(&self.session, &self.policy, &CancellationToken::new()),
    )
    .await;

    match opened {
      Ok(dashboard) => Ok(dashboard?),
      Err(_) => {
        // Signed out mid-request.
        self.identity()?;
        Err(ApiError::Unavailable("timed out waiting for the session".to_string()))
      }
    }
  }

  /// Every profile attempt plus a second of slack, saturating.
  fn request_budget(&self) -> Duration {
    let attempts = self.policy.max_profile_attempts.unwrap_or(DEFAULT_REQUEST_ATTEMPTS);
    self
      .policy
      .profile_retry
      .checked_mul(attempts)
      .and_then(|d| d.checked_add(Duration::from_secs(1)))
      .unwrap_or(Duration::MAX)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<I, D>(state: AppState<I, D>) -> Router<()>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  Router::new()
    // Session
    .route("/session", get(session::current::<I, D>))
    .route("/session/register", post(session::register::<I, D>))
    .route("/session/login", post(session::login::<I, D>))
    .route("/session/logout", post(session::logout::<I, D>))
    // Dashboard
    .route("/dashboard", get(dashboard::view::<I, D>))
    // Jobs
    .route("/jobs", get(jobs::list::<I, D>).post(jobs::create::<I, D>))
    .route("/jobs/{id}", delete(jobs::remove::<I, D>))
    .route("/jobs/{id}/apply", post(jobs::apply::<I, D>))
    // Applications
    .route("/applications", get(applications::list::<I, D>))
    .route("/applications/{id}/status", post(applications::set_status::<I, D>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
