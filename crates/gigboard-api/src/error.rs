//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use gigboard_core::AuthError;
use gigboard_session::{DashboardError, HandshakeError, RegistrationError, SessionError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  BadRequest(String),

  /// The session is signed in but its profile could not be loaded.
  #[error("{0}")]
  Unavailable(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  pub fn not_signed_in() -> Self { ApiError::Unauthorized("not signed in".to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::warn!(%status, error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

impl From<AuthError> for ApiError {
  fn from(e: AuthError) -> Self {
    match e {
      AuthError::InvalidEmail(_) | AuthError::WeakPassword { .. } => {
        ApiError::BadRequest(e.to_string())
      }
      AuthError::EmailInUse(_) => ApiError::Conflict(e.to_string()),
      AuthError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
      AuthError::Backend(_) => ApiError::Internal(Box::new(e)),
    }
  }
}

impl From<SessionError> for ApiError {
  fn from(e: SessionError) -> Self {
    match e {
      SessionError::Auth(auth) => auth.into(),
      SessionError::Registration(RegistrationError::Account(auth)) => auth.into(),
      SessionError::Registration(e @ RegistrationError::ReservedField(_)) => {
        ApiError::BadRequest(e.to_string())
      }
      SessionError::Registration(other) => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<HandshakeError> for ApiError {
  fn from(e: HandshakeError) -> Self { ApiError::Unavailable(e.to_string()) }
}

impl From<DashboardError> for ApiError {
  fn from(e: DashboardError) -> Self {
    match e {
      DashboardError::WrongRole { .. } | DashboardError::NotOwner(_) => {
        ApiError::Forbidden(e.to_string())
      }
      DashboardError::JobNotFound(_) | DashboardError::ApplicationNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      DashboardError::DuplicateApplication(_)
      | DashboardError::InvalidTransition { .. }
      | DashboardError::NotConfirmed => ApiError::Conflict(e.to_string()),
      DashboardError::InvalidJob(_) => ApiError::BadRequest(e.to_string()),
      DashboardError::Decode(_) | DashboardError::Persistence(_) => {
        ApiError::Internal(Box::new(e))
      }
    }
  }
}
