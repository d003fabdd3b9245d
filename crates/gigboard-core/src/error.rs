//! Error types for `gigboard-core`.

use thiserror::Error;

use crate::document::Collection;

#[derive(Debug, Error)]
pub enum Error {
  #[error("record in {0} did not serialise to a JSON object")]
  NotAnObject(Collection),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures reported by an [`IdentityProvider`](crate::store::IdentityProvider).
///
/// Bad input and bad credentials are distinguished from backend failures so
/// callers can show the former to the user verbatim.
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("password must be at least {min} characters")]
  WeakPassword { min: usize },

  #[error("an account already exists for {0}")]
  EmailInUse(String),

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("identity backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
