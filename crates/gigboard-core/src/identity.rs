//! Identity — the account record issued by the identity provider.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated account. Owned by the identity provider and never
/// modified by Gigboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub uid:   Uuid,
  pub email: String,
}

/// Email/password pair accepted by the identity provider.
#[derive(Clone, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl Credentials {
  pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
    Self { email: email.into(), password: password.into() }
  }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("email", &self.email)
      .field("password", &"<redacted>")
      .finish()
  }
}
