//! Navigation affordances derived from the session.
//!
//! Signed out, the primary action is *Join* and there is no logout control.
//! Signed in, the primary action becomes *Dashboard* and a logout control
//! appears.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavAction {
  /// Go to the login / registration page.
  Join,
  /// Go to the role dashboard.
  Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavState {
  pub primary:        NavAction,
  pub logout_visible: bool,
}

impl NavState {
  pub const SIGNED_OUT: Self = Self { primary: NavAction::Join, logout_visible: false };
  pub const SIGNED_IN: Self = Self { primary: NavAction::Dashboard, logout_visible: true };

  pub fn for_session(active: bool) -> Self {
    if active { Self::SIGNED_IN } else { Self::SIGNED_OUT }
  }
}

impl Default for NavState {
  fn default() -> Self { Self::SIGNED_OUT }
}
