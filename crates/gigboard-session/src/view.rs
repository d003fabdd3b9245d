//! Role-specific dashboard views.
//!
//! These are plain data. Rendering them (JSON, terminal tables) is up to the
//! caller.

use gigboard_core::{
  application::{Application, ApplicationStatus},
  document::Stored,
  job::Job,
  profile::Profile,
};
use serde::Serialize;

/// The greeting shown at the top of either dashboard.
pub fn welcome(profile: &Profile) -> String {
  format!("Welcome, {} ({})", profile.name, profile.role)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardView {
  Employee(EmployeeView),
  Employer(EmployerView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeView {
  pub welcome:         String,
  pub available_jobs:  Vec<Stored<Job>>,
  pub my_applications: Vec<Stored<Application>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployerView {
  pub welcome:      String,
  pub posted_jobs:  Vec<Stored<Job>>,
  pub applications: Vec<ApplicationEntry>,
}

/// A decision an employer can still take on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationAction {
  Accept,
  Reject,
}

impl ApplicationAction {
  /// The status the application moves to.
  pub fn target(self) -> ApplicationStatus {
    match self {
      Self::Accept => ApplicationStatus::Accepted,
      Self::Reject => ApplicationStatus::Rejected,
    }
  }
}

/// An application as shown to the employer, with the actions still open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationEntry {
  #[serde(flatten)]
  pub application: Stored<Application>,
  pub actions:     Vec<ApplicationAction>,
}

impl From<Stored<Application>> for ApplicationEntry {
  fn from(application: Stored<Application>) -> Self {
    let actions = if application.status.is_decided() {
      Vec::new()
    } else {
      vec![ApplicationAction::Accept, ApplicationAction::Reject]
    };
    Self { application, actions }
  }
}
