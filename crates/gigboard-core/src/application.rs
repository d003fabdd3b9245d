//! Job applications and their status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an application stands. `Pending` is the only non-terminal state.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  Pending,
  Accepted,
  Rejected,
}

impl ApplicationStatus {
  /// Only `pending → accepted` and `pending → rejected` are allowed.
  pub fn can_transition_to(self, next: Self) -> bool {
    matches!(
      (self, next),
      (Self::Pending, Self::Accepted) | (Self::Pending, Self::Rejected)
    )
  }

  pub fn is_decided(self) -> bool { self != Self::Pending }
}

/// An employee's application to a job. At most one exists per
/// `(job_id, employee_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
  pub job_id:         Uuid,
  /// Denormalised from the job at application time.
  pub job_title:      String,
  pub employee_id:    Uuid,
  pub employee_name:  String,
  pub employee_email: String,
  pub status:         ApplicationStatus,
  pub applied_at:     DateTime<Utc>,
}

/// Field names shared by queries and the uniqueness key.
pub mod fields {
  pub const JOB_ID: &str = "jobId";
  pub const EMPLOYEE_ID: &str = "employeeId";
  pub const STATUS: &str = "status";
}
