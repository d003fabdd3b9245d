//! Job postings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::Profile;

/// A job posted by an employer. "Deleted" jobs keep their document; only the
/// `deleted` flag changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
  pub title:         String,
  pub description:   String,
  /// Free text, as entered by the employer (e.g. `"50"`, `"$20/h"`).
  pub salary:        String,
  pub category:      String,
  pub employer_id:   Uuid,
  /// Denormalised from the employer's profile at posting time.
  pub employer_name: String,
  pub created_at:    DateTime<Utc>,
  /// Soft-delete flag. Documents written before the flag existed lack it.
  #[serde(default)]
  pub deleted:       bool,
}

/// Field names used in job queries and patches.
pub mod fields {
  pub const EMPLOYER_ID: &str = "employerId";
  pub const DELETED: &str = "deleted";
}

/// The job form filled in by an employer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewJob {
  pub title:       String,
  pub description: String,
  pub salary:      String,
  pub category:    String,
}

impl NewJob {
  /// Stamp the form with its owner and creation time.
  pub fn into_job(self, employer: &Profile, created_at: DateTime<Utc>) -> Job {
    Job {
      title: self.title,
      description: self.description,
      salary: self.salary,
      category: self.category,
      employer_id: employer.uid,
      employer_name: employer.name.clone(),
      created_at,
      deleted: false,
    }
  }
}
