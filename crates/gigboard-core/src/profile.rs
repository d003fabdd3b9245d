//! Profile — the application-level user record attached to an identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{document::Collection, document::Fields, identity::Identity};

/// Determines which dashboard a user sees and which operations they may run.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Employee,
  Employer,
}

impl Role {
  /// The role-specific collection a profile with this role is written to.
  pub fn collection(self) -> Collection {
    match self {
      Self::Employee => Collection::Employees,
      Self::Employer => Collection::Employers,
    }
  }
}

/// A user profile as stored in the `users`, `employers` and `employees`
/// collections. Written once at registration and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  /// Foreign key to [`Identity::uid`].
  pub uid:        Uuid,
  pub email:      String,
  pub name:       String,
  pub phone:      String,
  #[serde(rename = "userType")]
  pub role:       Role,
  pub created_at: DateTime<Utc>,
  /// Any additional registration fields, stored verbatim.
  #[serde(flatten)]
  pub extra:      Fields,
}

/// Field name of the identity foreign key.
pub const UID_FIELD: &str = "uid";

/// Stored field names owned by [`Profile`] itself, plus the document id.
/// Registration extras may not use them.
pub const RESERVED_FIELDS: &[&str] =
  &["id", UID_FIELD, "email", "name", "phone", "userType", "createdAt"];

/// The registration form: everything a profile holds that the identity does
/// not.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
  pub name:  String,
  pub phone: String,
  pub role:  Role,
  #[serde(default)]
  pub extra: Fields,
}

impl NewProfile {
  pub fn new(name: impl Into<String>, phone: impl Into<String>, role: Role) -> Self {
    Self { name: name.into(), phone: phone.into(), role, extra: Fields::new() }
  }

  /// The first extra field that would shadow a [`RESERVED_FIELDS`] entry.
  pub fn reserved_extra(&self) -> Option<&str> {
    self
      .extra
      .keys()
      .map(String::as_str)
      .find(|key| RESERVED_FIELDS.contains(key))
  }

  /// Bind the form to a freshly-created identity.
  pub fn into_profile(self, identity: &Identity, created_at: DateTime<Utc>) -> Profile {
    Profile {
      uid: identity.uid,
      email: identity.email.clone(),
      name: self.name,
      phone: self.phone,
      role: self.role,
      created_at,
      extra: self.extra,
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::document::encode;

  #[test]
  fn profile_uses_backend_field_names() {
    let identity = Identity { uid: Uuid::new_v4(), email: "alice@x.com".into() };
    let mut form = NewProfile::new("Alice", "555-0100", Role::Employee);
    form.extra.insert("city".into(), json!("Springfield"));

    let profile = form.into_profile(&identity, Utc::now());
    let fields = encode(Collection::Users, &profile).unwrap();

    assert_eq!(fields["userType"], json!("employee"));
    assert_eq!(fields["uid"], json!(identity.uid.to_string()));
    assert_eq!(fields["city"], json!("Springfield"));
    assert!(fields.contains_key("createdAt"));
  }

  #[test]
  fn extras_may_not_shadow_profile_fields() {
    let mut form = NewProfile::new("Mallory", "", Role::Employee);
    form.extra.insert("city".into(), json!("Springfield"));
    assert_eq!(form.reserved_extra(), None);

    for key in ["uid", "userType", "createdAt", "email", "id"] {
      let mut form = form.clone();
      form.extra.insert(key.into(), json!(5));
      assert_eq!(form.reserved_extra(), Some(key));
    }
  }

  #[test]
  fn extra_fields_survive_a_read() {
    let uid = Uuid::new_v4();
    let value = json!({
      "uid": uid,
      "email": "bob@x.com",
      "name": "Bob",
      "phone": "",
      "userType": "employer",
      "createdAt": "2024-03-01T12:00:00Z",
      "company": "Bob's Yards",
    });
    let profile: Profile = serde_json::from_value(value).unwrap();
    assert_eq!(profile.role, Role::Employer);
    assert_eq!(profile.extra.get("company"), Some(&json!("Bob's Yards")));
    assert_eq!(profile.extra.len(), 1);
  }

  #[test]
  fn role_collection() {
    assert_eq!(Role::Employee.collection(), Collection::Employees);
    assert_eq!(Role::Employer.collection(), Collection::Employers);
    assert_eq!("employer".parse::<Role>().unwrap(), Role::Employer);
  }
}
