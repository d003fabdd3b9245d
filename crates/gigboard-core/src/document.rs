//! Documents, collections and filters — the vocabulary of the document store.
//!
//! A document is a JSON object addressed by `(collection, id)`. Typed records
//! ([`Profile`](crate::profile::Profile), [`Job`](crate::job::Job),
//! [`Application`](crate::application::Application)) are encoded into the
//! field map on write and decoded back into a [`Stored`] on read; the document
//! id never appears inside the field map.

use std::ops::Deref;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

/// The field map of a document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

// ─── Collections ─────────────────────────────────────────────────────────────

/// The collections Gigboard reads and writes.
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
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
  /// The general user collection; every profile is written here.
  Users,
  /// Profiles of users registered with the employer role.
  Employers,
  /// Profiles of users registered with the employee role.
  Employees,
  Jobs,
  Applications,
}

impl Collection {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A raw document as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id:     Uuid,
  pub fields: Fields,
}

impl Document {
  /// Decode the field map into a typed record, keeping the document id
  /// alongside it.
  pub fn decode<T: DeserializeOwned>(&self) -> Result<Stored<T>> {
    let record =
      serde_json::from_value(serde_json::Value::Object(self.fields.clone()))?;
    Ok(Stored { id: self.id, record })
  }
}

/// Encode a typed record into the field map written to `collection`.
pub fn encode<T: Serialize>(collection: Collection, record: &T) -> Result<Fields> {
  match serde_json::to_value(record)? {
    serde_json::Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject(collection)),
  }
}

/// A record paired with the id of the document it was read from.
///
/// Serialises flat, i.e. `{"id": "...", <record fields>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
  pub id:     Uuid,
  #[serde(flatten)]
  pub record: T,
}

impl<T> Deref for Stored<T> {
  type Target = T;

  fn deref(&self) -> &T { &self.record }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// An equality condition on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
  pub field: String,
  pub value: serde_json::Value,
}

impl FieldFilter {
  pub fn eq(
    field: impl Into<String>,
    value: impl Into<serde_json::Value>,
  ) -> Self {
    Self { field: field.into(), value: value.into() }
  }

  /// Whether `fields` satisfies this filter. Backends that cannot filter
  /// natively may use this to filter in memory.
  pub fn matches(&self, fields: &Fields) -> bool {
    fields.get(&self.field).unwrap_or(&serde_json::Value::Null) == &self.value
  }
}
