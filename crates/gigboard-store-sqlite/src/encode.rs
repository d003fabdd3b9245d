//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns, plus the translation of
//! [`FieldFilter`]s into JSON1 predicates.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Document bodies are compact JSON objects.

use chrono::{DateTime, Utc};
use gigboard_core::document::{Document, FieldFilter, Fields};
use rusqlite::types::Value as SqlValue;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Field names ─────────────────────────────────────────────────────────────

/// Validate a top-level field name and return its JSON path.
pub fn field_path(field: &str) -> Result<String> {
  let valid = !field.is_empty()
    && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
  if !valid {
    return Err(Error::InvalidField(field.to_owned()));
  }
  Ok(format!("$.{field}"))
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Translate `filters` into a conjunction of predicates over `body_json`.
///
/// Returns the SQL fragment (empty if there are no filters) and its positional
/// parameters, in order. A missing field compares equal to `null`. Strings and
/// numbers are compared by JSON type as well as value, so `"1"` never matches
/// `1`.
pub fn filter_sql(filters: &[FieldFilter]) -> Result<(String, Vec<SqlValue>)> {
  let mut conds  = Vec::with_capacity(filters.len());
  let mut params = Vec::new();

  for filter in filters {
    let path = field_path(&filter.field)?;
    let cond = match &filter.value {
      serde_json::Value::Null => {
        params.push(SqlValue::Text(path.clone()));
        params.push(SqlValue::Text(path));
        "(json_type(body_json, ?) IS NULL OR json_type(body_json, ?) = 'null')"
      }
      serde_json::Value::Bool(true) => {
        params.push(SqlValue::Text(path));
        "json_type(body_json, ?) = 'true'"
      }
      serde_json::Value::Bool(false) => {
        params.push(SqlValue::Text(path));
        "json_type(body_json, ?) = 'false'"
      }
      serde_json::Value::Number(n) => {
        params.push(SqlValue::Text(path.clone()));
        params.push(SqlValue::Text(path));
        params.push(match n.as_i64() {
          Some(i) => SqlValue::Integer(i),
          None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        });
        "(json_type(body_json, ?) IN ('integer', 'real') AND json_extract(body_json, ?) = ?)"
      }
      serde_json::Value::String(s) => {
        params.push(SqlValue::Text(path.clone()));
        params.push(SqlValue::Text(path));
        params.push(SqlValue::Text(s.clone()));
        "(json_type(body_json, ?) = 'text' AND json_extract(body_json, ?) = ?)"
      }
      serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
        return Err(Error::UnsupportedFilter(filter.field.clone()));
      }
    };
    conds.push(cond);
  }

  Ok((conds.join(" AND "), params))
}

/// Build the equality filters for a uniqueness key from the values in
/// `fields`. Key fields absent from `fields` compare as `null`.
pub fn key_filters(fields: &Fields, key_fields: &[&str]) -> Vec<FieldFilter> {
  key_fields
    .iter()
    .map(|key| {
      FieldFilter::eq(
        *key,
        fields.get(*key).cloned().unwrap_or(serde_json::Value::Null),
      )
    })
    .collect()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub doc_id:    String,
  pub body_json: String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      id:     decode_uuid(&self.doc_id)?,
      fields: serde_json::from_str::<Fields>(&self.body_json)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn field_names_are_validated() {
    assert_eq!(field_path("employerId").unwrap(), "$.employerId");
    assert!(matches!(field_path(""), Err(Error::InvalidField(_))));
    assert!(matches!(field_path("a.b"), Err(Error::InvalidField(_))));
    assert!(matches!(field_path("x') OR 1=1 --"), Err(Error::InvalidField(_))));
  }

  #[test]
  fn filter_params_line_up_with_placeholders() {
    let filters = [
      FieldFilter::eq("jobId", "abc"),
      FieldFilter::eq("deleted", true),
      FieldFilter::eq("rank", 3),
    ];
    let (sql, params) = filter_sql(&filters).unwrap();
    assert_eq!(sql.matches('?').count(), params.len());
    assert_eq!(params.len(), 3 + 1 + 3);
  }

  #[test]
  fn composite_filter_values_are_rejected() {
    let filters = [FieldFilter::eq("tags", serde_json::json!(["a"]))];
    assert!(matches!(filter_sql(&filters), Err(Error::UnsupportedFilter(_))));
  }
}
