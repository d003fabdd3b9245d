//! Error type for `gigboard-store-sqlite`.

use gigboard_core::document::Collection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] gigboard_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("document not found: {collection}/{id}")]
  DocumentNotFound { collection: Collection, id: uuid::Uuid },

  /// Field names are restricted to ASCII letters, digits and `_`.
  #[error("invalid field name: {0:?}")]
  InvalidField(String),

  /// Filters compare scalars only; arrays and objects are rejected.
  #[error("unsupported filter value for field {0:?}")]
  UnsupportedFilter(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
