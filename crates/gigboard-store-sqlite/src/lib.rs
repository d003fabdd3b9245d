//! SQLite backend for Gigboard.
//!
//! One file holds both halves of the backend: the account table behind
//! [`IdentityProvider`](gigboard_core::store::IdentityProvider) and the JSON
//! document table behind [`DocumentStore`](gigboard_core::store::DocumentStore).
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod accounts;
mod documents;
mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
