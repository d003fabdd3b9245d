//! The capability traits Gigboard consumes.
//!
//! [`IdentityProvider`] stands in for the hosted authentication service and
//! [`DocumentStore`] for the hosted document database. Both are implemented by
//! backends (e.g. `gigboard-store-sqlite`); the session and dashboard layers
//! depend only on these abstractions.

use std::future::Future;

use tokio::sync::watch;
use uuid::Uuid;

use crate::{
  AuthError,
  document::{Collection, Document, FieldFilter, Fields},
  identity::{Credentials, Identity},
};

// ─── Identity provider ───────────────────────────────────────────────────────

/// Email/password authentication with a change feed for the signed-in
/// identity.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait IdentityProvider: Send + Sync {
  /// Create an account and sign it in.
  fn create_account<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<Identity, AuthError>> + Send + 'a;

  /// Sign in to an existing account.
  fn sign_in<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = Result<Identity, AuthError>> + Send + 'a;

  /// Sign out. Signing out with no active session is not an error.
  fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send + '_;

  /// Subscribe to the signed-in identity.
  ///
  /// The receiver holds the current value immediately and is notified on
  /// every transition, including transitions to `None`. Intermediate values
  /// may be coalesced; the latest one is never lost.
  fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

// ─── Document store ──────────────────────────────────────────────────────────

/// Collection-scoped JSON document storage.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a document and return its store-assigned id.
  fn insert(
    &self,
    collection: Collection,
    fields: Fields,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Insert a document unless one already exists in `collection` whose values
  /// for every field in `key_fields` equal those in `fields`.
  ///
  /// Returns `None` (and writes nothing) on conflict. The check and the write
  /// are atomic with respect to other calls on the same store.
  fn insert_unique<'a>(
    &'a self,
    collection: Collection,
    fields: Fields,
    key_fields: &'a [&'a str],
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + 'a;

  /// Return all documents in `collection` matching every filter, in
  /// insertion order. An empty filter list returns the whole collection.
  fn query<'a>(
    &'a self,
    collection: Collection,
    filters: &'a [FieldFilter],
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Fetch a single document. Returns `None` if it does not exist.
  fn get(
    &self,
    collection: Collection,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Merge `patch` into an existing document's fields. Fails if the document
  /// does not exist.
  fn update_fields(
    &self,
    collection: Collection,
    id: Uuid,
    patch: Fields,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
