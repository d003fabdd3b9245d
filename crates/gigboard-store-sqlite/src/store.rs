//! [`SqliteStore`] — connection handling and schema initialisation.
//!
//! The trait implementations live in `documents.rs` ([`DocumentStore`]) and
//! `accounts.rs` ([`IdentityProvider`]).
//!
//! [`DocumentStore`]: gigboard_core::store::DocumentStore
//! [`IdentityProvider`]: gigboard_core::store::IdentityProvider

use std::{path::Path, sync::Arc};

use gigboard_core::identity::Identity;
use rusqlite::OptionalExtension as _;
use tokio::sync::watch;

use crate::{encode::decode_uuid, schema::SCHEMA, Result};

/// A Gigboard backend stored in a single SQLite file.
///
/// Cloning is cheap. The inner connection and the session feed are
/// reference-counted, so every clone observes the same signed-in identity.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn:    tokio_rusqlite::Connection,
  pub(crate) session: Arc<watch::Sender<Option<Identity>>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and
  /// restore the persisted session, if any.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    let restored = Self::load_session(&conn).await?;
    if let Some(identity) = &restored {
      tracing::debug!(uid = %identity.uid, "restored persisted session");
    }

    let (session, _) = watch::channel(restored);
    Ok(Self { conn, session: Arc::new(session) })
  }

  async fn load_session(
    conn: &tokio_rusqlite::Connection,
  ) -> Result<Option<Identity>> {
    let row: Option<(String, String)> = conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT a.uid, a.email
               FROM current_session s
               JOIN accounts a ON a.uid = s.uid
               WHERE s.slot = 1",
              [],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(uid, email)| Ok(Identity { uid: decode_uuid(&uid)?, email }))
      .transpose()
  }

  /// Publish `identity` to subscribers if it differs from the current value.
  pub(crate) fn publish(&self, identity: Option<Identity>) {
    self.session.send_if_modified(|current| {
      if *current == identity {
        return false;
      }
      *current = identity;
      true
    });
  }
}
