//! [`DocumentStore`] implementation over the `documents` table.

use chrono::Utc;
use gigboard_core::{
  document::{Collection, Document, FieldFilter, Fields},
  store::DocumentStore,
};
use rusqlite::{OptionalExtension as _, TransactionBehavior, types::Value as SqlValue};
use uuid::Uuid;

use crate::{
  Error, Result, SqliteStore,
  encode::{RawDocument, encode_dt, encode_uuid, field_path, filter_sql, key_filters},
};

impl SqliteStore {
  /// Prepend the collection parameter to the filter parameters and return
  /// the complete `WHERE` clause.
  fn where_clause(
    collection: Collection,
    filters: &[FieldFilter],
  ) -> Result<(String, Vec<SqlValue>)> {
    let (conds, filter_params) = filter_sql(filters)?;
    let mut params = vec![SqlValue::Text(collection.as_str().to_owned())];
    params.extend(filter_params);

    let clause = if conds.is_empty() {
      "WHERE collection = ?".to_owned()
    } else {
      format!("WHERE collection = ? AND {conds}")
    };
    Ok((clause, params))
  }
}

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, collection: Collection, fields: Fields) -> Result<Uuid> {
    let id        = Uuid::new_v4();
    let id_str    = encode_uuid(id);
    let coll_str  = collection.as_str();
    let body_json = serde_json::Value::Object(fields).to_string();
    let at_str    = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (doc_id, collection, body_json, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, coll_str, body_json, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(%collection, %id, "inserted document");
    Ok(id)
  }

  async fn insert_unique(
    &self,
    collection: Collection,
    fields: Fields,
    key_fields: &[&str],
  ) -> Result<Option<Uuid>> {
    let (clause, params) =
      Self::where_clause(collection, &key_filters(&fields, key_fields))?;

    let id        = Uuid::new_v4();
    let id_str    = encode_uuid(id);
    let coll_str  = collection.as_str();
    let body_json = serde_json::Value::Object(fields).to_string();
    let at_str    = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
          .query_row(
            &format!("SELECT 1 FROM documents {clause} LIMIT 1"),
            rusqlite::params_from_iter(params),
            |_| Ok(()),
          )
          .optional()?
          .is_some();

        if exists {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO documents (doc_id, collection, body_json, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, coll_str, body_json, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if inserted {
      tracing::debug!(%collection, %id, "inserted unique document");
      Ok(Some(id))
    } else {
      tracing::debug!(%collection, ?key_fields, "unique insert rejected: key exists");
      Ok(None)
    }
  }

  async fn query(
    &self,
    collection: Collection,
    filters: &[FieldFilter],
  ) -> Result<Vec<Document>> {
    let (clause, params) = Self::where_clause(collection, filters)?;

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT doc_id, body_json FROM documents {clause} ORDER BY seq"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawDocument {
              doc_id:    row.get(0)?,
              body_json: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>> {
    let id_str   = encode_uuid(id);
    let coll_str = collection.as_str();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc_id, body_json FROM documents
               WHERE collection = ?1 AND doc_id = ?2",
              rusqlite::params![coll_str, id_str],
              |row| {
                Ok(RawDocument {
                  doc_id:    row.get(0)?,
                  body_json: row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn update_fields(
    &self,
    collection: Collection,
    id: Uuid,
    patch: Fields,
  ) -> Result<()> {
    // Each patched key becomes a `json_set` path/value pair so the whole
    // merge is a single UPDATE.
    let mut set_args = String::from("body_json");
    let mut params   = Vec::with_capacity(patch.len() * 2 + 2);
    for (key, value) in &patch {
      set_args.push_str(", ?, json(?)");
      params.push(SqlValue::Text(field_path(key)?));
      params.push(SqlValue::Text(value.to_string()));
    }
    params.push(SqlValue::Text(collection.as_str().to_owned()));
    params.push(SqlValue::Text(encode_uuid(id)));

    let sql = format!(
      "UPDATE documents SET body_json = json_set({set_args})
       WHERE collection = ? AND doc_id = ?"
    );

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params))?))
      .await?;

    if changed == 0 {
      return Err(Error::DocumentNotFound { collection, id });
    }
    tracing::debug!(%collection, %id, keys = patch.len(), "updated document");
    Ok(())
  }
}
