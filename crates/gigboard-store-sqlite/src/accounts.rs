//! [`IdentityProvider`] implementation over the `accounts` and
//! `current_session` tables.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chrono::Utc;
use gigboard_core::{
  AuthError,
  identity::{Credentials, Identity},
  store::IdentityProvider,
};
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
  Error, SqliteStore,
  encode::{decode_uuid, encode_dt, encode_uuid},
};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

fn backend(e: impl Into<Error>) -> AuthError { AuthError::Backend(Box::new(e.into())) }

/// Trim and lower-case `email`, rejecting anything without a local part and a
/// domain.
fn normalize_email(email: &str) -> Result<String, AuthError> {
  let email = email.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain))
      if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
    {
      Ok(email)
    }
    _ => Err(AuthError::InvalidEmail(email)),
  }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| backend(Error::PasswordHash(e.to_string())))
}

fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

impl SqliteStore {
  async fn persist_session(&self, uid: Option<Uuid>) -> Result<(), Error> {
    let uid_str = uid.map(encode_uuid);
    self
      .conn
      .call(move |conn| {
        match uid_str {
          Some(uid) => conn.execute(
            "INSERT INTO current_session (slot, uid) VALUES (1, ?1)
             ON CONFLICT (slot) DO UPDATE SET uid = excluded.uid",
            rusqlite::params![uid],
          )?,
          None => conn.execute("DELETE FROM current_session", [])?,
        };
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl IdentityProvider for SqliteStore {
  async fn create_account(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
    let email = normalize_email(&credentials.email)?;
    if credentials.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(AuthError::WeakPassword { min: MIN_PASSWORD_LEN });
    }

    let identity      = Identity { uid: Uuid::new_v4(), email: email.clone() };
    let password_hash = hash_password(&credentials.password)?;
    let uid_str       = encode_uuid(identity.uid);
    let at_str        = encode_dt(Utc::now());
    let email_param   = email.clone();

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE email = ?1",
            rusqlite::params![email_param],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO accounts (uid, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![uid_str, email_param, password_hash, at_str],
        )?;
        tx.execute(
          "INSERT INTO current_session (slot, uid) VALUES (1, ?1)
           ON CONFLICT (slot) DO UPDATE SET uid = excluded.uid",
          rusqlite::params![uid_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await
      .map_err(backend)?;

    if !created {
      return Err(AuthError::EmailInUse(email));
    }

    tracing::info!(uid = %identity.uid, email = %identity.email, "account created");
    self.publish(Some(identity.clone()));
    Ok(identity)
  }

  async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
    let email       = normalize_email(&credentials.email)
      .map_err(|_| AuthError::InvalidCredentials)?;
    let email_param = email.clone();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT uid, password_hash FROM accounts WHERE email = ?1",
              rusqlite::params![email_param],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(backend)?;

    let (uid_str, phc) = row.ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(&credentials.password, &phc) {
      return Err(AuthError::InvalidCredentials);
    }

    let identity = Identity { uid: decode_uuid(&uid_str).map_err(backend)?, email };
    self.persist_session(Some(identity.uid)).await.map_err(backend)?;

    tracing::info!(uid = %identity.uid, "signed in");
    self.publish(Some(identity.clone()));
    Ok(identity)
  }

  async fn sign_out(&self) -> Result<(), AuthError> {
    self.persist_session(None).await.map_err(backend)?;
    tracing::info!("signed out");
    self.publish(None);
    Ok(())
  }

  fn subscribe(&self) -> watch::Receiver<Option<Identity>> { self.session.subscribe() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emails_are_normalized() {
    assert_eq!(normalize_email("  Alice@X.com ").unwrap(), "alice@x.com");
    assert!(normalize_email("alice").is_err());
    assert!(normalize_email("@x.com").is_err());
    assert!(normalize_email("alice@").is_err());
    assert!(normalize_email("a@b@c").is_err());
  }

  #[test]
  fn password_hash_verifies() {
    let phc = hash_password("hunter22").unwrap();
    assert!(verify_password("hunter22", &phc));
    assert!(!verify_password("hunter23", &phc));
    assert!(!verify_password("hunter22", "not-a-phc-string"));
  }
}
