//! Error types for `gigboard-session`.

use gigboard_core::{
  AuthError,
  application::ApplicationStatus,
  document::Collection,
  profile::Role,
};
use thiserror::Error;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by [`SessionManager`](crate::SessionManager) operations.
#[derive(Debug, Error)]
pub enum SessionError {
  #[error(transparent)]
  Auth(AuthError),

  #[error(transparent)]
  Registration(#[from] RegistrationError),
}

/// Why a registration did not complete.
#[derive(Debug, Error)]
pub enum RegistrationError {
  /// An extra registration field uses a name the profile already owns.
  /// Rejected before any account is created.
  #[error("registration field {0:?} is reserved")]
  ReservedField(String),

  #[error("could not create account: {0}")]
  Account(#[source] AuthError),

  #[error("could not encode profile: {0}")]
  Encode(#[from] gigboard_core::Error),

  /// The account exists and is signed in, but has no profile in
  /// `collection`. Nothing is rolled back.
  #[error("account {uid} was created but its profile could not be saved to {collection}: {source}")]
  ProfileWrite {
    uid:        Uuid,
    collection: Collection,
    #[source]
    source:     BoxError,
  },
}

/// A profile lookup that failed, as opposed to one that found nothing.
#[derive(Debug, Error)]
pub enum ProfileLoadError {
  #[error("reading {collection}: {source}")]
  Store {
    collection: Collection,
    #[source]
    source:     BoxError,
  },

  #[error("decoding profile from {collection}: {source}")]
  Decode {
    collection: Collection,
    #[source]
    source:     gigboard_core::Error,
  },
}

/// The lookup order must name at least one profile collection and nothing
/// else.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupOrderError {
  #[error("profile lookup order is empty")]
  Empty,

  #[error("{0} does not hold profiles")]
  NotAProfileCollection(Collection),
}

/// Why [`wait_for_session`](crate::handshake::wait_for_session) gave up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
  #[error("session handshake cancelled")]
  Cancelled,

  #[error("no profile found for {uid} after {attempts} attempts")]
  ProfileUnavailable { uid: Uuid, attempts: u32 },
}

/// Failures of dashboard operations. All are recoverable and meant to be shown
/// to the user.
#[derive(Debug, Error)]
pub enum DashboardError {
  #[error("this action requires the {expected} role")]
  WrongRole { expected: Role },

  #[error("job {0} not found")]
  JobNotFound(Uuid),

  #[error("application {0} not found")]
  ApplicationNotFound(Uuid),

  #[error("you have already applied for job {0}")]
  DuplicateApplication(Uuid),

  #[error("job {0} belongs to another employer")]
  NotOwner(Uuid),

  #[error("cannot change application status from {from} to {to}")]
  InvalidTransition {
    from: ApplicationStatus,
    to:   ApplicationStatus,
  },

  #[error("invalid job: {0}")]
  InvalidJob(String),

  #[error("not confirmed")]
  NotConfirmed,

  #[error("decode error: {0}")]
  Decode(#[from] gigboard_core::Error),

  #[error("store error: {0}")]
  Persistence(#[source] BoxError),
}

impl DashboardError {
  pub(crate) fn persistence(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Persistence(Box::new(e))
  }
}
