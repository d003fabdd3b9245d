//! Session and dashboard logic for Gigboard.
//!
//! - [`SessionManager`] owns the signed-in identity and its profile, fed by an
//!   [`IdentityProvider`](gigboard_core::store::IdentityProvider).
//! - [`handshake::wait_for_session`] waits until both are available.
//! - [`Dashboard`] runs the role-specific job and application workflows
//!   against a [`DocumentStore`](gigboard_core::store::DocumentStore).
//!
//! Everything here is generic over the two capability traits and must run
//! inside a tokio runtime.

pub mod dashboard;
pub mod error;
pub mod handshake;
pub mod lookup;
pub mod manager;
pub mod nav;
pub mod view;

pub use dashboard::{Confirmation, Dashboard};
pub use error::{
  DashboardError, HandshakeError, LookupOrderError, ProfileLoadError, RegistrationError,
  SessionError,
};
pub use handshake::{ResolvedSession, RetryPolicy};
pub use lookup::ProfileLookup;
pub use manager::{SessionManager, SessionState};
pub use nav::{NavAction, NavState};
