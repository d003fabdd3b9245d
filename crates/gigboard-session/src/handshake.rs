//! The readiness handshake: wait until the session has both an identity and
//! its profile.
//!
//! ```text
//! Unresolved ─▶ AwaitingIdentity ─▶ LoadingProfile{n} ─▶ Resolved
//!                      ▲                   │
//!                      └── identity lost ──┘
//! ```
//!
//! Waiting for an identity is purely event-driven. A missing profile is
//! re-read every [`RetryPolicy::profile_retry`], or sooner if the session
//! changes, because the profile writes of a fresh registration can land after
//! the identity notification.

use std::{fmt, time::Duration};

use gigboard_core::{
  identity::Identity,
  profile::Profile,
  store::{DocumentStore, IdentityProvider},
};
use tokio_util::sync::CancellationToken;

use crate::{error::HandshakeError, manager::SessionManager};

/// How long to keep looking for a profile once an identity is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Delay between profile reads. Does not grow.
  pub profile_retry:        Duration,
  /// Give up after this many misses. `None` retries until cancelled.
  pub max_profile_attempts: Option<u32>,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      profile_retry:        Duration::from_millis(1000),
      max_profile_attempts: None,
    }
  }
}

/// A session that is ready for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSession {
  pub identity:         Identity,
  pub profile:          Profile,
  /// Profile reads issued by the handshake. Zero if the profile was already
  /// loaded when it started.
  pub profile_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
  Unresolved,
  AwaitingIdentity,
  LoadingProfile { attempt: u32 },
  Resolved,
}

impl fmt::Display for HandshakeState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unresolved => f.write_str("unresolved"),
      Self::AwaitingIdentity => f.write_str("awaiting identity"),
      Self::LoadingProfile { attempt } => write!(f, "loading profile (attempt {attempt})"),
      Self::Resolved => f.write_str("resolved"),
    }
  }
}

fn enter(state: &mut HandshakeState, next: HandshakeState) {
  if *state != next {
    tracing::debug!(from = %state, to = %next, "handshake");
    *state = next;
  }
}

/// Wait until `session` has an identity and a profile for it.
///
/// Fails with [`HandshakeError::Cancelled`] when `cancel` fires and with
/// [`HandshakeError::ProfileUnavailable`] when the policy's attempt limit is
/// reached. The attempt count restarts if the identity changes.
pub async fn wait_for_session<I, D>(
  session: &SessionManager<I, D>,
  policy: &RetryPolicy,
  cancel: &CancellationToken,
) -> Result<ResolvedSession, HandshakeError>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let mut rx       = session.subscribe();
  let mut state    = HandshakeState::Unresolved;
  let mut attempts = 0u32;
  let mut tracked  = None;

  loop {
    let snapshot = rx.borrow_and_update().clone();

    let Some(identity) = snapshot.identity.clone() else {
      enter(&mut state, HandshakeState::AwaitingIdentity);
      tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(HandshakeError::Cancelled),
        changed = rx.changed() => {
          if changed.is_err() {
            return Err(HandshakeError::Cancelled);
          }
        }
      }
      continue;
    };

    if tracked != Some(identity.uid) {
      tracked  = Some(identity.uid);
      attempts = 0;
    }

    if let Some((_, profile)) = snapshot.resolved() {
      enter(&mut state, HandshakeState::Resolved);
      return Ok(ResolvedSession {
        profile: profile.clone(),
        identity,
        profile_attempts: attempts,
      });
    }

    attempts += 1;
    enter(&mut state, HandshakeState::LoadingProfile { attempt: attempts });

    let loaded = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(HandshakeError::Cancelled),
      loaded = session.force_reload_profile(identity.uid) => loaded,
    };

    if let Some(profile) = loaded {
      // The identity may have changed while the read was in flight.
      if session.current_identity().as_ref() == Some(&identity) {
        enter(&mut state, HandshakeState::Resolved);
        return Ok(ResolvedSession { identity, profile, profile_attempts: attempts });
      }
      continue;
    }

    if policy.max_profile_attempts.is_some_and(|max| attempts >= max) {
      tracing::debug!(uid = %identity.uid, attempts, "giving up on profile");
      return Err(HandshakeError::ProfileUnavailable { uid: identity.uid, attempts });
    }

    tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(HandshakeError::Cancelled),
      _ = tokio::time::sleep(policy.profile_retry) => {}
      changed = rx.changed() => {
        if changed.is_err() {
          return Err(HandshakeError::Cancelled);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_policy_retries_every_second_forever() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.profile_retry, Duration::from_secs(1));
    assert_eq!(policy.max_profile_attempts, None);
  }

  #[test]
  fn states_display() {
    assert_eq!(
      HandshakeState::LoadingProfile { attempt: 2 }.to_string(),
      "loading profile (attempt 2)"
    );
    assert_eq!(HandshakeState::AwaitingIdentity.to_string(), "awaiting identity");
  }
}
