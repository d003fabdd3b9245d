//! [`SessionManager`]: the owner of the in-memory identity and profile.
//!
//! A background listener follows the identity provider's change feed. On
//! every change it stores the new identity, updates the navigation state and
//! loads the matching profile. Consumers read the pair through the synchronous
//! accessors or wait on [`SessionManager::subscribe`].
//!
//! The pair is written by the listener, by profile reloads and by the session
//! commands, which apply the identity they produced before returning. Reloads
//! may overlap and finish out of order. Each load takes a ticket when it is
//! issued, and a result is applied only if its ticket is newer than the last
//! applied one and its uid is still the current identity. The most recently
//! issued read wins.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use gigboard_core::{
  document::{Collection, encode},
  identity::{Credentials, Identity},
  profile::{NewProfile, Profile},
  store::{DocumentStore, IdentityProvider},
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
  error::{RegistrationError, SessionError},
  lookup::ProfileLookup,
  nav::NavState,
};

// ─── State ───────────────────────────────────────────────────────────────────

/// A snapshot of the session. `profile`, when present, always belongs to
/// `identity`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
  pub identity: Option<Identity>,
  pub profile:  Option<Profile>,
  /// Ticket of the last applied profile load.
  applied:      u64,
}

impl SessionState {
  /// The identity and profile, once both are known.
  pub fn resolved(&self) -> Option<(&Identity, &Profile)> {
    match (&self.identity, &self.profile) {
      (Some(identity), Some(profile)) if profile.uid == identity.uid => {
        Some((identity, profile))
      }
      _ => None,
    }
  }

  fn uid(&self) -> Option<Uuid> { self.identity.as_ref().map(|i| i.uid) }
}

// ─── Manager ─────────────────────────────────────────────────────────────────

struct Inner<I, D> {
  identity_provider: Arc<I>,
  store:             Arc<D>,
  lookup:            ProfileLookup,
  state:             watch::Sender<SessionState>,
  nav:               watch::Sender<NavState>,
  tickets:           AtomicU64,
}

/// Owns the session lifecycle. Create one per client and share it by
/// reference (or `Arc`); the listener stops when it is dropped.
pub struct SessionManager<I, D> {
  inner:  Arc<Inner<I, D>>,
  cancel: CancellationToken,
}

impl<I, D> SessionManager<I, D>
where
  I: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  /// Subscribe to `identity_provider` and start the listener.
  ///
  /// The provider's current identity is applied before this returns, so
  /// [`current_identity`](Self::current_identity) is accurate immediately;
  /// its profile loads in the background.
  ///
  /// Must be called from within a tokio runtime.
  pub fn new(identity_provider: Arc<I>, store: Arc<D>, lookup: ProfileLookup) -> Self {
    let mut identities = identity_provider.subscribe();
    let initial = identities.borrow_and_update().clone();

    let inner = Arc::new(Inner {
      identity_provider,
      store,
      lookup,
      state: watch::channel(SessionState::default()).0,
      nav: watch::channel(NavState::SIGNED_OUT).0,
      tickets: AtomicU64::new(0),
    });
    inner.apply_identity(initial.clone());

    let cancel = CancellationToken::new();
    tokio::spawn(listen(inner.clone(), identities, initial, cancel.clone()));

    Self { inner, cancel }
  }

  // ── Commands ──────────────────────────────────────────────────────────────

  /// Create an account, save its profile to the role collection and to
  /// `users`, then load the profile into memory.
  ///
  /// If a profile write fails the account stays created and signed in without
  /// a profile; the error says which write failed.
  pub async fn register(
    &self,
    credentials: &Credentials,
    form: NewProfile,
  ) -> Result<Identity, SessionError> {
    if let Some(key) = form.reserved_extra() {
      return Err(RegistrationError::ReservedField(key.to_owned()).into());
    }

    let identity = self
      .inner
      .identity_provider
      .create_account(credentials)
      .await
      .map_err(RegistrationError::Account)?;

    let profile = form.into_profile(&identity, Utc::now());
    let fields  = encode(Collection::Users, &profile).map_err(RegistrationError::Encode)?;

    for collection in [profile.role.collection(), Collection::Users] {
      if let Err(e) = self.inner.store.insert(collection, fields.clone()).await {
        tracing::warn!(
          uid = %identity.uid,
          %collection,
          error = %e,
          "account created but profile write failed"
        );
        return Err(
          RegistrationError::ProfileWrite {
            uid: identity.uid,
            collection,
            source: Box::new(e),
          }
          .into(),
        );
      }
    }

    // The provider has already announced the new identity, but the listener
    // may not have applied it yet; apply it here so the reload below lands.
    self.inner.apply_identity(Some(identity.clone()));
    if self.force_reload_profile(identity.uid).await.is_none() {
      tracing::warn!(uid = %identity.uid, "profile not readable right after registration");
    }

    tracing::info!(uid = %identity.uid, role = %profile.role, "registered");
    Ok(identity)
  }

  /// Sign in. The identity is applied before this returns; its profile loads
  /// in the background.
  pub async fn login(&self, credentials: &Credentials) -> Result<Identity, SessionError> {
    let identity = self
      .inner
      .identity_provider
      .sign_in(credentials)
      .await
      .map_err(SessionError::Auth)?;
    self.inner.apply_identity(Some(identity.clone()));
    Ok(identity)
  }

  pub async fn logout(&self) -> Result<(), SessionError> {
    self
      .inner
      .identity_provider
      .sign_out()
      .await
      .map_err(SessionError::Auth)?;
    self.inner.apply_identity(None);
    Ok(())
  }

  /// Re-run the profile lookup for `uid` and return what it found.
  ///
  /// A failed lookup is logged and reported as `None`; it does not clear a
  /// profile that is already loaded.
  pub async fn force_reload_profile(&self, uid: Uuid) -> Option<Profile> {
    tracing::debug!(%uid, "force reloading profile");
    self.inner.load_profile(uid).await
  }

  /// Stop the identity listener. The manager keeps answering reads with the
  /// last known state.
  pub fn shutdown(&self) { self.cancel.cancel(); }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn current_identity(&self) -> Option<Identity> {
    self.inner.state.borrow().identity.clone()
  }

  pub fn current_profile(&self) -> Option<Profile> {
    self.inner.state.borrow().profile.clone()
  }

  pub fn is_session_active(&self) -> bool { self.inner.state.borrow().identity.is_some() }

  pub fn state(&self) -> SessionState { self.inner.state.borrow().clone() }

  /// Follow session changes. The receiver starts at the current state.
  pub fn subscribe(&self) -> watch::Receiver<SessionState> { self.inner.state.subscribe() }

  pub fn nav(&self) -> NavState { *self.inner.nav.borrow() }

  pub fn subscribe_nav(&self) -> watch::Receiver<NavState> { self.inner.nav.subscribe() }

  /// The document store this session reads profiles from.
  pub fn store(&self) -> &Arc<D> { &self.inner.store }
}

impl<I, D> Drop for SessionManager<I, D> {
  fn drop(&mut self) { self.cancel.cancel(); }
}

impl<I, D> Inner<I, D>
where
  D: DocumentStore,
{
  /// Store `identity`, dropping the profile if the user changed, and update
  /// navigation in the same step.
  fn apply_identity(&self, identity: Option<Identity>) {
    let active = identity.is_some();
    self.state.send_if_modified(|state| {
      if state.identity == identity {
        return false;
      }
      if state.uid() != identity.as_ref().map(|i| i.uid) {
        state.profile = None;
      }
      match &identity {
        Some(i) => tracing::info!(uid = %i.uid, "session started"),
        None => tracing::info!("session ended"),
      }
      state.identity = identity;
      true
    });
    self.nav.send_if_modified(|nav| {
      let next = NavState::for_session(active);
      let changed = *nav != next;
      *nav = next;
      changed
    });
  }

  async fn load_profile(&self, uid: Uuid) -> Option<Profile> {
    let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;

    let loaded = match self.lookup.resolve(self.store.as_ref(), uid).await {
      Ok(profile) => profile,
      Err(e) => {
        tracing::warn!(%uid, error = %e, "profile load failed");
        return None;
      }
    };

    self.state.send_if_modified(|state| {
      if state.uid() != Some(uid) || ticket <= state.applied {
        tracing::debug!(%uid, ticket, "discarding stale profile load");
        return false;
      }
      state.applied = ticket;
      if state.profile == loaded {
        return false;
      }
      state.profile = loaded.clone();
      true
    });

    loaded
  }
}

async fn listen<I, D>(
  inner: Arc<Inner<I, D>>,
  mut identities: watch::Receiver<Option<Identity>>,
  initial: Option<Identity>,
  cancel: CancellationToken,
) where
  D: DocumentStore,
{
  let mut pending = initial.map(|i| i.uid);

  loop {
    if let Some(uid) = pending.take() {
      tokio::select! {
        biased;
        _ = cancel.cancelled() => break,
        _ = inner.load_profile(uid) => {}
      }
    }

    tokio::select! {
      biased;
      _ = cancel.cancelled() => break,
      changed = identities.changed() => {
        if changed.is_err() {
          tracing::debug!("identity provider closed its feed");
          break;
        }
        let identity = identities.borrow_and_update().clone();
        pending = identity.as_ref().map(|i| i.uid);
        inner.apply_identity(identity);
      }
    }
  }

  tracing::debug!("session listener stopped");
}
