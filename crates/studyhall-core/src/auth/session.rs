//! Session manager: the single source of truth for "who is signed in".
//!
//! The manager owns the in-memory session snapshot and publishes every
//! transition through a watch channel, so any number of consumers (pages,
//! navigation, route guards) observe the same state without racing each
//! other. Operations are serialized: each one finishes mutating state
//! before the next operation's network call is issued.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::{AuthGrant, IdentityError, IdentityService};
use crate::auth::credentials::CredentialStore;
use crate::models::UserIdentity;

/// Snapshot of the current session, as published to consumers.
///
/// While `is_loading` is true an identity operation is in flight and
/// `is_authenticated` must not be treated as final.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserIdentity>,
    pub is_loading: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session manager has not been initialized")]
    NotInitialized,

    /// Identity service failures pass through untranslated so callers can
    /// branch on the error kind.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

struct Lifecycle {
    initialized: bool,
}

/// Owns and mutates the current session.
///
/// Construct one at startup, call [`initialize`](Self::initialize) once,
/// then share it behind an `Arc`. Dropping the manager closes the watch
/// channel, which ends all subscriptions.
pub struct SessionManager {
    identity: Arc<dyn IdentityService>,
    store: Arc<dyn CredentialStore>,
    /// Held for the full duration of each operation so overlapping calls
    /// run in call order rather than racing on the published state.
    lifecycle: Mutex<Lifecycle>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(identity: Arc<dyn IdentityService>, store: Arc<dyn CredentialStore>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::default());
        Self {
            identity,
            store,
            lifecycle: Mutex::new(Lifecycle { initialized: false }),
            state_tx,
        }
    }

    /// Current session snapshot.
    pub fn current_session(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to session changes. The receiver starts at the current
    /// snapshot and is notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    fn enter_loading(&self) {
        self.state_tx.send_modify(|state| state.is_loading = true);
    }

    fn settle(&self, user: Option<UserIdentity>) {
        self.state_tx.send_modify(|state| {
            state.user = user;
            state.is_loading = false;
        });
    }

    /// Run the startup sequence. Runs at most once; later calls are no-ops.
    ///
    /// Never fails outwardly: a stored credential that cannot be resolved
    /// (expired, invalid, network down) is cleared and the session starts
    /// unauthenticated.
    pub async fn initialize(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.initialized {
            return;
        }
        lifecycle.initialized = true;

        self.enter_loading();

        let Some(credential) = self.store.load() else {
            debug!("No stored credential, starting unauthenticated");
            self.settle(None);
            return;
        };

        match self.identity.resolve_current_user(&credential).await {
            Ok(user) => {
                info!(user_id = %user.id, "Restored session from stored credential");
                self.settle(Some(user));
            }
            Err(e) => {
                warn!(error = %e, "Stored credential failed to resolve, clearing it");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to clear credential store");
                }
                self.settle(None);
            }
        }
    }

    /// Create a new account and sign into it.
    ///
    /// On failure the session stays unauthenticated and the identity error
    /// passes through to the caller.
    pub async fn signup(&self, email: &str, password: &str) -> Result<UserIdentity, SessionError> {
        let lifecycle = self.lifecycle.lock().await;
        Self::ensure_initialized(&lifecycle)?;

        self.enter_loading();
        let result = self.identity.create_account(email, password).await;
        self.settle_grant(result)
    }

    /// Sign into an existing account. Same contract as [`signup`](Self::signup).
    pub async fn signin(&self, email: &str, password: &str) -> Result<UserIdentity, SessionError> {
        let lifecycle = self.lifecycle.lock().await;
        Self::ensure_initialized(&lifecycle)?;

        self.enter_loading();
        let result = self.identity.authenticate(email, password).await;
        self.settle_grant(result)
    }

    /// Sign out. Remote invalidation is best-effort; local state always
    /// clears, so this only fails before initialization.
    pub async fn signout(&self) -> Result<(), SessionError> {
        let lifecycle = self.lifecycle.lock().await;
        Self::ensure_initialized(&lifecycle)?;

        self.enter_loading();

        if let Some(credential) = self.store.load() {
            if let Err(e) = self.identity.invalidate_session(&credential).await {
                warn!(error = %e, "Remote session invalidation failed, clearing local state anyway");
            }
        }

        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear credential store");
        }
        self.settle(None);
        Ok(())
    }

    /// Re-resolve the stored credential in the background, without a
    /// loading transition.
    ///
    /// A refresh failure leaves the session untouched: a stale-but-present
    /// session is preferred over evicting an active user on a transient
    /// error. This deliberately differs from startup, which fails safe to
    /// unauthenticated.
    pub async fn refresh_user(&self) -> Result<(), SessionError> {
        let lifecycle = self.lifecycle.lock().await;
        Self::ensure_initialized(&lifecycle)?;

        let Some(credential) = self.store.load() else {
            debug!("No stored credential, nothing to refresh");
            return Ok(());
        };

        match self.identity.resolve_current_user(&credential).await {
            Ok(user) => {
                self.state_tx.send_if_modified(|state| {
                    if state.user.as_ref() == Some(&user) {
                        false
                    } else {
                        state.user = Some(user.clone());
                        true
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "Background refresh failed, keeping current session");
            }
        }
        Ok(())
    }

    fn ensure_initialized(lifecycle: &Lifecycle) -> Result<(), SessionError> {
        if lifecycle.initialized {
            Ok(())
        } else {
            Err(SessionError::NotInitialized)
        }
    }

    /// Settle a signup/signin outcome: persist and publish on success,
    /// return to unauthenticated on failure. Clears loading on both paths.
    fn settle_grant(
        &self,
        result: Result<AuthGrant, IdentityError>,
    ) -> Result<UserIdentity, SessionError> {
        match result {
            Ok(grant) => {
                if let Err(e) = self.store.save(&grant.credential) {
                    // In-memory session still works; it just won't survive a restart.
                    warn!(error = %e, "Failed to persist credential");
                }
                self.settle(Some(grant.user.clone()));
                Ok(grant.user)
            }
            Err(e) => {
                // The session returns to unauthenticated, so any previously
                // persisted credential must not restore it on next startup.
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "Failed to clear credential store");
                }
                self.settle(None);
                Err(e.into())
            }
        }
    }
}
