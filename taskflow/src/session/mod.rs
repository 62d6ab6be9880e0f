//! Session store: the current authenticated identity.
//!
//! Holds at most one [`Identity`], exposes login/logout, and persists the
//! identity to a durable [`KeyValueStore`] slot so it survives restarts.
//!
//! ```text
//! Unauthenticated --login ok--> Authenticated --logout--> Unauthenticated
//!        ^   |
//!        +---+ login rejected
//! ```
//!
//! Consumers observe changes through a `tokio::sync::watch` channel of
//! [`SessionState`] snapshots.

pub mod credentials;

use std::time::Duration;

use tokio::sync::watch;

use taskflow_proto::codec::{decode_identity, encode_identity};
use taskflow_proto::identity::Identity;

use crate::config::SessionConfig;
use crate::storage::KeyValueStore;

pub use credentials::{CredentialTable, Directory, SHARED_PASSWORD, UNKNOWN_USER_NAME};

/// Observable session snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The current identity, if authenticated.
    pub user: Option<Identity>,
    /// Number of login attempts still waiting out the simulated latency.
    in_flight: usize,
}

impl SessionState {
    /// Whether an identity is current.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether a login attempt is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

/// Owns the current identity and its persisted snapshot.
pub struct SessionStore<S: KeyValueStore> {
    slot: S,
    key: String,
    credentials: CredentialTable,
    login_delay: Duration,
    state: watch::Sender<SessionState>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Creates a session store over `slot`, restoring any persisted identity.
    ///
    /// Absent, unreadable or malformed snapshots yield a logged-out store;
    /// nothing is surfaced to the caller.
    pub fn restore(slot: S, config: &SessionConfig) -> Self {
        Self::with_credentials(slot, config, CredentialTable::builtin())
    }

    /// Like [`restore`](Self::restore) with an explicit credential table.
    pub fn with_credentials(slot: S, config: &SessionConfig, credentials: CredentialTable) -> Self {
        let user = read_snapshot(&slot, &config.storage_key);
        if let Some(identity) = &user {
            tracing::info!(user = %identity.id, email = %identity.email, "session restored");
        }
        let (state, _) = watch::channel(SessionState {
            user,
            in_flight: 0,
        });
        Self {
            slot,
            key: config.storage_key.clone(),
            credentials,
            login_delay: config.login_delay,
            state,
        }
    }

    /// Attempts to authenticate with `email` and `password`.
    ///
    /// Waits out the configured latency first; [`SessionState::is_loading`]
    /// is true for the duration. On success the identity becomes current and
    /// is persisted. On failure the current identity is left untouched.
    ///
    /// Dropping the returned future before it resolves abandons the attempt
    /// with no state change other than clearing its loading contribution.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let _loading = LoadingGuard::enter(&self.state);
        tokio::time::sleep(self.login_delay).await;

        let Some(identity) = self.credentials.verify(email, password).cloned() else {
            tracing::info!(email, "login rejected");
            return false;
        };

        self.persist(&identity);
        tracing::info!(user = %identity.id, role = %identity.role, "login succeeded");
        self.state.send_modify(|s| s.user = Some(identity));
        true
    }

    /// Clears the current identity and its persisted snapshot. Idempotent.
    pub fn logout(&self) {
        if let Err(e) = self.slot.remove(&self.key) {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        self.state.send_if_modified(|s| {
            let had_user = s.user.take();
            if let Some(identity) = &had_user {
                tracing::info!(user = %identity.id, "logged out");
            }
            had_user.is_some()
        });
    }

    /// Returns a copy of the current identity.
    #[must_use]
    pub fn current_user(&self) -> Option<Identity> {
        self.state.borrow().user.clone()
    }

    /// Whether an identity is current.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Whether a login attempt is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The credential table this store authenticates against.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialTable {
        &self.credentials
    }

    fn persist(&self, identity: &Identity) {
        let result = encode_identity(identity)
            .map_err(|e| e.to_string())
            .and_then(|raw| self.slot.set(&self.key, &raw).map_err(|e| e.to_string()));
        if let Err(error) = result {
            tracing::warn!(%error, "session persisted in memory only");
        }
    }
}

/// Reads and decodes the persisted identity, discarding anything unusable.
fn read_snapshot<S: KeyValueStore>(slot: &S, key: &str) -> Option<Identity> {
    let raw = match slot.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "could not read persisted session");
            return None;
        }
    };

    match decode_identity(&raw) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed persisted session");
            if let Err(e) = slot.remove(key) {
                tracing::warn!(error = %e, "failed to remove malformed persisted session");
            }
            None
        }
    }
}

/// Marks a login attempt in flight for as long as it is alive.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a watch::Sender<SessionState>) -> Self {
        state.send_modify(|s| s.in_flight += 1);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}
