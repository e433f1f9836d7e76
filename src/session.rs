use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use crate::{
    error::SessionError,
    models::{Identity, Phase, SessionState},
    storage::SessionStoreState,
};

/// Default key of the Persisted Record.
pub const DEFAULT_SESSION_KEY: &str = "user";

#[derive(Debug, Default)]
struct Session {
    identity: Option<Identity>,
    phase: Phase,
}

/// SessionManager
///
/// Single source of truth for who is logged in. It is constructed once at
/// application composition and handed to every gate and consumer by reference.
///
/// Writers (`initialize`, `login`, `logout`) are serialized through one async
/// mutex so a persisted write and the matching in-memory swap are never
/// interleaved with another writer. Readers take a short synchronous read lock
/// and never wait on the store.
pub struct SessionManager {
    store: SessionStoreState,
    key: String,
    session: RwLock<Session>,
    writer: Mutex<()>,
    initialized: AtomicBool,
}

/// SessionManagerState
///
/// The shared handle stored in `AppState`.
pub type SessionManagerState = Arc<SessionManager>;

impl SessionManager {
    pub fn new(store: SessionStoreState) -> Self {
        Self::with_key(store, DEFAULT_SESSION_KEY)
    }

    pub fn with_key(store: SessionStoreState, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            session: RwLock::new(Session::default()),
            writer: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn phase(&self) -> Phase {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .phase
    }

    /// state
    ///
    /// Current `{ user, isAuthenticated, isLoading }` snapshot. Pure read.
    pub fn state(&self) -> SessionState {
        let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
        match (session.phase, &session.identity) {
            (Phase::Loading, _) => SessionState::loading(),
            (Phase::Resolved, Some(identity)) => SessionState::authenticated(identity.clone()),
            (Phase::Resolved, None) => SessionState::anonymous(),
        }
    }

    /// initialize
    ///
    /// Reads the Persisted Record once and resolves the session. Never fails:
    /// an unreadable store resolves to logged out, and an unparseable record is
    /// deleted and resolves to logged out. Later calls return the current state
    /// untouched, and a `login` that completed first wins over the stored record.
    pub async fn initialize(&self) -> SessionState {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session already initialized; ignoring repeat call");
            return self.state();
        }

        let _writer = self.writer.lock().await;

        if self.phase() == Phase::Resolved {
            tracing::debug!("Session resolved by login before initialization finished");
            return self.state();
        }

        let identity = self.load_persisted().await;

        match &identity {
            Some(user) => tracing::info!(
                user_id = %user.id,
                role = ?user.role,
                "Restored persisted session"
            ),
            None => tracing::info!("No persisted session; starting logged out"),
        }

        self.replace(identity);
        self.state()
    }

    async fn load_persisted(&self) -> Option<Identity> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Session store unreadable; treating as logged out");
                return None;
            }
        };

        let parsed = serde_json::from_str::<Identity>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|identity| match identity.missing_field() {
                Some(field) => Err(format!("missing required field '{field}'")),
                None => Ok(identity),
            });

        match parsed {
            Ok(identity) => Some(identity),
            Err(reason) => {
                tracing::warn!(key = %self.key, %reason, "Persisted session corrupt; discarding");
                if let Err(e) = self.store.delete(&self.key).await {
                    tracing::warn!(error = %e, "Failed to delete corrupt session record");
                }
                None
            }
        }
    }

    /// login
    ///
    /// Replaces the live identity wholesale and persists it. The record is written
    /// before memory changes, so on error the previous session is still in force
    /// both in memory and on disk.
    pub async fn login(&self, identity: Identity) -> Result<SessionState, SessionError> {
        if let Some(field) = identity.missing_field() {
            return Err(SessionError::InvalidIdentity { field });
        }

        let _writer = self.writer.lock().await;

        let raw = serde_json::to_string(&identity)?;
        self.store.set(&self.key, &raw).await?;

        tracing::info!(user_id = %identity.id, role = ?identity.role, "User logged in");
        self.replace(Some(identity));
        Ok(self.state())
    }

    /// logout
    ///
    /// Clears the live identity and deletes the Persisted Record. Idempotent.
    /// Memory is cleared even when the delete fails; the failure is returned so
    /// the caller knows a restart may resurrect the old session.
    pub async fn logout(&self) -> Result<SessionState, SessionError> {
        let _writer = self.writer.lock().await;

        let previous = self.replace(None);
        if let Some(user) = previous {
            tracing::info!(user_id = %user.id, "User logged out");
        }

        self.store.delete(&self.key).await?;
        Ok(self.state())
    }

    /// Swaps the identity and marks the session resolved. Returns the old identity.
    fn replace(&self, identity: Option<Identity>) -> Option<Identity> {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        session.phase = Phase::Resolved;
        std::mem::replace(&mut session.identity, identity)
    }
}
