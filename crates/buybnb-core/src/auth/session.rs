use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::UserRecord;
use crate::navigation::{Navigator, Route};

use super::{SessionError, SessionStorage, StorageError};

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the JSON-serialized user record
pub const USER_KEY: &str = "user";

/// A signed-in identity: the token and the user it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticated { user: UserRecord },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            SessionState::Authenticated { user } => Some(user),
            SessionState::Anonymous => None,
        }
    }
}

impl From<&Option<Session>> for SessionState {
    fn from(session: &Option<Session>) -> Self {
        match session {
            Some(s) => SessionState::Authenticated {
                user: s.user.clone(),
            },
            None => SessionState::Anonymous,
        }
    }
}

/// Holds the current session and keeps it in sync with durable storage.
///
/// Shared as `Arc<SessionStore>`. Mutations (`login`, `logout`, `expire`)
/// hold the write lock for the whole persist-then-update sequence, so
/// storage and memory never disagree from a reader's point of view.
/// Every change is broadcast to `subscribe()` receivers.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    current: RwLock<Option<Session>>,
    changes: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create an empty store. Call `initialize()` before rendering anything
    /// that depends on the signed-in state.
    pub fn new(storage: Box<dyn SessionStorage>, navigator: Arc<dyn Navigator>) -> Self {
        let (changes, _) = watch::channel(SessionState::Anonymous);
        Self {
            storage,
            navigator,
            current: RwLock::new(None),
            changes,
        }
    }

    /// Load the persisted session, if any.
    ///
    /// Missing, partial or malformed data all start the store signed out.
    pub fn initialize(&self) -> SessionState {
        let loaded = match self.read_persisted() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Ignoring persisted session");
                None
            }
        };

        let mut current = self.write_lock();
        *current = loaded;
        let state = SessionState::from(&*current);
        self.changes.send_replace(state.clone());
        debug!(authenticated = state.is_authenticated(), "Session initialized");
        state
    }

    fn read_persisted(&self) -> Result<Option<Session>, SessionError> {
        let token = self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user_json = self.storage.get(USER_KEY)?;

        match (token, user_json) {
            (Some(token), Some(user_json)) => {
                let user: UserRecord = serde_json::from_str(&user_json)
                    .map_err(SessionError::MalformedPersistedSession)?;
                Ok(Some(Session { token, user }))
            }
            _ => Ok(None),
        }
    }

    /// Persist a new session and make it current.
    ///
    /// If the user record cannot be written, the token written just before
    /// it is removed again and the in-memory state is left unchanged.
    pub fn login(&self, token: &str, user: UserRecord) -> Result<(), SessionError> {
        let user_json = serde_json::to_string(&user).map_err(StorageError::from)?;

        let mut current = self.write_lock();
        self.storage.set(TOKEN_KEY, token)?;
        if let Err(e) = self.storage.set(USER_KEY, &user_json) {
            if let Err(rollback) = self.storage.remove(TOKEN_KEY) {
                warn!(error = %rollback, "Failed to roll back token after failed login");
            }
            return Err(e.into());
        }

        *current = Some(Session {
            token: token.to_string(),
            user: user.clone(),
        });
        self.changes
            .send_replace(SessionState::Authenticated { user });
        info!("Signed in");
        Ok(())
    }

    /// Sign out and redirect to the sign-in page.
    ///
    /// Safe to call when already signed out; the redirect still happens.
    pub fn logout(&self) {
        self.clear();
        info!("Signed out");
        self.navigator.navigate(Route::Login);
    }

    /// The API rejected the current token: drop the session and redirect
    /// to the sign-in page.
    pub fn expire(&self) {
        self.clear();
        warn!("Session rejected by server, signed out");
        self.navigator.navigate(Route::Login);
    }

    fn clear(&self) {
        let mut current = self.write_lock();
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to clear persisted session entry");
            }
        }
        *current = None;
        self.changes.send_replace(SessionState::Anonymous);
    }

    /// True only if a user is loaded and a non-empty token is still in
    /// durable storage. Checking storage catches tokens cleared out of band.
    pub fn is_authenticated(&self) -> bool {
        let current = self.read_lock();
        current.is_some() && self.durable_token().is_some()
    }

    /// The bearer token from durable storage, if any.
    pub fn token(&self) -> Option<String> {
        let _current = self.read_lock();
        self.durable_token()
    }

    fn durable_token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.read_lock().as_ref().map(|s| s.user.clone())
    }

    pub fn state(&self) -> SessionState {
        SessionState::from(&*self.read_lock())
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.changes.subscribe()
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}
