//! Login state shared by every store.
//!
//! The session is persisted under the `userData` key so it survives restarts.
//! A restored session is trusted without asking the server; a stale token is
//! only discovered when a gated call comes back with HTTP 401, at which point
//! the resource store calls [`SessionStore::expire`] with the token it sent.

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::models::SessionData;
use crate::storage::{load_json, save_json, KeyValueStore, StorageError, StorageKey};

/// Errors returned by [`SessionStore::login`] and [`SessionStore::register`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0} is required")]
    MissingCredentials(&'static str),

    #[error("Invalid phone number or password")]
    InvalidCredentials,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Holds the current identity and token.
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<Option<SessionData>>,
}

impl SessionStore {
    /// Creates a logged-out store. Call [`restore`](Self::restore) to pick up
    /// a persisted session.
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            storage,
            state: RwLock::new(None),
        }
    }

    /// Reads the persisted session into memory.
    ///
    /// Returns the session if one was stored with `loggedIn` set. Unreadable
    /// data is logged and treated as no session.
    pub fn restore(&self) -> Option<SessionData> {
        let stored = match load_json::<SessionData>(self.storage.as_ref(), StorageKey::UserData) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to restore session: {}", e);
                None
            }
        };

        let session = stored.filter(|s| s.logged_in);
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = session.clone();
        session
    }

    /// Authenticates against the server and persists the session.
    pub async fn login(&self, phone: &str, password: &str) -> Result<SessionData, SessionError> {
        if phone.trim().is_empty() {
            return Err(SessionError::MissingCredentials("Phone"));
        }
        if password.is_empty() {
            return Err(SessionError::MissingCredentials("Password"));
        }

        let response = match self.api.login(phone, password).await {
            Ok(response) => response,
            Err(e) if e.is_unauthorized() => return Err(SessionError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::InvalidCredentials)?;

        let session = SessionData::new(phone, token);
        // Persist and publish under one lock so a concurrent expire sees both or neither.
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        save_json(self.storage.as_ref(), StorageKey::UserData, &session)?;
        *state = Some(session.clone());
        drop(state);

        tracing::info!("Logged in as {}", phone);
        Ok(session)
    }

    /// Creates an account. The caller still has to log in afterwards.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), SessionError> {
        if email.trim().is_empty() {
            return Err(SessionError::MissingCredentials("Email"));
        }
        if password.is_empty() {
            return Err(SessionError::MissingCredentials("Password"));
        }

        self.api.register(email, password).await?;
        tracing::info!("Registered {}", email);
        Ok(())
    }

    /// Forgets the session locally. No server call is made.
    ///
    /// Memory is cleared even if removing the persisted entry fails.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.storage.remove(StorageKey::UserData.as_str())
    }

    /// Drops the session that sent `token` once the server has rejected it.
    ///
    /// Does nothing if the session has changed since the call was made, so a
    /// late 401 cannot log out a fresh login.
    pub fn expire(&self, token: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.as_ref().and_then(|s| s.bearer()) != Some(token) {
            tracing::debug!("Ignoring rejection of a token that is no longer current");
            return;
        }

        tracing::warn!("Session rejected by server, logging out");
        state.take();
        if let Err(e) = self.storage.remove(StorageKey::UserData.as_str()) {
            tracing::error!("Failed to clear expired session: {}", e);
        }
    }

    /// Token for the next gated call, read fresh each time.
    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|s| s.bearer())
            .map(str::to_string)
    }

    pub fn current(&self) -> Option<SessionData> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
