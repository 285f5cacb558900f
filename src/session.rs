//! Auth-session state for the current client process.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store is the single owner of the bearer token. The HTTP
//! adapter reads it on every request; views subscribe to it so the nav bar and
//! protected pages react to login/logout.
//!
//! DESIGN
//! ======
//! State lives in one `tokio::sync::watch` channel. Writes persist the token
//! inside the channel's modify closure, so no reader can see memory and
//! storage disagree, and every subscriber is woken on a real transition.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::ClientError;
use crate::http::{HttpClient, RequestBody};
use crate::storage::{StorageError, TokenStorage};
use crate::types::TokenResponse;

pub const LOGIN_PATH: &str = "/auth/login";
const LOGIN_FAILED_MESSAGE: &str = "login failed";

/// Whether a token is currently held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Snapshot of the client-side session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.token.is_some() { SessionState::Authenticated } else { SessionState::Anonymous }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

struct Inner {
    storage: Box<dyn TokenStorage>,
    state: watch::Sender<Session>,
}

/// Shared handle to the process-wide session. Clones refer to the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("state", &self.state()).finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Load any persisted token. Never fails: unreadable storage is logged and
    /// treated as an anonymous session.
    pub fn initialize(storage: impl TokenStorage + 'static) -> Self {
        let token = match storage.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read persisted session token; starting anonymous");
                None
            }
        };
        let session = Session { token };
        info!(state = ?session.state(), "session initialized");
        let (state, _) = watch::channel(session);
        Self { inner: Arc::new(Inner { storage: Box::new(storage), state }) }
    }

    #[must_use]
    pub fn current_token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().state()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Register a new observer. Each observer is independent and always sees
    /// the latest session.
    #[must_use]
    pub fn subscribe(&self) -> SessionObserver {
        SessionObserver { rx: self.inner.state.subscribe() }
    }

    /// Exchange credentials for a bearer token via `POST /auth/login`.
    ///
    /// On success the token is persisted and published. On any failure the
    /// session is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Authentication`] for a non-2xx response
    /// - [`ClientError::Network`] when no response arrives
    /// - [`ClientError::Decode`] when the body carries no usable token
    /// - [`ClientError::Storage`] when the token cannot be persisted
    pub async fn login(&self, http: &HttpClient, username: &str, password: &str) -> Result<(), ClientError> {
        let body = RequestBody::form(&[("username", username), ("password", password)]);
        let response = http.execute(reqwest::Method::POST, LOGIN_PATH, Some(body), None).await?;

        if !response.status.is_success() {
            let message = response.server_message().unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_owned());
            warn!(status = response.status.as_u16(), "login rejected");
            return Err(ClientError::Authentication { message });
        }

        let token: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| ClientError::Decode(format!("login response: {e}")))?;
        if token.access_token.trim().is_empty() {
            return Err(ClientError::Decode("login response: empty access_token".to_owned()));
        }

        self.establish(token.access_token)?;
        info!(username, "logged in");
        Ok(())
    }

    /// Drop the token from memory and storage. Idempotent.
    pub fn logout(&self) {
        let changed = self.inner.state.send_if_modified(|session| {
            if let Err(e) = self.inner.storage.remove() {
                error!(error = %e, "failed to remove persisted session token");
            }
            session.token.take().is_some()
        });
        if changed {
            info!("logged out");
        }
    }

    fn establish(&self, token: String) -> Result<(), StorageError> {
        let mut outcome = Ok(());
        self.inner.state.send_if_modified(|session| {
            if let Err(e) = self.inner.storage.store(&token) {
                outcome = Err(e);
                return false;
            }
            let changed = session.token.as_deref() != Some(token.as_str());
            session.token = Some(token);
            changed
        });
        outcome
    }
}

/// Receiving side of a session subscription.
#[derive(Debug, Clone)]
pub struct SessionObserver {
    rx: watch::Receiver<Session>,
}

impl SessionObserver {
    /// Latest session, marking it as seen.
    pub fn current(&mut self) -> Session {
        self.rx.borrow_and_update().clone()
    }

    /// Whether a transition happened since the last `current`/`changed`.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next transition. Returns `None` once every store handle
    /// has been dropped.
    pub async fn changed(&mut self) -> Option<Session> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
