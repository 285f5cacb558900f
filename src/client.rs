//! Composition root: one session store wired into one HTTP adapter.
//!
//! Views hold an `IdeaHubClient` (cheap to clone) instead of juggling the
//! store and adapter separately, which guarantees login writes to the same
//! session the adapter reads from.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::HttpClient;
use crate::session::{SessionObserver, SessionState, SessionStore};
use crate::storage::{FileTokenStorage, TokenStorage};

#[derive(Clone, Debug)]
pub struct IdeaHubClient {
    http: HttpClient,
}

impl IdeaHubClient {
    /// Restore the session from the configured token file and configure the
    /// adapter.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::configure`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_storage(config, FileTokenStorage::new(&config.token_file))
    }

    /// Like [`IdeaHubClient::from_config`] with a custom storage backend.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::configure`].
    pub fn with_storage(config: &ClientConfig, storage: impl TokenStorage + 'static) -> Result<Self, ClientError> {
        let session = SessionStore::initialize(storage);
        let http = HttpClient::from_config(config, session)?;
        Ok(Self { http })
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        self.http.session()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    #[must_use]
    pub fn subscribe(&self) -> SessionObserver {
        self.session().subscribe()
    }

    /// # Errors
    ///
    /// See [`SessionStore::login`].
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        self.session().login(&self.http, username, password).await
    }

    pub fn logout(&self) {
        self.session().logout();
    }
}
