//! `LabosClientBuilder`: the composition root.
//!
//! This is where the layers meet: a reqwest transport pointed at the
//! configured base URL, the HTTP auth API on top of it, durable storage
//! for the token, and the session manager that owns them all.

use std::path::PathBuf;
use std::time::Duration;

use labos_session::{
    FileStorage, HttpAuthApi, MemoryStorage, SessionManager, Storage,
    StorageError, TokenStore,
};
use labos_transport::ReqwestTransport;

use crate::{ClientConfig, LabosError};

/// The session manager type this crate builds.
pub type LabosSession =
    SessionManager<HttpAuthApi<ReqwestTransport>, ClientStorage>;

/// The durable storage picked by [`ClientConfig::storage_path`].
#[derive(Debug)]
pub enum ClientStorage {
    File(FileStorage),
    Memory(MemoryStorage),
}

impl ClientStorage {
    fn from_config(config: &ClientConfig) -> Self {
        match &config.storage_path {
            Some(path) => Self::File(FileStorage::new(path)),
            None => Self::Memory(MemoryStorage::new()),
        }
    }

    /// `true` when the token survives a restart.
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl Storage for ClientStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::File(s) => s.get_item(key),
            Self::Memory(s) => s.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::File(s) => s.set_item(key, value),
            Self::Memory(s) => s.set_item(key, value),
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::File(s) => s.remove_item(key),
            Self::Memory(s) => s.remove_item(key),
        }
    }
}

/// Builder for a [`LabosSession`].
///
/// # Example
///
/// ```rust,no_run
/// use labos::prelude::*;
///
/// # async fn run() -> Result<(), LabosError> {
/// let mut session = LabosClientBuilder::from_env()?
///     .storage_path("/var/lib/labos/session.json")
///     .build()?;
///
/// if session.check_login_status().await.is_none() {
///     session.login("a@b.com", "hunter2").await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LabosClientBuilder {
    config: ClientConfig,
}

impl LabosClientBuilder {
    /// Creates a builder with [`ClientConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, LabosError> {
        Ok(Self {
            config: ClientConfig::from_env()?,
        })
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.api_base_url = url.to_string();
        self
    }

    /// Persists the token in the JSON file at `path`.
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_path = Some(path.into());
        self
    }

    /// Keeps the token in memory only.
    pub fn in_memory(mut self) -> Self {
        self.config.storage_path = None;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn token_key(mut self, key: &str) -> Self {
        self.config.token_key = key.to_string();
        self
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Wires the layers together and restores any stored token.
    ///
    /// # Errors
    /// [`LabosError::Transport`] if the base URL doesn't parse or the
    /// HTTP client can't be built.
    pub fn build(self) -> Result<LabosSession, LabosError> {
        let transport = ReqwestTransport::with_timeout(
            &self.config.api_base_url,
            self.config.request_timeout,
        )?;
        let storage = ClientStorage::from_config(&self.config);

        tracing::info!(
            base_url = transport.base_url(),
            persistent = storage.is_persistent(),
            "LabOS session client ready"
        );

        let store = TokenStore::with_key(storage, self.config.token_key);
        Ok(SessionManager::new(HttpAuthApi::new(transport), store))
    }
}
