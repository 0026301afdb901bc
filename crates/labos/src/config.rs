//! Client configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use labos_session::TOKEN_STORAGE_KEY;

/// Environment variable holding the API base URL.
pub const API_BASE_URL_VAR: &str = "LABOS_API_BASE_URL";
/// Environment variable holding the durable storage file path.
pub const STORAGE_PATH_VAR: &str = "LABOS_STORAGE_PATH";
/// Environment variable holding the per-request timeout in seconds.
pub const REQUEST_TIMEOUT_VAR: &str = "LABOS_REQUEST_TIMEOUT_SECS";

/// Base URL of the local dev backend, reached through the `/api` proxy.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8101/api";
/// Base URL of the hosted backend.
pub const PRODUCTION_API_BASE_URL: &str = "https://ai4labos.com/api";

/// A setting from the environment could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Configuration for a LabOS session client.
///
/// Sensible defaults are provided; override only the fields you need:
///
/// ```rust
/// use labos::ClientConfig;
///
/// let config = ClientConfig {
///     storage_path: Some("/tmp/labos/session.json".into()),
///     ..ClientConfig::default()
/// };
/// assert_eq!(config.api_base_url, "http://localhost:8101/api");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every API path, e.g. `https://ai4labos.com/api`.
    pub api_base_url: String,

    /// File backing durable storage. `None` keeps the token in memory
    /// only, so it is lost when the process exits.
    pub storage_path: Option<PathBuf>,

    /// Per-request timeout. `None` waits as long as the server does.
    pub request_timeout: Option<Duration>,

    /// Storage key the token is persisted under.
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: None,
            request_timeout: None,
            token_key: TOKEN_STORAGE_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at the hosted backend.
    pub fn production() -> Self {
        Self {
            api_base_url: PRODUCTION_API_BASE_URL.to_string(),
            ..Self::default()
        }
    }

    /// Reads [`API_BASE_URL_VAR`], [`STORAGE_PATH_VAR`], and
    /// [`REQUEST_TIMEOUT_VAR`] over the defaults. Unset or blank variables
    /// keep their default.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded
    /// first; variables already set in the process win over it.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if the timeout isn't a whole number of
    /// seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), but takes fallback values from
    /// the dotenv file at `path` without touching the process environment.
    /// A missing file is the same as an empty one.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file: HashMap<String, String> = match dotenv::from_path_iter(path) {
            Ok(entries) => entries
                .filter_map(|entry| {
                    entry
                        .map_err(|e| {
                            tracing::warn!(path = %path.display(), error = %e, "skipping bad dotenv line");
                        })
                        .ok()
                })
                .collect(),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no dotenv file");
                HashMap::new()
            }
        };

        Self::from_lookup(|name| {
            std::env::var(name).ok().or_else(|| file.get(name).cloned())
        })
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = var(API_BASE_URL_VAR) {
            config.api_base_url = url;
        }
        if let Some(path) = var(STORAGE_PATH_VAR) {
            config.storage_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = var(REQUEST_TIMEOUT_VAR) {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                var: REQUEST_TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
