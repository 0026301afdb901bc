//! Persistence of the session token.

use labos_protocol::TokenPayload;

use crate::Storage;

/// The key the token is stored under unless configured otherwise.
pub const TOKEN_STORAGE_KEY: &str = "labos_satoken";

/// Reads and writes the session token in a [`Storage`] under one key.
///
/// Neither operation can fail from the caller's point of view. A storage
/// error, or a stored value that doesn't parse, is logged and treated as
/// "no token". If the medium is gone entirely, the session simply runs
/// from memory.
#[derive(Debug)]
pub struct TokenStore<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> TokenStore<S> {
    /// Creates a store using [`TOKEN_STORAGE_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, TOKEN_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the persisted token, if there is a readable one.
    pub fn read(&self) -> Option<TokenPayload> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "could not read stored token");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "ignoring unparseable stored token");
                None
            }
        }
    }

    /// Persists `token`, or deletes the key when `None`.
    pub fn write(&self, token: Option<&TokenPayload>) {
        let result = match token {
            Some(token) => match serde_json::to_string(token) {
                Ok(raw) => self.storage.set_item(&self.key, &raw),
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "could not serialize token");
                    return;
                }
            },
            None => self.storage.remove_item(&self.key),
        };

        if let Err(e) = result {
            tracing::warn!(
                key = %self.key,
                error = %e,
                cleared = token.is_none(),
                "could not persist token, continuing in memory"
            );
        }
    }
}
