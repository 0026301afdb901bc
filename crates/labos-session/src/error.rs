//! Error types for the session layer.

use std::path::PathBuf;

use labos_protocol::ProtocolError;
use labos_transport::TransportError;

/// Errors returned by the auth API and surfaced by
/// [`SessionManager::login`](crate::SessionManager::login).
///
/// The variants split into two families:
///
/// - **transport**: the exchange itself failed ([`Transport`](Self::Transport),
///   [`Http`](Self::Http), [`Protocol`](Self::Protocol))
/// - **application**: the backend answered but refused
///   ([`Rejected`](Self::Rejected)) or left out something required
///   ([`MissingField`](Self::MissingField))
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request could not be sent or its body could not be read.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    ///
    /// `message` is the backend's own message when the body carried one,
    /// otherwise it is derived from the status line.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The body was not the JSON shape we expected (or the request body
    /// could not be encoded).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// HTTP succeeded but the envelope's `code` was non-zero or missing.
    #[error("{message}")]
    Rejected { code: Option<i64>, message: String },

    /// HTTP and `code` were fine but a required field was absent.
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

impl AuthError {
    /// The exchange failed before the backend could give an answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Http { .. } | Self::Protocol(_)
        )
    }

    /// The backend answered but the answer was a refusal or incomplete.
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::MissingField(_))
    }

    /// The HTTP status, for [`Http`](Self::Http) errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from a durable [`Storage`](crate::Storage) backend.
///
/// [`TokenStore`](crate::TokenStore) never lets these escape; they are
/// logged and the token is treated as absent.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backend has no persistent medium at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
