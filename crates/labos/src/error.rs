//! Unified error type for the LabOS client.

use labos_protocol::ProtocolError;
use labos_session::{AuthError, StorageError};
use labos_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `labos` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum LabosError {
    /// A transport-level error (bad base URL, connection refused).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An auth error (rejected credentials, stale token, bad response).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A durable-storage error, for callers using a `Storage` directly.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The environment held an unusable setting.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
