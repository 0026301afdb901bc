/// Boxed source error carried by transport failures.
///
/// The concrete HTTP client is behind a feature flag, so its error type
/// can't appear in this enum directly.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured API base URL could not be parsed.
    #[error("invalid base url {0:?}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] BoxError),

    /// The request never reached the server (DNS, refused, timeout).
    #[error("send failed: {0}")]
    SendFailed(#[source] BoxError),

    /// The response headers arrived but the body could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] BoxError),
}
