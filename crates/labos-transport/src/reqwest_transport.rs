//! HTTP transport implementation using `reqwest`.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// A [`HttpTransport`] that sends requests with `reqwest`.
///
/// The client owns a cookie jar, so cookies set by the backend are sent
/// back on later calls. Clearing cookies swaps in a fresh client with an
/// empty jar; in-flight requests keep the old one.
#[derive(Debug)]
pub struct ReqwestTransport {
    base_url: String,
    timeout: Option<Duration>,
    client: RwLock<reqwest::Client>,
}

impl ReqwestTransport {
    /// Creates a transport for the given API base URL with no timeout.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, None)
    }

    /// Creates a transport whose requests fail after `timeout`.
    pub fn with_timeout(
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        reqwest::Url::parse(base_url)
            .map_err(|_| TransportError::InvalidBaseUrl(base_url.to_string()))?;

        let client = build_client(timeout)?;
        tracing::debug!(base_url, ?timeout, "reqwest transport ready");

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: RwLock::new(client),
        })
    }

    /// Returns the base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn client(&self) -> reqwest::Client {
        // `reqwest::Client` is an `Arc` inside, so cloning is cheap and
        // keeps the lock guard out of the `.await` below.
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.url(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client().request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        tracing::debug!(method = %request.method, %url, "sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::SendFailed(Box::new(e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::ReceiveFailed(Box::new(e)))?;

        tracing::debug!(%url, status = status.as_u16(), "response received");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_owned),
            body: body.to_vec(),
        })
    }

    fn clear_cookies(&self) {
        match build_client(self.timeout) {
            Ok(fresh) => {
                *self
                    .client
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = fresh;
                tracing::debug!("cookie jar cleared");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to reset cookie jar");
            }
        }
    }
}

fn build_client(
    timeout: Option<Duration>,
) -> Result<reqwest::Client, TransportError> {
    let mut builder =
        reqwest::Client::builder().cookie_provider(Arc::new(Jar::default()));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| TransportError::ClientBuild(Box::new(e)))
}
