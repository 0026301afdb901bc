//! HTTP transport abstraction for the LabOS client.
//!
//! Provides the [`HttpTransport`] trait: one request in, one response out,
//! plus a cookie jar that is presented on every call. Higher layers build
//! JSON requests against API paths and never touch the HTTP client itself.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): [`ReqwestTransport`] backed by `reqwest` with a
//!   cookie store

mod error;
#[cfg(feature = "reqwest")]
mod reqwest_transport;

pub use error::{BoxError, TransportError};
#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;

use std::fmt;
use std::future::Future;

/// HTTP methods used by the auth API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A request relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path appended to the base URL, e.g. `/auth/login`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a bodiless request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Appends a header.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attaches an already-encoded JSON body and the matching content type.
    pub fn json(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self.header("Content-Type", "application/json")
    }

    /// Returns the first header value with the given name
    /// (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase, when the status has one.
    pub reason: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Formats the status as `"401 Unauthorized"`, or just the code when
    /// there is no reason phrase.
    pub fn status_line(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{} {}", self.status, reason),
            None => self.status.to_string(),
        }
    }
}

/// Sends requests to the API and keeps the client's cookies.
///
/// Every request carries the cookies previously set by the server
/// ("credentials included"), independent of any headers the caller adds.
pub trait HttpTransport: Send + Sync + 'static {
    /// Performs a single round trip and reads the whole body.
    ///
    /// Non-2xx statuses are returned as `Ok`; only failures to talk to the
    /// server at all are errors.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// Expires every cookie held by this transport.
    fn clear_cookies(&self);
}
