//! Wire types for the LabOS auth API.
//!
//! Every structure here is serialized to or from JSON on the HTTP
//! boundary. The backend speaks camelCase, so every struct carries
//! `#[serde(rename_all = "camelCase")]`.

use serde::{Deserialize, Serialize};

use std::fmt;

/// The `code` value the backend uses for success.
pub const SUCCESS_CODE: i64 = 0;

/// Header name the backend issues tokens under when it doesn't say.
pub const DEFAULT_TOKEN_NAME: &str = "satoken";

/// API paths, relative to the configured base URL.
pub mod paths {
    pub const LOGIN: &str = "/auth/login";
    pub const LOGOUT: &str = "/auth/logout";
    pub const USER_INFO: &str = "/auth/user-info";
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A backend user ID.
///
/// Serialized as the bare number (`#[serde(transparent)]`), so
/// `UserId(1)` is `1` on the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The logged-in user as the backend describes them.
///
/// Only `id` is required. The backend leaves the other fields null for
/// accounts that never filled them in, and the login response sometimes
/// embeds a trimmed-down copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_avatar: Option<String>,
    /// Free-text bio, not to be confused with the struct itself.
    #[serde(default)]
    pub user_profile: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// The credential issued at login.
///
/// Sent back as a header named `token_name` whose value is
/// `token_value`. This is also the exact JSON persisted in durable
/// storage: `{"tokenName":"satoken","tokenValue":"..."}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub token_name: String,
    pub token_value: String,
}

impl TokenPayload {
    pub fn new(token_name: impl Into<String>, token_value: impl Into<String>) -> Self {
        Self {
            token_name: token_name.into(),
            token_value: token_value.into(),
        }
    }
}

// Token values are bearer credentials; keep them out of logs.
impl fmt::Debug for TokenPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPayload")
            .field("token_name", &self.token_name)
            .field("token_value", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// The `data` of a login response.
///
/// Every field is optional at the wire level; the client decides which
/// ones are required (see `labos-session`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
    #[serde(default)]
    pub token_value: Option<String>,
    #[serde(default)]
    pub token_name: Option<String>,
}

/// The envelope every JSON endpoint wraps its result in.
///
/// ```json
/// { "code": 0, "data": { ... }, "message": "ok" }
/// ```
///
/// A non-zero or missing `code` means the request reached the backend
/// but was refused; `message` then says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: Option<i64>,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Returns `true` when `code` is [`SUCCESS_CODE`].
    pub fn is_success(&self) -> bool {
        self.code == Some(SUCCESS_CODE)
    }
}

// =========================================================================
// Tests
// =========================================================================
