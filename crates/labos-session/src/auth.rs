//! The remote authentication API.
//!
//! The client doesn't authenticate anyone itself; the backend does. This
//! module defines the [`AuthApi`] trait (the three calls the session
//! needs) and [`HttpAuthApi`], which makes those calls over an
//! [`HttpTransport`].
//!
//! The trait is the seam the session manager is tested through: unit
//! tests plug in a scripted implementation, production plugs in
//! `HttpAuthApi<ReqwestTransport>`.

use std::future::Future;

use labos_protocol::{
    paths, ApiResponse, Codec, JsonCodec, LoginData, LoginRequest,
    TokenPayload, UserProfile, DEFAULT_TOKEN_NAME,
};
use labos_transport::{HttpRequest, HttpResponse, HttpTransport};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::AuthError;

/// What a successful login hands back: who the user is and the token
/// to present from now on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: UserProfile,
    pub token: TokenPayload,
}

/// The backend calls the session is built on.
///
/// Every call also carries the client's cookies, so cookie-based session
/// continuation works alongside the token header.
pub trait AuthApi: Send + Sync + 'static {
    /// Exchanges credentials for a user and a token.
    ///
    /// # Errors
    /// Any non-2xx status, a non-zero `code`, or a response without a
    /// user or token value.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginOutcome, AuthError>> + Send;

    /// Tells the backend the session is over, presenting `token` if one
    /// is held.
    fn logout(
        &self,
        token: Option<&TokenPayload>,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Fetches the profile of whoever `token` belongs to.
    ///
    /// # Errors
    /// Any non-2xx status (401 for a stale token), a non-zero `code`, or
    /// a response without data.
    fn fetch_user_by_token(
        &self,
        token: &TokenPayload,
    ) -> impl Future<Output = Result<UserProfile, AuthError>> + Send;

    /// Expires every cookie the client holds for the backend.
    fn clear_cookies(&self);
}

// ---------------------------------------------------------------------------
// HttpAuthApi
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Login,
    Logout,
    UserInfo,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Self::Login => paths::LOGIN,
            Self::Logout => paths::LOGOUT,
            Self::UserInfo => paths::USER_INFO,
        }
    }

    /// Used when the backend fails without saying why.
    fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Logout => "Logout failed",
            Self::UserInfo => "Failed to fetch user info",
        }
    }
}

/// Only the message matters when a non-2xx body is JSON.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// [`AuthApi`] over HTTP.
///
/// ```rust,no_run
/// use labos_session::HttpAuthApi;
/// use labos_transport::ReqwestTransport;
///
/// let transport = ReqwestTransport::new("http://localhost:8101/api")?;
/// let api = HttpAuthApi::new(transport);
/// # Ok::<(), labos_transport::TransportError>(())
/// ```
#[derive(Debug)]
pub struct HttpAuthApi<T: HttpTransport, C: Codec = JsonCodec> {
    transport: T,
    codec: C,
}

impl<T: HttpTransport> HttpAuthApi<T, JsonCodec> {
    pub fn new(transport: T) -> Self {
        Self::with_codec(transport, JsonCodec)
    }
}

impl<T: HttpTransport, C: Codec> HttpAuthApi<T, C> {
    pub fn with_codec(transport: T, codec: C) -> Self {
        Self { transport, codec }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Turns a raw response into the success envelope, or the error that
    /// best describes why it isn't one.
    fn envelope<D: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        response: HttpResponse,
    ) -> Result<ApiResponse<D>, AuthError> {
        if !response.is_success() {
            return Err(self.http_error(endpoint, &response));
        }

        let envelope: ApiResponse<D> = self.codec.decode(&response.body)?;
        if !envelope.is_success() {
            return Err(AuthError::Rejected {
                code: envelope.code,
                message: envelope
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| endpoint.fallback_message().to_string()),
            });
        }
        Ok(envelope)
    }

    fn http_error(&self, endpoint: Endpoint, response: &HttpResponse) -> AuthError {
        let message = match self.codec.decode::<ErrorBody>(&response.body) {
            Ok(ErrorBody {
                message: Some(message),
            }) if !message.is_empty() => message,
            Ok(_) => format!("{}: {}", endpoint.fallback_message(), response.status),
            Err(_) => format!(
                "{}: {}",
                endpoint.fallback_message(),
                response.status_line()
            ),
        };
        AuthError::Http {
            status: response.status,
            message,
        }
    }
}

fn with_token(request: HttpRequest, token: &TokenPayload) -> HttpRequest {
    request.header(token.token_name.as_str(), token.token_value.as_str())
}

impl<T: HttpTransport, C: Codec> AuthApi for HttpAuthApi<T, C> {
    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let body = self.codec.encode(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let request = HttpRequest::post(Endpoint::Login.path()).json(body);

        let response = self.transport.send(request).await?;
        let data: LoginData = self
            .envelope(Endpoint::Login, response)?
            .data
            .ok_or(AuthError::MissingField("data"))?;

        let user = data
            .user_profile
            .ok_or(AuthError::MissingField("userProfile"))?;
        let token_value = data
            .token_value
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingField("tokenValue"))?;
        let token_name = data
            .token_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_NAME.to_string());

        Ok(LoginOutcome {
            user,
            token: TokenPayload::new(token_name, token_value),
        })
    }

    async fn logout(&self, token: Option<&TokenPayload>) -> Result<(), AuthError> {
        let mut request = HttpRequest::post(Endpoint::Logout.path());
        if let Some(token) = token {
            request = with_token(request, token);
        }

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(self.http_error(Endpoint::Logout, &response));
        }
        Ok(())
    }

    async fn fetch_user_by_token(
        &self,
        token: &TokenPayload,
    ) -> Result<UserProfile, AuthError> {
        let request =
            with_token(HttpRequest::get(Endpoint::UserInfo.path()), token);

        let response = self.transport.send(request).await?;
        self.envelope(Endpoint::UserInfo, response)?
            .data
            .ok_or(AuthError::MissingField("data"))
    }

    fn clear_cookies(&self) {
        self.transport.clear_cookies();
    }
}
