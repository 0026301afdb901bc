//! Session types: the client's record of who is logged in.
//!
//! A session tracks:
//! - WHO is logged in (`UserProfile`), if anyone
//! - WHICH credential proves it (`TokenPayload`)
//! - WHAT the session is doing right now (`SessionState`)

use std::fmt;

use labos_protocol::{TokenPayload, UserProfile};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///                  login()                    (ok)
///   Anonymous ──────────────→ Authenticating ──────→ Authenticated
///       ↑                          │ (err)                │   ↑
///       └──────────────────────────┘                      │   │ (ok)
///       ↑                                      check_login_status()
///       │            (err)                                ↓   │
///       ├─────────────────────────────────────────── Refreshing
///       │
///       │            logout()
///       └──────────── LoggingOut ←────────────── (any state)
/// ```
///
/// The three in-flight states (`Authenticating`, `Refreshing`,
/// `LoggingOut`) are what a UI shows as "loading".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Nobody is known to be logged in. A token restored from storage
    /// may still be held until it is validated.
    #[default]
    Anonymous,

    /// A login request is in flight.
    Authenticating,

    /// A token and the user it belongs to are both held.
    Authenticated,

    /// A held token is being re-validated against the backend.
    Refreshing,

    /// A logout request is in flight.
    LoggingOut,
}

impl SessionState {
    /// `true` while a network call is in flight.
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            Self::Authenticating | Self::Refreshing | Self::LoggingOut
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Refreshing => "refreshing",
            Self::LoggingOut => "logging-out",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A snapshot of the session.
///
/// The [`SessionManager`](crate::SessionManager) owns the live copy and
/// publishes a clone of it after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub state: SessionState,

    /// Set by a successful login or refresh; never persisted.
    pub user: Option<UserProfile>,

    /// The credential presented to the backend. Mirrored to durable
    /// storage.
    pub token: Option<TokenPayload>,
}

impl Session {
    /// No user, no token.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session restored from durable storage: the token is known, the
    /// user has yet to be fetched.
    pub fn restored(token: Option<TokenPayload>) -> Self {
        Self {
            state: SessionState::Anonymous,
            user: None,
            token,
        }
    }

    /// `true` when a user is present.
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_in_flight_states_are_loading() {
        assert!(!SessionState::Anonymous.is_loading());
        assert!(!SessionState::Authenticated.is_loading());
        assert!(SessionState::Authenticating.is_loading());
        assert!(SessionState::Refreshing.is_loading());
        assert!(SessionState::LoggingOut.is_loading());
    }

    #[test]
    fn test_restored_session_holds_token_but_no_user() {
        let session = Session::restored(Some(TokenPayload::new("satoken", "T1")));

        assert_eq!(session.state, SessionState::Anonymous);
        assert!(session.token.is_some());
        assert!(!session.is_logged_in());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::LoggingOut.to_string(), "logging-out");
        assert_eq!(SessionState::Authenticated.to_string(), "authenticated");
    }
}
