//! The session manager: owns the client's session and the calls that
//! change it.
//!
//! Responsibilities:
//! - Logging in and keeping the issued token in durable storage
//! - Re-validating a held token (`check_login_status`)
//! - Tearing everything down on logout, whatever the backend says
//! - Publishing every change to observers
//!
//! # Concurrency note
//!
//! The mutating operations take `&mut self`. A login, logout, and status
//! check can therefore never overlap on the same manager; whoever owns it
//! (usually the application's composition root, behind a
//! `tokio::sync::Mutex` if it is shared) serializes them. Readers that
//! only need to watch the session use [`SessionManager::subscribe`], which
//! doesn't borrow the manager at all.

use labos_protocol::{TokenPayload, UserProfile};
use tokio::sync::watch;

use crate::{
    AuthApi, AuthError, LoginOutcome, Session, SessionState, Storage,
    TokenStore,
};

/// Manages the client-side authenticated session.
///
/// ## Lifecycle
///
/// ```text
/// new() ── restores token ──→ check_login_status() ──→ [Authenticated]
///                                    │ (rejected)
///                                    ▼
///   login() ─────────────────→ [Anonymous] ←───────── logout()
/// ```
pub struct SessionManager<A: AuthApi, S: Storage> {
    api: A,
    store: TokenStore<S>,

    /// The live session. Only this struct mutates it.
    session: Session,

    /// Publishes a clone of `session` after each change.
    updates: watch::Sender<Session>,
}

impl<A: AuthApi, S: Storage> SessionManager<A, S> {
    /// Creates a manager, restoring any token left in `store`.
    ///
    /// The user is not restored; call
    /// [`check_login_status`](Self::check_login_status) to fetch it.
    pub fn new(api: A, store: TokenStore<S>) -> Self {
        let session = Session::restored(store.read());
        if session.token.is_some() {
            tracing::debug!(key = store.key(), "restored token from storage");
        }
        let (updates, _) = watch::channel(session.clone());

        Self {
            api,
            store,
            session,
            updates,
        }
    }

    // -- Queries ----------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.session.user.as_ref()
    }

    pub fn auth_token(&self) -> Option<&TokenPayload> {
        self.session.token.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// `true` while a login, logout, or refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Returns a receiver that sees every session change, including the
    /// in-flight states.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.updates.subscribe()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn token_store(&self) -> &TokenStore<S> {
        &self.store
    }

    // -- Operations -------------------------------------------------------

    /// Logs in with email and password.
    ///
    /// On success the token is persisted and the user is set from the
    /// login response, then refreshed from the profile endpoint. A failed
    /// refresh is logged and the login-response user is kept.
    ///
    /// # Errors
    /// Whatever [`AuthApi::login`] returns. The session is left exactly
    /// as it was before the call.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let previous = self.session.state;
        self.transition(SessionState::Authenticating);

        let LoginOutcome { user, token } =
            match self.api.login(email, password).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::info!(error = %e, "login failed");
                    self.transition(previous);
                    return Err(e);
                }
            };

        self.store.write(Some(&token));
        self.session.token = Some(token.clone());
        self.session.user = Some(user.clone());
        self.publish();

        // The embedded user can be partial; the profile endpoint is
        // authoritative when it answers.
        let user = match self.api.fetch_user_by_token(&token).await {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user_id = %user.id,
                    "profile refresh after login failed, keeping login response"
                );
                user
            }
        };

        self.session.user = Some(user.clone());
        self.transition(SessionState::Authenticated);
        tracing::info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// Logs out.
    ///
    /// Always ends anonymous with the token gone from memory and storage
    /// and all cookies expired, even if the backend call fails.
    pub async fn logout(&mut self) {
        self.transition(SessionState::LoggingOut);

        if let Err(e) = self.api.logout(self.session.token.as_ref()).await {
            tracing::warn!(error = %e, "remote logout failed, clearing local session anyway");
        }

        self.api.clear_cookies();
        self.store.write(None);
        self.session = Session::anonymous();
        self.publish();
        tracing::info!("logged out");
    }

    /// Re-validates the held token and refreshes the user.
    ///
    /// - No token: clears the user without touching the network.
    /// - Token accepted: sets the user.
    /// - Token rejected (or any failure): clears token and user.
    ///
    /// Never fails; returns the user, if there is one afterwards.
    pub async fn check_login_status(&mut self) -> Option<&UserProfile> {
        let Some(token) = self.session.token.clone() else {
            self.session.user = None;
            self.transition(SessionState::Anonymous);
            return None;
        };

        self.transition(SessionState::Refreshing);

        match self.api.fetch_user_by_token(&token).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "session token still valid");
                self.session.user = Some(user);
                self.transition(SessionState::Authenticated);
            }
            Err(e) => {
                tracing::info!(error = %e, "session token rejected, clearing session");
                self.store.write(None);
                self.session = Session::anonymous();
                self.publish();
            }
        }

        self.session.user.as_ref()
    }

    // -- Internals --------------------------------------------------------

    fn transition(&mut self, state: SessionState) {
        if self.session.state != state {
            tracing::debug!(from = %self.session.state, to = %state, "session transition");
        }
        self.session.state = state;
        self.publish();
    }

    fn publish(&self) {
        // `send_replace` stores the value even when nobody is subscribed.
        self.updates.send_replace(self.session.clone());
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`, driven through a scripted
    //! `AuthApi`. Names follow `test_{function}_{scenario}_{expected}`.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use labos_protocol::UserId;
    use labos_transport::TransportError;

    use super::*;
    use crate::{MemoryStorage, TOKEN_STORAGE_KEY};

    // -- Helpers ----------------------------------------------------------

    type Reply<T> = Result<T, AuthError>;

    /// An `AuthApi` that replays queued replies and counts calls.
    ///
    /// An empty `user_info` queue answers 401, like a backend that has
    /// never seen the token.
    #[derive(Default)]
    struct ScriptedApi {
        login: Mutex<VecDeque<Reply<LoginOutcome>>>,
        user_info: Mutex<VecDeque<Reply<UserProfile>>>,
        logout: Mutex<VecDeque<Reply<()>>>,
        login_calls: AtomicUsize,
        user_info_calls: AtomicUsize,
        logout_calls: AtomicUsize,
        cookie_clears: AtomicUsize,
        logout_token: Mutex<Option<TokenPayload>>,
    }

    impl ScriptedApi {
        fn on_login(self, reply: Reply<LoginOutcome>) -> Self {
            self.login.lock().unwrap().push_back(reply);
            self
        }

        fn on_user_info(self, reply: Reply<UserProfile>) -> Self {
            self.user_info.lock().unwrap().push_back(reply);
            self
        }

        fn on_logout(self, reply: Reply<()>) -> Self {
            self.logout.lock().unwrap().push_back(reply);
            self
        }

        fn network_calls(&self) -> usize {
            self.login_calls.load(Ordering::SeqCst)
                + self.user_info_calls.load(Ordering::SeqCst)
                + self.logout_calls.load(Ordering::SeqCst)
        }
    }

    impl AuthApi for ScriptedApi {
        async fn login(&self, _email: &str, _password: &str) -> Reply<LoginOutcome> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            self.login
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected login call")
        }

        async fn logout(&self, token: Option<&TokenPayload>) -> Reply<()> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            *self.logout_token.lock().unwrap() = token.cloned();
            self.logout.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }

        async fn fetch_user_by_token(&self, _token: &TokenPayload) -> Reply<UserProfile> {
            self.user_info_calls.fetch_add(1, Ordering::SeqCst);
            self.user_info
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(unauthorized()))
        }

        fn clear_cookies(&self) {
            self.cookie_clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn user(id: i64, name: &str) -> UserProfile {
        UserProfile {
            id: UserId(id),
            user_name: Some(name.to_string()),
            ..UserProfile::default()
        }
    }

    fn token(value: &str) -> TokenPayload {
        TokenPayload::new("satoken", value)
    }

    fn granted(id: i64, value: &str) -> Reply<LoginOutcome> {
        Ok(LoginOutcome {
            user: user(id, "from-login"),
            token: token(value),
        })
    }

    fn unauthorized() -> AuthError {
        AuthError::Http {
            status: 401,
            message: "Failed to fetch user info: 401 Unauthorized".into(),
        }
    }

    fn bad_credentials() -> AuthError {
        AuthError::Rejected {
            code: Some(1),
            message: "bad credentials".into(),
        }
    }

    fn network_down() -> AuthError {
        AuthError::Transport(TransportError::SendFailed("connection refused".into()))
    }

    /// A manager over shared memory storage so tests can inspect what was
    /// persisted.
    fn manager(
        api: ScriptedApi,
    ) -> (SessionManager<ScriptedApi, Arc<MemoryStorage>>, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let mgr = SessionManager::new(api, TokenStore::new(Arc::clone(&storage)));
        (mgr, storage)
    }

    /// Same, but with a token already in storage.
    fn manager_with_stored_token(
        api: ScriptedApi,
        value: &str,
    ) -> (SessionManager<ScriptedApi, Arc<MemoryStorage>>, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        TokenStore::new(Arc::clone(&storage)).write(Some(&token(value)));
        let mgr = SessionManager::new(api, TokenStore::new(Arc::clone(&storage)));
        (mgr, storage)
    }

    fn stored_token(storage: &MemoryStorage) -> Option<String> {
        storage.get_item(TOKEN_STORAGE_KEY).unwrap()
    }

    // =====================================================================
    // new()
    // =====================================================================

    #[test]
    fn test_new_empty_storage_is_anonymous() {
        let (mgr, _) = manager(ScriptedApi::default());

        assert_eq!(mgr.state(), SessionState::Anonymous);
        assert!(mgr.auth_token().is_none());
        assert!(mgr.current_user().is_none());
        assert!(!mgr.is_loading());
    }

    #[test]
    fn test_new_restores_token_but_not_user() {
        let (mgr, _) = manager_with_stored_token(ScriptedApi::default(), "T0");

        assert_eq!(mgr.auth_token(), Some(&token("T0")));
        assert!(mgr.current_user().is_none());
        assert!(!mgr.is_logged_in());
    }

    // =====================================================================
    // login()
    // =====================================================================

    #[tokio::test]
    async fn test_login_success_sets_user_and_persists_token() {
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Ok(user(1, "from-profile")));
        let (mut mgr, storage) = manager(api);

        let returned = mgr.login("a@b.com", "x").await.expect("login should succeed");

        assert_eq!(returned.id, UserId(1));
        assert_eq!(mgr.state(), SessionState::Authenticated);
        assert!(mgr.is_logged_in());
        assert_eq!(mgr.current_user().unwrap().id, UserId(1));
        assert_eq!(mgr.auth_token().unwrap().token_value, "T1");

        let raw = stored_token(&storage).expect("token should be persisted");
        let persisted: TokenPayload = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.token_value, "T1");
    }

    #[tokio::test]
    async fn test_login_refresh_replaces_login_response_user() {
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Ok(user(1, "from-profile")));
        let (mut mgr, _) = manager(api);

        let returned = mgr.login("a@b.com", "x").await.unwrap();

        assert_eq!(returned.user_name.as_deref(), Some("from-profile"));
        assert_eq!(
            mgr.current_user().unwrap().user_name.as_deref(),
            Some("from-profile")
        );
    }

    #[tokio::test]
    async fn test_login_refresh_failure_keeps_login_response_user() {
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Err(network_down()));
        let (mut mgr, storage) = manager(api);

        let returned = mgr.login("a@b.com", "x").await.expect("refresh failure is not fatal");

        assert_eq!(returned.user_name.as_deref(), Some("from-login"));
        assert_eq!(mgr.state(), SessionState::Authenticated);
        assert_eq!(mgr.auth_token().unwrap().token_value, "T1");
        assert!(stored_token(&storage).is_some());
    }

    #[tokio::test]
    async fn test_login_rejected_surfaces_message_and_stays_anonymous() {
        let api = ScriptedApi::default().on_login(Err(bad_credentials()));
        let (mut mgr, storage) = manager(api);

        let err = mgr.login("a@b.com", "x").await.unwrap_err();

        assert_eq!(err.to_string(), "bad credentials");
        assert_eq!(mgr.state(), SessionState::Anonymous);
        assert!(mgr.current_user().is_none());
        assert!(mgr.auth_token().is_none());
        assert!(stored_token(&storage).is_none());
        assert!(!mgr.is_loading());
        assert_eq!(mgr.api().user_info_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_failure_while_authenticated_keeps_existing_session() {
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Ok(user(1, "ada")))
            .on_login(Err(network_down()));
        let (mut mgr, _) = manager(api);
        mgr.login("a@b.com", "x").await.unwrap();

        let result = mgr.login("other@b.com", "y").await;

        assert!(result.is_err());
        assert_eq!(mgr.state(), SessionState::Authenticated);
        assert_eq!(mgr.current_user().unwrap().id, UserId(1));
        assert_eq!(mgr.auth_token().unwrap().token_value, "T1");
    }

    #[tokio::test]
    async fn test_login_publishes_in_flight_state() {
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Ok(user(1, "ada")));
        let (mut mgr, _) = manager(api);
        let mut rx = mgr.subscribe();
        assert_eq!(rx.borrow_and_update().state, SessionState::Anonymous);

        mgr.login("a@b.com", "x").await.unwrap();

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.state, SessionState::Authenticated);
        assert_eq!(seen.user.unwrap().id, UserId(1));
    }

    // =====================================================================
    // logout()
    // =====================================================================

    #[tokio::test]
    async fn test_logout_clears_everything_and_sends_token() {
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Ok(user(1, "ada")));
        let (mut mgr, storage) = manager(api);
        mgr.login("a@b.com", "x").await.unwrap();

        mgr.logout().await;

        assert_eq!(mgr.state(), SessionState::Anonymous);
        assert!(mgr.current_user().is_none());
        assert!(mgr.auth_token().is_none());
        assert!(stored_token(&storage).is_none());
        assert_eq!(mgr.api().cookie_clears.load(Ordering::SeqCst), 1);
        assert_eq!(*mgr.api().logout_token.lock().unwrap(), Some(token("T1")));
    }

    #[tokio::test]
    async fn test_logout_backend_error_still_clears_session() {
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Ok(user(1, "ada")))
            .on_logout(Err(AuthError::Http {
                status: 500,
                message: "Logout failed: 500".into(),
            }));
        let (mut mgr, storage) = manager(api);
        mgr.login("a@b.com", "x").await.unwrap();

        mgr.logout().await;

        assert!(mgr.current_user().is_none());
        assert!(mgr.auth_token().is_none());
        assert!(stored_token(&storage).is_none());
        assert_eq!(mgr.api().cookie_clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_network_failure_still_clears_session() {
        let api = ScriptedApi::default().on_logout(Err(network_down()));
        let (mut mgr, storage) = manager_with_stored_token(api, "T0");

        mgr.logout().await;

        assert_eq!(mgr.state(), SessionState::Anonymous);
        assert!(mgr.auth_token().is_none());
        assert!(stored_token(&storage).is_none());
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_sends_no_token() {
        let (mut mgr, _) = manager(ScriptedApi::default());

        mgr.logout().await;

        assert_eq!(mgr.api().logout_calls.load(Ordering::SeqCst), 1);
        assert!(mgr.api().logout_token.lock().unwrap().is_none());
        assert_eq!(mgr.state(), SessionState::Anonymous);
    }

    // =====================================================================
    // check_login_status()
    // =====================================================================

    #[tokio::test]
    async fn test_check_login_status_without_token_makes_no_request() {
        let (mut mgr, _) = manager(ScriptedApi::default());

        let user = mgr.check_login_status().await;

        assert!(user.is_none());
        assert_eq!(mgr.state(), SessionState::Anonymous);
        assert_eq!(mgr.api().network_calls(), 0);
    }

    #[tokio::test]
    async fn test_check_login_status_valid_token_sets_user() {
        let api = ScriptedApi::default().on_user_info(Ok(user(7, "ada")));
        let (mut mgr, storage) = manager_with_stored_token(api, "T0");

        let user = mgr.check_login_status().await.cloned();

        assert_eq!(user.unwrap().id, UserId(7));
        assert_eq!(mgr.state(), SessionState::Authenticated);
        assert!(stored_token(&storage).is_some());
    }

    #[tokio::test]
    async fn test_check_login_status_rejected_token_clears_storage() {
        // Empty user_info queue → 401.
        let (mut mgr, storage) = manager_with_stored_token(ScriptedApi::default(), "T0");

        let user = mgr.check_login_status().await;

        assert!(user.is_none());
        assert_eq!(mgr.state(), SessionState::Anonymous);
        assert!(mgr.auth_token().is_none());
        assert!(stored_token(&storage).is_none());
    }

    #[tokio::test]
    async fn test_check_login_status_twice_is_stable() {
        let api = ScriptedApi::default()
            .on_user_info(Ok(user(7, "ada")))
            .on_user_info(Ok(user(7, "ada")));
        let (mut mgr, _) = manager_with_stored_token(api, "T0");

        let first = mgr.check_login_status().await.cloned();
        let second = mgr.check_login_status().await.cloned();

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_check_login_status_after_logout_stays_anonymous() {
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Ok(user(1, "ada")));
        let (mut mgr, _) = manager(api);
        mgr.login("a@b.com", "x").await.unwrap();
        mgr.logout().await;
        let calls_before = mgr.api().network_calls();

        assert!(mgr.check_login_status().await.is_none());
        assert_eq!(mgr.api().network_calls(), calls_before);
    }

    // =====================================================================
    // Full lifecycle
    // =====================================================================

    #[tokio::test]
    async fn test_token_survives_restart_and_is_revalidated() {
        let storage = Arc::new(MemoryStorage::new());

        // First "process": log in.
        let api = ScriptedApi::default()
            .on_login(granted(1, "T1"))
            .on_user_info(Ok(user(1, "ada")));
        let mut first = SessionManager::new(api, TokenStore::new(Arc::clone(&storage)));
        first.login("a@b.com", "x").await.unwrap();
        drop(first);

        // Second "process": token comes back from storage, user is
        // re-fetched.
        let api = ScriptedApi::default().on_user_info(Ok(user(1, "ada")));
        let mut second = SessionManager::new(api, TokenStore::new(Arc::clone(&storage)));
        assert_eq!(second.auth_token(), Some(&token("T1")));
        assert!(second.current_user().is_none());

        second.check_login_status().await;

        assert_eq!(second.current_user().unwrap().id, UserId(1));
    }
}
