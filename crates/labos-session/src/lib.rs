//! Client-side session management for LabOS.
//!
//! This crate answers "is someone logged in, and who?" for the rest of
//! the application:
//!
//! 1. **Token storage**: keeping the issued token across restarts
//!    ([`Storage`], [`TokenStore`])
//! 2. **Auth API**: the backend calls ([`AuthApi`] trait, [`HttpAuthApi`])
//! 3. **Session tracking**: the state machine tying them together
//!    ([`SessionManager`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)  ← owns one SessionManager, watches Session updates
//!     ↕
//! Session Layer (this crate)  ← user, token, loading state
//!     ↕
//! Protocol + Transport (below)  ← JSON envelopes over HTTP with cookies
//! ```

mod auth;
mod error;
mod manager;
mod session;
mod storage;
mod token_store;

pub use auth::{AuthApi, HttpAuthApi, LoginOutcome};
pub use error::{AuthError, StorageError};
pub use manager::SessionManager;
pub use session::{Session, SessionState};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use token_store::{TokenStore, TOKEN_STORAGE_KEY};
