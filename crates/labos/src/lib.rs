//! # LabOS
//!
//! Client-side session library for the LabOS web application.
//!
//! LabOS keeps track of who is logged in: it signs users in against the
//! backend's `/auth/*` API, keeps the issued token in durable storage so a
//! restart picks the session back up, and re-validates that token before
//! trusting it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labos::prelude::*;
//!
//! # async fn run() -> Result<(), LabosError> {
//! labos::init_tracing();
//!
//! let mut session = LabosClientBuilder::from_env()?.build()?;
//!
//! match session.check_login_status().await {
//!     Some(user) => println!("welcome back, {}", user.id),
//!     None => {
//!         session.login("a@b.com", "hunter2").await?;
//!     }
//! }
//!
//! session.logout().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod logging;

pub use client::{ClientStorage, LabosClientBuilder, LabosSession};
pub use config::{
    API_BASE_URL_VAR, ClientConfig, ConfigError, DEFAULT_API_BASE_URL,
    PRODUCTION_API_BASE_URL, REQUEST_TIMEOUT_VAR, STORAGE_PATH_VAR,
};
pub use error::LabosError;
pub use logging::init_tracing;

pub use labos_protocol as protocol;
pub use labos_session as session;
pub use labos_transport as transport;

pub mod prelude {
    pub use crate::{
        ClientConfig, ClientStorage, LabosClientBuilder, LabosError,
        LabosSession,
    };
    pub use labos_protocol::{TokenPayload, UserId, UserProfile};
    pub use labos_session::{
        AuthApi, AuthError, FileStorage, HttpAuthApi, MemoryStorage, Session,
        SessionManager, SessionState, Storage, TokenStore,
    };
    pub use labos_transport::{HttpTransport, ReqwestTransport};
}
