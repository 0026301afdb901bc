//! Wire protocol for the LabOS auth API.
//!
//! This crate defines what the client and the backend exchange:
//!
//! - **Types** ([`ApiResponse`], [`LoginRequest`], [`LoginData`],
//!   [`UserProfile`], [`TokenPayload`]) and the endpoint [`paths`].
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those types are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (HTTP bytes) → Protocol (ApiResponse<T>) → Session (user, token)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    paths, ApiResponse, LoginData, LoginRequest, TokenPayload, UserId,
    UserProfile, DEFAULT_TOKEN_NAME, SUCCESS_CODE,
};
