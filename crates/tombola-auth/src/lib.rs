//! JWT token codec and password hashing for tombola.
//!
//! This crate provides:
//! - An HS256 token codec (issue / verify / refresh) carrying the subject,
//!   tenant, username, and role claims every request is authenticated with
//! - Argon2id password hashing with OWASP-recommended parameters
//!
//! The codec is stateless and CPU-bound; it performs no I/O. Verification
//! never panics — every failure mode is an explicit [`AuthError`] variant so
//! callers can degrade to "no credential" without crashing the request.
//!
//! # Example
//!
//! ```rust,ignore
//! use tombola_auth::{Claims, TokenCodec};
//! use tombola_core::{Role, TenantId, UserId};
//!
//! let codec = TokenCodec::new(b"server-secret", 3600);
//!
//! let token = codec.issue(
//!     &UserId::generate(),
//!     &TenantId::generate(),
//!     "alice",
//!     Role::Admin,
//! )?;
//!
//! let claims = codec.verify(&token)?;
//! let refreshed = codec.refresh(&token)?;
//! ```

mod claims;
mod codec;
mod error;
mod password;

pub use claims::Claims;
pub use codec::TokenCodec;
pub use error::AuthError;
pub use password::{hash_password, verify_password};
