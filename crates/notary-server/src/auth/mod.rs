//! Authentication and authorization for the Notary server.
//!
//! Provides JWT session tokens, password hashing, and the role checks
//! applied to every API route.

pub mod claims;
pub mod jwt;
pub mod password;
pub mod rbac;

pub use claims::Claims;
pub use jwt::{JwtManager, TokenError};
pub use rbac::{AccountRef, AuthError};
