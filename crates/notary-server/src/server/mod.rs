//! HTTP API for the Notary server.
//!
//! Routes authenticate the bearer token, apply the role guards from
//! [`crate::auth::rbac`], then call into the lifecycle or account services.
//! Every response body is JSON: `{"result": ...}` on success and
//! `{"error": "..."}` on failure.

mod accounts;
mod error;
mod extract;
mod requests;
mod routes;
mod session;

pub use error::ApiError;
pub use extract::{Authenticated, MaybeAuthenticated};
pub use routes::{AppState, build_router};
