//! Bearer token extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use super::error::ApiError;
use super::routes::AppState;
use crate::auth::Claims;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Claims of a caller holding a valid, unexpired token.
///
/// Rejects with 401 when the header is missing or the token fails validation.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("authorization header not found".into()))?;
        let claims = state.jwt.validate(token)?;
        Ok(Self(claims))
    }
}

/// Claims of the caller if a valid token was presented, `None` otherwise.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Claims>);

impl FromRequestParts<AppState> for MaybeAuthenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_token(parts).and_then(|token| match state.jwt.validate(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!(error = %e, "Ignoring unusable bearer token");
                None
            }
        });
        Ok(Self(claims))
    }
}
