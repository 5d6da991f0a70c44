//! Translation of service errors into HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::accounts::AccountError;
use crate::auth::rbac::{AccountPathError, InvalidAccountRef};
use crate::auth::{AuthError, TokenError};
use crate::requests::RequestError;

/// An error response. Internal details are logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "Internal Error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        match e {
            RequestError::InvalidRequest(_)
            | RequestError::DuplicateRequest
            | RequestError::InvalidCertificate(_) => Self::BadRequest(e.to_string()),
            RequestError::NotFound(_) => Self::NotFound(e.to_string()),
            RequestError::Store(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::UsernameRequired
            | AccountError::PasswordRequired
            | AccountError::WeakPassword
            | AccountError::DuplicateUsername
            | AccountError::AdminDeletionForbidden
            | AccountError::MissingCredentials => Self::BadRequest(e.to_string()),
            AccountError::InvalidCredentials => Self::Unauthorized(e.to_string()),
            AccountError::AlreadyInitialized => Self::from(AuthError::Unauthenticated),
            AccountError::NotFound(_) => Self::NotFound(e.to_string()),
            AccountError::Hashing(_) | AccountError::Token(_) | AccountError::Store(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthenticated => Self::Unauthorized(e.to_string()),
            AuthError::Forbidden(_) => Self::Forbidden(e.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        Self::Unauthorized(e.to_string())
    }
}

impl From<AccountPathError> for ApiError {
    fn from(e: AccountPathError) -> Self {
        match e {
            AccountPathError::Auth(e) => e.into(),
            AccountPathError::Invalid(e) => e.into(),
        }
    }
}

impl From<InvalidAccountRef> for ApiError {
    fn from(e: InvalidAccountRef) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        Self::BadRequest("Invalid JSON format".into())
    }
}

/// Parse a numeric path id.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid id: {raw}")))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use notary_core::db::DatabaseError;
    use notary_pki::ValidationError;

    #[test]
    fn request_errors_map_to_statuses() {
        let cases = [
            (
                RequestError::InvalidRequest(ValidationError::MalformedPem),
                StatusCode::BAD_REQUEST,
            ),
            (RequestError::DuplicateRequest, StatusCode::BAD_REQUEST),
            (
                RequestError::InvalidCertificate(ValidationError::KeyMismatch),
                StatusCode::BAD_REQUEST,
            ),
            (RequestError::NotFound(3), StatusCode::NOT_FOUND),
            (
                RequestError::Store(DatabaseError::Query("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn account_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(AccountError::WeakPassword).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AccountError::AdminDeletionForbidden).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AccountError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AccountError::NotFound(1)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AccountError::Hashing("bad salt".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            ApiError::from(AuthError::Unauthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Forbidden("admin access required")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(TokenError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn internal_detail_is_not_exposed() {
        let response = ApiError::Internal("database is locked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Internal Error");
    }

    #[test]
    fn parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("abc"), Err(ApiError::BadRequest(_))));
    }
}
