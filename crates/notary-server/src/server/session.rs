//! Login and deployment status.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::routes::{ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// At least one account exists.
    pub initialized: bool,
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let Json(body) = body?;
    let token = state.accounts.login(&body.username, &body.password).await?;
    Ok(Json(ApiResponse::new(LoginResponse { token })))
}

/// `GET /status`
pub async fn status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
    let initialized = state.accounts.count_accounts().await? > 0;
    Ok(Json(ApiResponse::new(StatusResponse { initialized })))
}
