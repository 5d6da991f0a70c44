//! `/api/v1/accounts` handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, parse_id};
use super::extract::{Authenticated, MaybeAuthenticated};
use super::routes::{ApiResponse, AppState, IdResponse};
use crate::accounts::AccountError;
use crate::auth::Claims;
use crate::auth::rbac::{
    authorize_account_path, bootstrap_closed, require_admin, require_admin_or_first_user,
};
use crate::storage::User;

#[derive(Debug, Deserialize)]
pub struct CreateAccountBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub id: i64,
    /// Returned once, only when the server generated it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
    #[serde(default)]
    pub password: String,
}

/// `GET /api/v1/accounts`
pub async fn list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    require_admin(&caller)?;
    let users = state.accounts.list_accounts().await?;
    Ok(Json(ApiResponse::new(users)))
}

/// `POST /api/v1/accounts`
///
/// Open to anyone while no account exists, admin-only afterwards. A caller
/// without admin rights goes through the first-account path, which the store
/// closes atomically, so concurrent anonymous sign-ups cannot both succeed.
pub async fn create(
    State(state): State<AppState>,
    MaybeAuthenticated(caller): MaybeAuthenticated,
    body: Result<Json<CreateAccountBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CreateAccountResponse>>), ApiError> {
    let user_count = state.accounts.count_accounts().await?;
    require_admin_or_first_user(caller.as_ref(), user_count)?;

    let Json(body) = body?;
    let created = if caller.as_ref().is_some_and(Claims::is_admin) {
        state
            .accounts
            .create_account(&body.username, body.password.as_deref())
            .await?
    } else {
        match state
            .accounts
            .create_first_account(&body.username, body.password.as_deref())
            .await
        {
            Err(AccountError::AlreadyInitialized) => {
                return Err(bootstrap_closed(caller.as_ref()).into());
            }
            created => created?,
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CreateAccountResponse {
            id: created.id,
            password: created.generated_password,
        })),
    ))
}

/// `GET /api/v1/accounts/{id}`, where `id` may be `me`.
pub async fn get_one(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = authorize_account_path(&caller, &id)?;
    let user = state.accounts.get_account(id).await?;
    Ok(Json(ApiResponse::new(user)))
}

/// `DELETE /api/v1/accounts/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<IdResponse>>), ApiError> {
    require_admin(&caller)?;
    let id = state.accounts.delete_account(parse_id(&id)?).await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::new(IdResponse { id }))))
}

/// `POST /api/v1/accounts/{id}/change_password`, where `id` may be `me`.
pub async fn change_password(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<ChangePasswordBody>, JsonRejection>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    let id = authorize_account_path(&caller, &id)?;

    let Json(body) = body?;
    let id = state.accounts.change_password(id, &body.password).await?;
    Ok(Json(ApiResponse::new(IdResponse { id })))
}
