//! `/api/v1/certificate_requests` handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, parse_id};
use super::extract::Authenticated;
use super::routes::{ApiResponse, AppState, IdResponse};
use crate::storage::{CertificateRequest, RequestStatus};

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub csr: String,
}

#[derive(Debug, Deserialize)]
pub struct AttachCertificateBody {
    pub certificate: String,
}

/// A stored request as returned by the API.
#[derive(Debug, Serialize)]
pub struct CertificateRequestView {
    pub id: i64,
    pub csr: String,
    pub certificate: String,
    pub status: RequestStatus,
}

impl From<CertificateRequest> for CertificateRequestView {
    fn from(row: CertificateRequest) -> Self {
        let status = row.status();
        Self {
            id: row.id,
            csr: row.csr,
            certificate: row.certificate,
            status,
        }
    }
}

/// `GET /api/v1/certificate_requests`
pub async fn list(
    State(state): State<AppState>,
    _caller: Authenticated,
) -> Result<Json<ApiResponse<Vec<CertificateRequestView>>>, ApiError> {
    let rows = state.requests.list().await?;
    Ok(Json(ApiResponse::new(
        rows.into_iter().map(CertificateRequestView::from).collect(),
    )))
}

/// `POST /api/v1/certificate_requests`
pub async fn create(
    State(state): State<AppState>,
    _caller: Authenticated,
    body: Result<Json<CreateRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<IdResponse>>), ApiError> {
    let Json(body) = body?;
    let id = state.requests.submit(&body.csr).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(IdResponse { id }))))
}

/// `GET /api/v1/certificate_requests/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CertificateRequestView>>, ApiError> {
    let row = state.requests.get(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::new(row.into())))
}

/// `DELETE /api/v1/certificate_requests/{id}`
pub async fn delete(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<IdResponse>>), ApiError> {
    let id = state.requests.delete(parse_id(&id)?).await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::new(IdResponse { id }))))
}

/// `POST /api/v1/certificate_requests/{id}/certificate`
pub async fn attach_certificate(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(id): Path<String>,
    body: Result<Json<AttachCertificateBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<IdResponse>>), ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let id = state.requests.attach_certificate(id, &body.certificate).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(IdResponse { id }))))
}

/// `POST /api/v1/certificate_requests/{id}/certificate/reject`
pub async fn reject(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<IdResponse>>), ApiError> {
    let id = state.requests.reject(parse_id(&id)?).await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::new(IdResponse { id }))))
}

/// `DELETE /api/v1/certificate_requests/{id}/certificate`
pub async fn detach_certificate(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<IdResponse>>), ApiError> {
    let id = state.requests.detach_certificate(parse_id(&id)?).await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::new(IdResponse { id }))))
}
