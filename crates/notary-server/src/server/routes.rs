//! Router and shared state.

use std::sync::Arc;

use axum::Router;
#[cfg(feature = "metrics")]
use axum::middleware;
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use super::{accounts, requests, session};
use crate::accounts::AccountService;
use crate::auth::JwtManager;
#[cfg(feature = "metrics")]
use crate::metrics::{Metrics, ScrapeState};
use crate::notifications::CertificateNotifier;
use crate::requests::CertificateRequestService;
use crate::storage::NotaryDatabase;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub requests: CertificateRequestService,
    pub accounts: AccountService,
    pub jwt: Arc<JwtManager>,
    #[cfg(feature = "metrics")]
    pub metrics: Option<Arc<Metrics>>,
}

impl AppState {
    pub fn new(
        db: NotaryDatabase,
        jwt: Arc<JwtManager>,
        notifier: Arc<dyn CertificateNotifier>,
    ) -> Self {
        Self {
            requests: CertificateRequestService::new(db.clone(), notifier),
            accounts: AccountService::new(db, Arc::clone(&jwt)),
            jwt,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Count requests and serve `GET /metrics` from `metrics`.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub result: T,
}

impl<T> ApiResponse<T> {
    pub const fn new(result: T) -> Self {
        Self { result }
    }
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: i64,
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/certificate_requests",
            get(requests::list).post(requests::create),
        )
        .route(
            "/certificate_requests/{id}",
            get(requests::get_one).delete(requests::delete),
        )
        .route(
            "/certificate_requests/{id}/certificate",
            post(requests::attach_certificate).delete(requests::detach_certificate),
        )
        .route(
            "/certificate_requests/{id}/certificate/reject",
            post(requests::reject),
        )
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get_one).delete(accounts::delete),
        )
        .route(
            "/accounts/{id}/change_password",
            post(accounts::change_password),
        );

    let router = Router::new()
        .route("/login", post(session::login))
        .route("/status", get(session::status))
        .nest("/api/v1", api);

    #[cfg(feature = "metrics")]
    let router = mount_metrics(router, &state);

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Wrap the API routes in the request counter and mount the scrape route
/// outside it, so scrapes are not counted.
#[cfg(feature = "metrics")]
fn mount_metrics(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let Some(metrics) = state.metrics.clone() else {
        return router;
    };

    let scrape = Router::new()
        .route("/metrics", get(crate::metrics::scrape))
        .with_state(ScrapeState {
            metrics: Arc::clone(&metrics),
            requests: state.requests.clone(),
        });

    router
        .layer(middleware::from_fn_with_state(
            metrics,
            crate::metrics::track_requests,
        ))
        .merge(scrape)
}
