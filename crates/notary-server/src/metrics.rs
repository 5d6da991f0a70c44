//! Prometheus metrics for the HTTP API and the certificate request store.
//!
//! This module is only compiled when the `metrics` Cargo feature is enabled.
//! Request counters are updated by [`track_requests`] as responses leave the
//! router. Certificate gauges are recomputed from the store on every scrape
//! of `GET /metrics`.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus::core::Collector;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TEXT_FORMAT,
    TextEncoder,
};
use tracing::warn;

use crate::requests::CertificateRequestService;
use crate::server::ApiError;
use crate::storage::{CertificateRequest, RequestStatus};

const SECS_PER_DAY: i64 = 86_400;

/// Expiry windows reported as `certificates_expiring_in_*` gauges.
const EXPIRY_WINDOWS: [(i64, &str); 4] = [
    (1, "certificates_expiring_in_1_day"),
    (7, "certificates_expiring_in_7_days"),
    (30, "certificates_expiring_in_30_days"),
    (90, "certificates_expiring_in_90_days"),
];

/// Errors raised while building or rendering the metrics registry.
#[derive(Debug, thiserror::Error)]
#[error("metrics registry error: {0}")]
pub struct MetricsError(#[from] prometheus::Error);

/// The server's metric families, all held in one private registry.
pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    request_duration: HistogramVec,
    certificate_requests: IntGauge,
    outstanding: IntGauge,
    certificates: IntGauge,
    rejected: IntGauge,
    expired: IntGauge,
    expiring: Vec<(i64, IntGauge)>,
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, MetricsError>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, MetricsError> {
    register(registry, IntGauge::new(name, help)?)
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl Metrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let http_requests = register(
            &registry,
            IntCounterVec::new(
                Opts::new("http_requests_total", "Number of HTTP requests served"),
                &["method", "code"],
            )?,
        )?;
        let request_duration = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "http_request_duration_seconds",
                    "Time taken to serve HTTP requests",
                ),
                &["method"],
            )?,
        )?;

        let expiring = EXPIRY_WINDOWS
            .iter()
            .map(|&(days, name)| {
                let help = format!("Active certificates expiring within {days} days");
                Ok((days, gauge(&registry, name, &help)?))
            })
            .collect::<Result<Vec<_>, MetricsError>>()?;

        Ok(Self {
            certificate_requests: gauge(
                &registry,
                "certificate_requests",
                "Total number of certificate requests",
            )?,
            outstanding: gauge(
                &registry,
                "outstanding_certificate_requests",
                "Certificate requests with no certificate attached",
            )?,
            certificates: gauge(&registry, "certificates", "Active certificates")?,
            rejected: gauge(
                &registry,
                "rejected_certificate_requests",
                "Certificate requests that were rejected",
            )?,
            expired: gauge(&registry, "expired_certificates", "Active certificates past expiry")?,
            expiring,
            http_requests,
            request_duration,
            registry,
        })
    }

    /// Count one served request.
    pub fn observe_request(&self, method: &str, status: StatusCode, elapsed: Duration) {
        self.http_requests
            .with_label_values(&[method, status.as_str()])
            .inc();
        self.request_duration
            .with_label_values(&[method])
            .observe(elapsed.as_secs_f64());
    }

    /// Recompute the certificate gauges from the stored rows.
    ///
    /// `now` is a Unix timestamp. Windows are cumulative: a certificate
    /// expiring tomorrow counts toward every window.
    pub fn record_store(&self, rows: &[CertificateRequest], now: i64) {
        let mut outstanding = 0;
        let mut active = 0;
        let mut rejected = 0;
        let mut expired = 0;
        let mut expiring = vec![0; self.expiring.len()];

        for row in rows {
            match row.status() {
                RequestStatus::Outstanding => outstanding += 1,
                RequestStatus::Rejected => rejected += 1,
                RequestStatus::Active => {
                    active += 1;
                    let not_after = match notary_pki::leaf_not_after(&row.certificate) {
                        Ok(not_after) => not_after,
                        Err(e) => {
                            warn!(id = row.id, error = %e, "Stored certificate could not be read");
                            continue;
                        }
                    };
                    let remaining = not_after - now;
                    if remaining <= 0 {
                        expired += 1;
                        continue;
                    }
                    for (slot, (days, _)) in expiring.iter_mut().zip(&self.expiring) {
                        if remaining <= days * SECS_PER_DAY {
                            *slot += 1;
                        }
                    }
                }
            }
        }

        self.certificate_requests.set(count(rows.len()));
        self.outstanding.set(outstanding);
        self.certificates.set(active);
        self.rejected.set(rejected);
        self.expired.set(expired);
        for (value, (_, gauge)) in expiring.into_iter().zip(&self.expiring) {
            gauge.set(value);
        }
    }

    /// Render every family in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, MetricsError> {
        Ok(TextEncoder::new().encode_to_string(&self.registry.gather())?)
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// Middleware counting every request that passes through the router.
pub async fn track_requests(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    metrics.observe_request(method.as_str(), response.status(), started.elapsed());
    response
}

/// State for the scrape route.
#[derive(Clone)]
pub struct ScrapeState {
    pub metrics: Arc<Metrics>,
    pub requests: CertificateRequestService,
}

/// `GET /metrics`
pub async fn scrape(State(state): State<ScrapeState>) -> Result<Response, ApiError> {
    let rows = state.requests.list().await?;
    state.metrics.record_store(&rows, now_secs());
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(CONTENT_TYPE, TEXT_FORMAT)], body).into_response())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::REJECTED_SENTINEL;
    use notary_pki::testing::{TestAuthority, TestRequest, join_chain};

    fn row(id: i64, certificate: &str) -> CertificateRequest {
        CertificateRequest {
            id,
            csr: format!("csr-{id}"),
            certificate: certificate.to_string(),
        }
    }

    fn sample(rendered: &str, name: &str) -> String {
        rendered
            .lines()
            .find(|line| line.starts_with(name) && line[name.len()..].starts_with(' '))
            .unwrap_or_else(|| panic!("{name} missing from:\n{rendered}"))
            .rsplit(' ')
            .next()
            .unwrap()
            .to_string()
    }

    #[test]
    fn gauges_follow_request_status() {
        let root = TestAuthority::root("Metrics Root");
        let chain = join_chain(&[&root.issue(&TestRequest::new("example.com")), &root.cert_pem]);
        let rows = [
            row(1, ""),
            row(2, ""),
            row(3, &chain),
            row(4, REJECTED_SENTINEL),
        ];

        let metrics = Metrics::new().unwrap();
        metrics.record_store(&rows, 0);
        let rendered = metrics.render().unwrap();

        assert_eq!(sample(&rendered, "certificate_requests"), "4");
        assert_eq!(sample(&rendered, "outstanding_certificate_requests"), "2");
        assert_eq!(sample(&rendered, "certificates"), "1");
        assert_eq!(sample(&rendered, "rejected_certificate_requests"), "1");
        assert_eq!(sample(&rendered, "expired_certificates"), "0");
    }

    #[test]
    fn expiry_windows_are_cumulative() {
        let root = TestAuthority::root("Metrics Root");
        let chain = join_chain(&[&root.issue(&TestRequest::new("example.com")), &root.cert_pem]);
        let not_after = notary_pki::leaf_not_after(&chain).unwrap();
        let rows = [row(1, &chain)];
        let metrics = Metrics::new().unwrap();

        metrics.record_store(&rows, not_after - 3 * SECS_PER_DAY);
        let rendered = metrics.render().unwrap();
        assert_eq!(sample(&rendered, "certificates_expiring_in_1_day"), "0");
        assert_eq!(sample(&rendered, "certificates_expiring_in_7_days"), "1");
        assert_eq!(sample(&rendered, "certificates_expiring_in_90_days"), "1");

        metrics.record_store(&rows, not_after + 1);
        let rendered = metrics.render().unwrap();
        assert_eq!(sample(&rendered, "expired_certificates"), "1");
        assert_eq!(sample(&rendered, "certificates_expiring_in_90_days"), "0");
    }

    #[test]
    fn requests_are_counted_by_method_and_code() {
        let metrics = Metrics::new().unwrap();
        metrics.observe_request("GET", StatusCode::OK, Duration::from_millis(3));
        metrics.observe_request("GET", StatusCode::OK, Duration::from_millis(5));
        metrics.observe_request("POST", StatusCode::UNAUTHORIZED, Duration::from_millis(1));

        let rendered = metrics.render().unwrap();
        assert!(rendered.contains(r#"http_requests_total{code="200",method="GET"} 2"#));
        assert!(rendered.contains(r#"http_requests_total{code="401",method="POST"} 1"#));
        assert!(rendered.contains(r#"http_request_duration_seconds_count{method="GET"} 2"#));
    }
}
