//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, endpoint, status
//! - `http_errors_total` (counter): responses with status >= 400
//! - `routes_latency_seconds` (histogram): handler latency by method, endpoint
//! - `integrations_latency_seconds` (histogram): latency of outbound calls
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus recorder is installed at most once per process
//! - Endpoint label is the matched route template when available

use std::future::Future;
use std::sync::Mutex;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_ERRORS_TOTAL: &str = "http_errors_total";
pub const ROUTES_LATENCY: &str = "routes_latency_seconds";
pub const INTEGRATIONS_LATENCY: &str = "integrations_latency_seconds";

/// Latency buckets in seconds. `+Inf` is added by the exporter.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.125, 0.15, 0.175, 0.2, 0.25, 0.3, 0.5, 0.75, 1.0,
    2.5, 5.0, 7.5,
];

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to build Prometheus recorder: {0}")]
    Build(#[from] BuildError),

    #[error("metrics recorder lock poisoned")]
    Poisoned,
}

/// Prometheus builder with the latency buckets applied.
pub fn prometheus_builder() -> Result<PrometheusBuilder, MetricsError> {
    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(ROUTES_LATENCY.to_string()), LATENCY_BUCKETS)?
        .set_buckets_for_metric(Matcher::Full(INTEGRATIONS_LATENCY.to_string()), LATENCY_BUCKETS)?;
    Ok(builder)
}

/// Install the global Prometheus recorder, or return the one already installed.
pub fn init_metrics() -> Result<PrometheusHandle, MetricsError> {
    let mut slot = HANDLE.lock().map_err(|_| MetricsError::Poisoned)?;
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = prometheus_builder()?.install_recorder()?;
    tracing::info!("Prometheus metrics recorder installed");
    *slot = Some(handle.clone());
    Ok(handle)
}

/// Record one finished request.
pub fn record_request(method: &str, endpoint: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    let status_label = status.to_string();

    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "http_status" => status_label.clone()
    )
    .increment(1);

    if status >= 400 {
        counter!(
            HTTP_ERRORS_TOTAL,
            "method" => method.to_string(),
            "endpoint" => endpoint.to_string(),
            "http_status" => status_label
        )
        .increment(1);
    }

    histogram!(
        ROUTES_LATENCY,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .record(elapsed);
}

/// Await `fut`, recording its latency under the given integration name.
pub async fn time_integration<F>(integration: &str, fut: F) -> F::Output
where
    F: Future,
{
    let start = Instant::now();
    let output = fut.await;
    histogram!(INTEGRATIONS_LATENCY, "integration" => integration.to_string())
        .record(start.elapsed().as_secs_f64());
    output
}

/// Count and time every request passing through.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    record_request(&method, &endpoint, response.status().as_u16(), start);
    response
}

/// Prometheus text exposition for the `/metrics` route.
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_counts_errors() {
        let recorder = prometheus_builder().unwrap().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_request("GET", "/orders", 200, Instant::now());
            record_request("GET", "/orders", 200, Instant::now());
        });
        let rendered = handle.render();
        assert!(rendered.contains(HTTP_REQUESTS_TOTAL));
        assert!(rendered.contains(r#"http_status="200""#));
        assert!(!rendered.contains(HTTP_ERRORS_TOTAL));
        assert!(rendered.contains(ROUTES_LATENCY));

        metrics::with_local_recorder(&recorder, || {
            record_request("POST", "/orders", 503, Instant::now());
        });
        let rendered = handle.render();
        assert!(rendered.contains(HTTP_ERRORS_TOTAL));
        assert!(rendered.contains(r#"http_status="503""#));
    }

    #[test]
    fn test_status_threshold() {
        let recorder = prometheus_builder().unwrap().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_request("GET", "/missing", 399, Instant::now());
        });
        assert!(!handle.render().contains(HTTP_ERRORS_TOTAL));

        metrics::with_local_recorder(&recorder, || {
            record_request("GET", "/missing", 404, Instant::now());
        });
        assert!(handle.render().contains(HTTP_ERRORS_TOTAL));
    }

    #[test]
    fn test_latency_buckets_rendered() {
        let recorder = prometheus_builder().unwrap().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_request("GET", "/orders", 200, Instant::now());
        });
        let rendered = handle.render();
        assert!(rendered.contains("routes_latency_seconds_bucket"));
        assert!(rendered.contains(r#"le="7.5""#));
    }
}
