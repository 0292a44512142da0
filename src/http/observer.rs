//! One-call wiring of logging, metrics and trace context onto a router.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ObserverConfig;
use crate::http::health::health_router;
use crate::http::middleware::logging_middleware;
use crate::observability::metrics::{metrics_handler, metrics_middleware};
use crate::observability::tracing::{trace_context_middleware, Tracer};
use crate::redaction::RedactionConfig;

/// Observability wiring for an application router.
#[derive(Clone)]
pub struct Observer {
    redaction: Arc<RedactionConfig>,
    tracer: Arc<Tracer>,
    metrics: Option<PrometheusHandle>,
}

impl Observer {
    pub fn new(config: &ObserverConfig) -> Self {
        Self {
            redaction: Arc::new(RedactionConfig::from_config(config)),
            tracer: Arc::new(Tracer::new(
                config.service_name.clone(),
                config.trace_excluded_paths.clone(),
            )),
            metrics: None,
        }
    }

    /// Serve `/metrics` from this recorder handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Wrap `app` and add the `/health` and `/metrics` routes.
    ///
    /// Layer order, outermost first: trace context, logging interceptor,
    /// metrics. The two added routes sit outside all three; every other
    /// request, unmatched paths included, falls through to the layered `app`.
    pub fn attach(&self, app: Router) -> Router {
        let instrumented = app
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn_with_state(
                self.redaction.clone(),
                logging_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.tracer.clone(),
                trace_context_middleware,
            ));

        let mut router = health_router();

        if let Some(handle) = &self.metrics {
            router = router.route("/metrics", get(metrics_handler).with_state(handle.clone()));
        }

        router.fallback_service(instrumented)
    }
}
