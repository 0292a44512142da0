//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Attach the observer to the application router
//! - Install the metrics recorder when enabled
//! - Wire up host-level middleware (request timeout)
//! - Bind server to listener and shut down gracefully

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::config::ObserverConfig;
use crate::http::observer::Observer;
use crate::observability::metrics;

/// HTTP server hosting an observed application.
pub struct HttpServer {
    router: Router,
    config: ObserverConfig,
}

impl HttpServer {
    /// Create a new HTTP server for `app` with the given configuration.
    pub fn new(config: ObserverConfig, app: Router) -> Self {
        let mut observer = Observer::new(&config);

        if config.metrics.enabled {
            match metrics::init_metrics() {
                Ok(handle) => observer = observer.with_metrics(handle),
                Err(e) => tracing::error!(error = %e, "Metrics disabled, recorder install failed"),
            }
        }

        let router = Self::build_router(&config, &observer, app);
        Self { router, config }
    }

    /// Build the router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ObserverConfig, observer: &Observer, app: Router) -> Router {
        observer
            .attach(app)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.service_name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
