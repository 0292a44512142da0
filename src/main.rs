//! Demo server for the HTTP observer.
//!
//! ```text
//!  client ──▶ timeout ──▶ trace context ──▶ logging interceptor ──▶ metrics ──▶ /orders
//!                                                                    
//!  /health, /metrics ──▶ served directly
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::Query,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use http_observer::config::{load_config, ObserverConfig};
use http_observer::lifecycle::{wait_for_signal, Shutdown};
use http_observer::observability::{logging, metrics::time_integration};
use http_observer::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "http-observer", version, about = "Demo server with request observability")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the configuration.
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderQuery {
    id: Option<u64>,
}

async fn get_order(Query(query): Query<OrderQuery>) -> Result<Json<Value>, StatusCode> {
    let id = query.id.ok_or(StatusCode::BAD_REQUEST)?;
    tracing::info!(order_id = id, "Looking up order");

    let stock = time_integration("inventory", async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        42
    })
    .await;

    Ok(Json(json!({ "id": id, "status": "pending", "stock": stock })))
}

async fn create_order(Json(order): Json<Value>) -> (StatusCode, Json<Value>) {
    tracing::info!("Order accepted");
    let amount = order.get("amount").cloned().unwrap_or(Value::Null);
    (StatusCode::CREATED, Json(json!({ "accepted": true, "amount": amount })))
}

fn demo_router() -> Router {
    Router::new().route("/orders", get(get_order).post(create_order))
}

fn demo_config() -> ObserverConfig {
    let mut config = ObserverConfig::new("http-observer-demo");
    config.sensitive_headers = Some(vec!["authorization".into(), "cookie".into()]);
    config.sensitive_body_fields = Some(vec!["card_number".into(), "password".into()]);
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => demo_config(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::initialize(&config.logging);

    tracing::info!(
        service = %config.service_name,
        bind_address = %config.server.bind_address,
        metrics_enabled = config.metrics.enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config, demo_router());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
