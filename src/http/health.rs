//! Liveness endpoint.

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}

pub async fn get_health() -> Json<HealthCheck> {
    Json(HealthCheck::default())
}

/// `GET /health`, mounted outside the observer layers.
pub fn health_router() -> Router {
    Router::new().route("/health", get(get_health))
}
