//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the observer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the HTTP observer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Service name, used to name the tracing resource.
    pub service_name: String,

    /// Header names whose values are replaced before logging (case-insensitive).
    pub sensitive_headers: Option<Vec<String>>,

    /// Top-level JSON body fields whose values are replaced before logging.
    pub sensitive_body_fields: Option<Vec<String>>,

    /// Largest request body the interceptor buffers for logging.
    pub max_body_bytes: usize,

    /// Paths containing any of these substrings get no trace span.
    pub trace_excluded_paths: Vec<String>,

    /// Logging backend settings.
    pub logging: LoggingConfig,

    /// Host server settings.
    pub server: ServerConfig,

    /// Metrics settings.
    pub metrics: MetricsConfig,
}

impl ObserverConfig {
    /// Minimal configuration for a named service.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            sensitive_headers: None,
            sensitive_body_fields: None,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            trace_excluded_paths: vec!["health".to_string()],
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Logging backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub level: String,

    /// Machine-readable JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

/// Host server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `/metrics`.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
