//! HTTP observability middleware for axum.
//!
//! Redacting request logging, request metrics and trace-context propagation,
//! attached to an application router in one call:
//!
//! ```rust,ignore
//! let config = http_observer::config::load_config(path)?;
//! http_observer::observability::logging::initialize(&config.logging);
//! let app = http_observer::Observer::new(&config).attach(app);
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod redaction;

pub use config::schema::ObserverConfig;
pub use http::{HttpServer, Observer};
pub use lifecycle::Shutdown;
pub use redaction::RedactionConfig;
