//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, request timeout)
//!     → observer.rs layers:
//!         trace context → middleware/logging.rs → metrics
//!     → application handler
//!
//! /health and /metrics bypass the observer layers.
//! ```

pub mod health;
pub mod middleware;
pub mod observer;
pub mod server;

pub use observer::Observer;
pub use server::HttpServer;
