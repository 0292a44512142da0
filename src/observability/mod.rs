//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Process start:
//!     → logging.rs (install subscriber once: JSON or pretty)
//!     → metrics.rs (install Prometheus recorder once)
//!
//! Per request:
//!     → tracing.rs (server span: continue traceparent or start a trace)
//!     → http::middleware::logging (request span carries trace_id/span_id)
//!     → metrics.rs (counters, latency histograms)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`; output encoding belongs to the subscriber
//! - Trace identifiers flow through request extensions and request spans only
//! - Metrics are cheap (atomic increments) and no-ops without a recorder

pub mod logging;
pub mod metrics;
pub mod tracing;
