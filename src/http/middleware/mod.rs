//! Request middleware.
//!
//! Trace context and metrics middleware live in `observability`; this module
//! holds the request logging interceptor.

pub mod logging;

pub use logging::{intercept, logging_middleware};
