//! Structured logging bootstrap.
//!
//! # Responsibilities
//! - Install the process-wide `tracing` subscriber exactly once
//! - JSON lines for production, human-readable output for development
//! - Log level from `RUST_LOG`, falling back to configuration
//!
//! Request-scoped fields (`trace_id`, `span_id`) are not set here: they live on
//! the per-request span opened by the logging interceptor, and the formatter
//! merges them into every event emitted inside it.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

static INITIALIZED: OnceLock<bool> = OnceLock::new();

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Returns `true` only for the call that actually installed it. Later calls,
/// or a call made after some other subscriber was set globally, change nothing.
pub fn initialize(config: &LoggingConfig) -> bool {
    let mut installed_now = false;

    INITIALIZED.get_or_init(|| {
        let registry = tracing_subscriber::registry().with(env_filter(&config.level));

        let result = if config.json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true),
                )
                .try_init()
        } else {
            registry.with(fmt::layer().with_target(true)).try_init()
        };

        installed_now = result.is_ok();
        installed_now
    });

    if installed_now {
        tracing::info!(level = %config.level, json = config.json, "Logging initialized");
    }
    installed_now
}

/// Whether [`initialize`] installed the subscriber in this process.
pub fn is_initialized() -> bool {
    INITIALIZED.get().copied().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let config = LoggingConfig::default();
        let first = initialize(&config);
        let second = initialize(&config);

        assert!(!second, "second call must not install another subscriber");
        assert_eq!(is_initialized(), first);
    }
}
