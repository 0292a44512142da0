//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ObserverConfig (validated, immutable)
//!     → consumed once at startup to build RedactionConfig and Tracer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields except `service_name` have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{LoggingConfig, MetricsConfig, ObserverConfig, ServerConfig};
