//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check the bind address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ObserverConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ObserverConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ObserverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service_name.trim().is_empty() {
        errors.push(ValidationError::new("service_name", "must not be empty"));
    }

    if config.max_body_bytes == 0 {
        errors.push(ValidationError::new("max_body_bytes", "must be greater than zero"));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }

    let blank = |names: &Option<Vec<String>>| {
        names
            .as_ref()
            .map(|n| n.iter().any(|s| s.trim().is_empty()))
            .unwrap_or(false)
    };
    if blank(&config.sensitive_headers) {
        errors.push(ValidationError::new("sensitive_headers", "contains an empty name"));
    }
    if blank(&config.sensitive_body_fields) {
        errors.push(ValidationError::new("sensitive_body_fields", "contains an empty name"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = ObserverConfig::new("orders");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ObserverConfig::default();
        config.max_body_bytes = 0;
        config.server.bind_address = "not-an-address".into();
        config.sensitive_headers = Some(vec!["".into()]);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "service_name",
                "max_body_bytes",
                "server.bind_address",
                "sensitive_headers"
            ]
        );
    }
}
