//! Redaction policy subsystem.
//!
//! # Data Flow
//! ```text
//! ObserverConfig.sensitive_headers / sensitive_body_fields
//!     → RedactionConfig (built once, shared via Arc)
//!
//! Per request:
//!     HeaderMap → headers.rs → RedactedHeaders
//!     raw body  → body.rs    → RedactedBody
//! ```
//!
//! # Design Decisions
//! - Pure functions of (input, sensitive set); no hidden state
//! - Key-based and shallow: only header names and top-level body keys are matched
//! - Header names match case-insensitively, body keys match exactly
//! - Inputs are never mutated; a fresh view is always returned

pub mod body;
pub mod headers;

use std::collections::HashSet;

use axum::http::HeaderMap;

use crate::config::ObserverConfig;

pub use body::{redact_body, try_parse_body, BodyError, RedactedBody};
pub use headers::{redact_headers, RedactedHeaders};

/// Value substituted for every redacted header or body field.
pub const REDACTED_MARKER: &str = "hidden";

/// Header names to redact. Stored lowercased; lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitiveHeaders(HashSet<String>);

impl SensitiveHeaders {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(names.into_iter().map(|n| n.as_ref().to_ascii_lowercase()).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Top-level body field names to redact (exact match).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitiveFields(HashSet<String>);

impl SensitiveFields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Immutable redaction settings shared by every request.
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub sensitive_headers: SensitiveHeaders,
    pub sensitive_body_fields: SensitiveFields,
    /// Largest body the interceptor will buffer for logging.
    pub max_body_bytes: usize,
}

impl RedactionConfig {
    pub fn new(sensitive_headers: SensitiveHeaders, sensitive_body_fields: SensitiveFields) -> Self {
        Self {
            sensitive_headers,
            sensitive_body_fields,
            max_body_bytes: ObserverConfig::default().max_body_bytes,
        }
    }

    /// Build from the startup configuration. Absent lists redact nothing.
    pub fn from_config(config: &ObserverConfig) -> Self {
        let headers = config
            .sensitive_headers
            .as_deref()
            .map(SensitiveHeaders::new)
            .unwrap_or_default();
        let fields = config
            .sensitive_body_fields
            .as_deref()
            .map(|f| SensitiveFields::new(f.iter().cloned()))
            .unwrap_or_default();

        Self {
            sensitive_headers: headers,
            sensitive_body_fields: fields,
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn redact_headers(&self, headers: &HeaderMap) -> RedactedHeaders {
        redact_headers(headers, &self.sensitive_headers)
    }

    pub fn redact_body(&self, raw: &[u8]) -> RedactedBody {
        redact_body(raw, &self.sensitive_body_fields)
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self::new(SensitiveHeaders::default(), SensitiveFields::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_headers_case_insensitive() {
        let set = SensitiveHeaders::new(["Authorization", "X-API-KEY"]);
        assert!(set.contains("authorization"));
        assert!(set.contains("AUTHORIZATION"));
        assert!(set.contains("x-api-key"));
        assert!(!set.contains("cookie"));
    }

    #[test]
    fn test_sensitive_fields_exact() {
        let set = SensitiveFields::new(["password"]);
        assert!(set.contains("password"));
        assert!(!set.contains("Password"));
    }

    #[test]
    fn test_from_config_absent_lists() {
        let config = ObserverConfig::new("svc");
        let redaction = RedactionConfig::from_config(&config);
        assert!(redaction.sensitive_headers.is_empty());
        assert!(redaction.sensitive_body_fields.is_empty());
        assert_eq!(redaction.max_body_bytes, config.max_body_bytes);
    }

    #[test]
    fn test_from_config_lists() {
        let mut config = ObserverConfig::new("svc");
        config.sensitive_headers = Some(vec!["Authorization".into()]);
        config.sensitive_body_fields = Some(vec!["card_number".into()]);
        config.max_body_bytes = 64;

        let redaction = RedactionConfig::from_config(&config);
        assert!(redaction.sensitive_headers.contains("authorization"));
        assert!(redaction.sensitive_body_fields.contains("card_number"));
        assert_eq!(redaction.max_body_bytes, 64);
    }
}
