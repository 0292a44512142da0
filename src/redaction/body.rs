//! Request body redaction.
//!
//! Bodies are parsed as JSON objects. Anything else (bad UTF-8, bad JSON, a
//! JSON array or scalar) is logged once at error level and treated as `{}`.

use serde_json::{Map, Value};
use thiserror::Error;

use super::{SensitiveFields, REDACTED_MARKER};

/// Parsed body with sensitive top-level fields replaced.
pub type RedactedBody = Map<String, Value>;

/// Why a non-empty body could not be used as a JSON object.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("body is JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Parse `raw` as a JSON object. An empty body is an empty object.
pub fn try_parse_body(raw: &[u8]) -> Result<RedactedBody, BodyError> {
    if raw.is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(BodyError::NotAnObject("array")),
        Value::String(_) => Err(BodyError::NotAnObject("string")),
        Value::Number(_) => Err(BodyError::NotAnObject("number")),
        Value::Bool(_) => Err(BodyError::NotAnObject("bool")),
        Value::Null => Err(BodyError::NotAnObject("null")),
    }
}

/// Parse and redact a raw request body. Never fails.
pub fn redact_body(raw: &[u8], sensitive: &SensitiveFields) -> RedactedBody {
    let mut body = match try_parse_body(raw) {
        Ok(body) => body,
        Err(e) => {
            log_decode_failure(&e, raw.len());
            return Map::new();
        }
    };

    if !sensitive.is_empty() {
        for (key, value) in body.iter_mut() {
            if sensitive.contains(key) {
                *value = Value::String(REDACTED_MARKER.to_string());
            }
        }
    }

    body
}

fn log_decode_failure(err: &BodyError, body_len: usize) {
    match err {
        BodyError::Malformed(source) => {
            let category = match source.classify() {
                serde_json::error::Category::Io => "io",
                serde_json::error::Category::Syntax => "syntax",
                serde_json::error::Category::Data => "data",
                serde_json::error::Category::Eof => "eof",
            };
            tracing::error!(
                error = %err,
                category,
                line = source.line(),
                column = source.column(),
                body_len,
                "Failed to decode JSON body"
            );
        }
        BodyError::NotAnObject(kind) => {
            tracing::error!(
                error = %err,
                category = "data",
                json_type = *kind,
                body_len,
                "Failed to decode JSON body"
            );
        }
    }
}
