//! Header redaction.

use std::collections::BTreeMap;

use axum::http::HeaderMap;

use super::{SensitiveHeaders, REDACTED_MARKER};

/// Header name → value, safe to log.
pub type RedactedHeaders = BTreeMap<String, String>;

/// Copy `headers` into a loggable map, replacing sensitive values.
///
/// Every input header appears exactly once in the output. Repeated headers are
/// joined with `", "`; values that are not valid UTF-8 are decoded lossily.
pub fn redact_headers(headers: &HeaderMap, sensitive: &SensitiveHeaders) -> RedactedHeaders {
    let mut out = RedactedHeaders::new();

    for name in headers.keys() {
        let key = name.as_str().to_string();
        let value = if sensitive.contains(&key) {
            REDACTED_MARKER.to_string()
        } else {
            headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.insert(key, value);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use proptest::prelude::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn test_redacts_matching_header() {
        let input = headers(&[("authorization", "Bearer abc"), ("accept", "*/*")]);
        let out = redact_headers(&input, &SensitiveHeaders::new(["Authorization"]));

        assert_eq!(out.len(), 2);
        assert_eq!(out["authorization"], "hidden");
        assert_eq!(out["accept"], "*/*");
    }

    #[test]
    fn test_empty_policy_is_identity() {
        let input = headers(&[("authorization", "Bearer abc"), ("host", "example.com")]);
        let out = redact_headers(&input, &SensitiveHeaders::default());

        assert_eq!(out["authorization"], "Bearer abc");
        assert_eq!(out["host"], "example.com");
    }

    #[test]
    fn test_repeated_header_joined() {
        let input = headers(&[("accept", "text/html"), ("accept", "application/json")]);
        let out = redact_headers(&input, &SensitiveHeaders::default());
        assert_eq!(out["accept"], "text/html, application/json");
    }

    #[test]
    fn test_repeated_sensitive_header_single_marker() {
        let input = headers(&[("cookie", "a=1"), ("cookie", "b=2")]);
        let out = redact_headers(&input, &SensitiveHeaders::new(["COOKIE"]));
        assert_eq!(out["cookie"], "hidden");
    }

    #[test]
    fn test_input_untouched() {
        let input = headers(&[("authorization", "Bearer abc")]);
        let _ = redact_headers(&input, &SensitiveHeaders::new(["authorization"]));
        assert_eq!(input["authorization"], "Bearer abc");
    }

    proptest! {
        #[test]
        fn proptest_same_keys_and_marker_only_on_sensitive(
            pairs in prop::collection::vec(
                ("[a-z][a-z0-9-]{0,12}", "[a-zA-Z0-9]{0,20}"),
                0..12,
            ),
            sensitive in prop::collection::vec("[a-zA-Z][a-zA-Z0-9-]{0,12}", 0..4),
        ) {
            let mut input = HeaderMap::new();
            for (k, v) in &pairs {
                input.insert(
                    axum::http::HeaderName::from_bytes(k.as_bytes()).unwrap(),
                    HeaderValue::from_str(v).unwrap(),
                );
            }
            let policy = SensitiveHeaders::new(&sensitive);
            let out = redact_headers(&input, &policy);

            prop_assert_eq!(out.len(), input.keys_len());
            for (name, value) in input.iter() {
                let expected = if sensitive.iter().any(|s| s.eq_ignore_ascii_case(name.as_str())) {
                    "hidden".to_string()
                } else {
                    value.to_str().unwrap().to_string()
                };
                prop_assert_eq!(&out[name.as_str()], &expected);
            }

            let identity = redact_headers(&input, &SensitiveHeaders::default());
            for (name, value) in input.iter() {
                prop_assert_eq!(identity[name.as_str()].as_str(), value.to_str().unwrap());
            }
        }
    }
}
