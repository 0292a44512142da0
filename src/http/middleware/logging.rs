//! Redacting request logging interceptor.
//!
//! Per request, in order:
//! 1. open a request span carrying `trace_id`/`span_id` when a real server
//!    span is active
//! 2. log the request line (path, method, query parameters)
//! 3. log the headers after redaction
//! 4. buffer the body, log it after redaction, hand the bytes on
//! 5. run the continuation and return its response untouched
//!
//! Everything the continuation logs is emitted inside the same request span,
//! so concurrent requests never share trace fields. Dropping the returned
//! future (client abort, host timeout) stops all further work.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header::CONTENT_LENGTH, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::observability::tracing::current_span;
use crate::redaction::{RedactedBody, RedactionConfig};

/// Intercept one request: log a redacted view of it, then run `continuation`.
pub async fn intercept<F, Fut>(config: &RedactionConfig, req: Request<Body>, continuation: F) -> Response
where
    F: FnOnce(Request<Body>) -> Fut,
    Fut: Future<Output = Response>,
{
    let span = request_span(&req);

    async move {
        log_request_line(&req);

        let headers = json_object(config.redact_headers(req.headers()));
        tracing::info!(headers = %headers, "Processed request headers");

        let req = match buffer_body(config, req).await {
            Ok(req) => req,
            Err(response) => return response,
        };

        continuation(req).await
    }
    .instrument(span)
    .await
}

/// axum adapter: `middleware::from_fn_with_state(config, logging_middleware)`.
pub async fn logging_middleware(
    State(config): State<Arc<RedactionConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    intercept(&config, req, |req| next.run(req)).await
}

fn request_span<B>(req: &Request<B>) -> tracing::Span {
    match current_span(req) {
        Some(ctx) => tracing::info_span!(
            "http_request",
            trace_id = %ctx.trace_id,
            span_id = %ctx.span_id
        ),
        None => tracing::info_span!("http_request"),
    }
}

/// Query parameters as a flat map; the last value of a repeated key wins.
fn query_params<B>(req: &Request<B>) -> BTreeMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// String pairs as a JSON object, for `%` formatting in log events.
fn json_object(pairs: BTreeMap<String, String>) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect::<Map<String, Value>>(),
    )
}

fn log_request_line<B>(req: &Request<B>) {
    let params = json_object(query_params(req));

    tracing::info!(
        path = %req.uri().path(),
        method = %req.method(),
        query_params = %params,
        "Incoming HTTP request"
    );
}

fn log_body(body: RedactedBody) {
    let body = Value::Object(body);
    tracing::info!(body = %body, "Processed request body");
}

/// Body too large to log: record `{}` and hand the body on as is.
fn log_skipped_body(limit: usize, body_bytes: u64) {
    tracing::warn!(
        body_bytes,
        limit,
        "Request body too large to log, passing through"
    );
    log_body(RedactedBody::new());
}

/// Read the body up to the logging limit, log its redacted form and rebuild
/// the request.
///
/// A body that outgrows the limit is forwarded as the bytes already read
/// followed by the unread remainder. Only a transport error while reading
/// ends the request early, since the handler can no longer get the body.
async fn buffer_body(config: &RedactionConfig, req: Request<Body>) -> Result<Request<Body>, Response> {
    let (parts, body) = req.into_parts();
    let limit = config.max_body_bytes;

    let declared = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if let Some(len) = declared {
        if len > limit as u64 {
            log_skipped_body(limit, len);
            return Ok(Request::from_parts(parts, body));
        }
    }

    let mut stream = body.into_data_stream();
    let mut chunks: Vec<Bytes> = Vec::new();
    let mut received = 0usize;

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(chunk) => {
                received += chunk.len();
                chunks.push(chunk);

                if received > limit {
                    log_skipped_body(limit, received as u64);
                    let read = futures_util::stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>));
                    let body = Body::from_stream(read.chain(stream));
                    return Ok(Request::from_parts(parts, body));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, received, "Failed to read request body");
                return Err((StatusCode::BAD_REQUEST, "Failed to read request body").into_response());
            }
        }
    }

    let bytes = Bytes::from(chunks.concat());
    log_body(config.redact_body(&bytes));
    Ok(Request::from_parts(parts, Body::from(bytes)))
}
