//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests (W3C `traceparent`)
//! - Start a server span per request, continuing the caller's trace if any
//! - Expose "the current active span, if any" to other middleware
//!
//! # Design Decisions
//! - The active span lives in request extensions, never in a global
//! - Paths matching an exclusion (default `health`) get no span at all
//! - An all-zero id is a placeholder and is never reported as active

use std::fmt;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// W3C Trace Context header.
pub const TRACEPARENT: &str = "traceparent";

const TRACE_FLAG_SAMPLED: u8 = 0x01;

/// 128-bit trace identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

/// 64-bit span identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl TraceId {
    pub const INVALID: TraceId = TraceId(0);

    pub fn from_u128(id: u128) -> Self {
        Self(id)
    }

    fn random() -> Self {
        loop {
            let id = rand::random::<u128>();
            if id != 0 {
                return Self(id);
            }
        }
    }
}

impl SpanId {
    pub const INVALID: SpanId = SpanId(0);

    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }

    fn random() -> Self {
        loop {
            let id = rand::random::<u64>();
            if id != 0 {
                return Self(id);
            }
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Identifiers of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanContext {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub parent_span_id: Option<SpanId>,
    pub sampled: bool,
}

impl SpanContext {
    /// The placeholder context: no trace is active.
    pub const INVALID: SpanContext = SpanContext {
        trace_id: TraceId::INVALID,
        span_id: SpanId::INVALID,
        parent_span_id: None,
        sampled: false,
    };

    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            trace_id,
            span_id,
            parent_span_id: None,
            sampled: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }

    pub fn trace_id_hex(&self) -> String {
        self.trace_id.to_string()
    }

    pub fn span_id_hex(&self) -> String {
        self.span_id.to_string()
    }

    /// Parse `version-traceid-parentid-flags`. Returns the caller's context.
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        // Version 00 has exactly four fields; later versions may append more.
        if !is_lower_hex(version, 2) || version == "ff" {
            return None;
        }
        if version == "00" && parts.next().is_some() {
            return None;
        }
        if !is_lower_hex(trace_id, 32) || !is_lower_hex(span_id, 16) || !is_lower_hex(flags, 2) {
            return None;
        }

        let ctx = SpanContext {
            trace_id: TraceId(u128::from_str_radix(trace_id, 16).ok()?),
            span_id: SpanId(u64::from_str_radix(span_id, 16).ok()?),
            parent_span_id: None,
            sampled: u8::from_str_radix(flags, 16).ok()? & TRACE_FLAG_SAMPLED != 0,
        };

        ctx.is_valid().then_some(ctx)
    }

    pub fn to_traceparent(&self) -> String {
        let flags = if self.sampled { TRACE_FLAG_SAMPLED } else { 0 };
        format!("00-{}-{}-{:02x}", self.trace_id, self.span_id, flags)
    }

    /// A child of this context: same trace, fresh span id.
    fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: SpanId::random(),
            parent_span_id: Some(self.span_id),
            sampled: self.sampled,
        }
    }
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// The server span of the request being handled, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSpan(pub SpanContext);

/// Starts one server span per request.
#[derive(Debug, Clone)]
pub struct Tracer {
    service_name: Arc<str>,
    excluded_paths: Vec<String>,
}

impl Tracer {
    pub fn new(service_name: impl Into<String>, excluded_paths: Vec<String>) -> Self {
        Self {
            service_name: service_name.into().into(),
            excluded_paths,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|p| !p.is_empty() && path.contains(p.as_str()))
    }

    /// Start the server span for a request, or `None` for excluded paths.
    pub fn start_span(&self, headers: &HeaderMap, path: &str) -> Option<ActiveSpan> {
        if self.is_excluded(path) {
            return None;
        }

        let incoming = headers
            .get(TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .and_then(SpanContext::from_traceparent);

        let ctx = match incoming {
            Some(parent) => parent.child(),
            None => SpanContext::new(TraceId::random(), SpanId::random()),
        };

        Some(ActiveSpan(ctx))
    }
}

/// The current active span of a request, if a real one exists.
pub fn current_span<B>(req: &Request<B>) -> Option<&SpanContext> {
    req.extensions()
        .get::<ActiveSpan>()
        .map(|s| &s.0)
        .filter(|ctx| ctx.is_valid())
}

/// Attach an [`ActiveSpan`] to each request and echo it as `traceparent`.
pub async fn trace_context_middleware(
    State(tracer): State<Arc<Tracer>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let span = tracer.start_span(req.headers(), req.uri().path());

    let Some(span) = span else {
        return next.run(req).await;
    };

    tracing::debug!(
        service = %tracer.service_name(),
        trace_id = %span.0.trace_id,
        span_id = %span.0.span_id,
        "Server span started"
    );

    req.extensions_mut().insert(span);
    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&span.0.to_traceparent()) {
        response.headers_mut().insert(TRACEPARENT, value);
    }

    response
}
