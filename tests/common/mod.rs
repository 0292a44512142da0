//! Shared utilities for integration tests.

use std::io;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory sink for JSON log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

pub struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter(self.0.clone())
    }
}

#[allow(dead_code)]
impl LogBuffer {
    /// Every captured event, one JSON object per line.
    pub fn events(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    /// Events whose message equals `message`.
    pub fn with_message(&self, message: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e["fields"]["message"] == message)
            .collect()
    }

    /// Events at the given level ("INFO", "ERROR", ...).
    pub fn at_level(&self, level: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e["level"] == level)
            .collect()
    }

    /// Raw captured text.
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Route this thread's events into a fresh buffer until the guard drops.
#[allow(dead_code)]
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(buffer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

/// A field logged with `%` holding JSON text, parsed back into a value.
#[allow(dead_code)]
pub fn json_field(event: &Value, name: &str) -> Value {
    let raw = event["fields"][name]
        .as_str()
        .unwrap_or_else(|| panic!("field {name} missing or not a string in {event}"));
    serde_json::from_str(raw).unwrap()
}

/// W3C traceparent for a test trace id.
#[allow(dead_code)]
pub fn traceparent(trace_id: u128, span_id: u64) -> String {
    format!("00-{:032x}-{:016x}-01", trace_id, span_id)
}
