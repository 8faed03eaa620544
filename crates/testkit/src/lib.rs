use std::net::TcpListener;
use std::sync::Arc;

use ctxlog_context::Context;
use ctxlog_core::{Level, LoggerConfig};
use ctxlog_logger::{Logger, MemorySink};
use serde_json::Value;

/// A fresh logger at `level` writing JSON into the returned sink.
pub fn capture_logger(level: Level) -> (Arc<Logger>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::new(sink.clone()).with_config(LoggerConfig {
        level,
        pretty_print: false,
    });
    (Arc::new(logger), sink)
}

/// Resets the process-wide logger and points it at a memory sink.
///
/// Callers share global state and should run `#[serial]`.
pub fn capture_global() -> Arc<MemorySink> {
    ctxlog_logger::reset_logger();
    let sink = Arc::new(MemorySink::new());
    ctxlog_logger::set_sink(sink.clone());
    sink
}

pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .unwrap_or(0)
}

/// Parses newline-delimited JSON, skipping blank lines.
pub fn parse_json_lines(text: &str) -> Vec<Value> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}

pub fn sample_context(request_id: &str) -> Context {
    Context::new()
        .with("requestId", request_id)
        .with("userId", 1)
}
