//! Structured logger with ambient request context.
//!
//! Every emitted record merges, in increasing priority, the context installed
//! with [`ctxlog_context::run`], the call-site metadata and the reserved
//! `level`/`time`/`msg` keys. The free functions below drive one process-wide
//! [`Logger`] writing to stdout.

use std::sync::{Arc, LazyLock};

use ctxlog_core::{Level, LoggerConfig, Metadata, PartialConfig};

pub mod format;
pub mod layer;
pub mod logger;
pub mod sink;

pub use ctxlog_context::{Context, current, run, run_sync};
pub use layer::ContextLayer;
pub use logger::Logger;
pub use sink::{MemorySink, Sink, StderrSink, StdoutSink};

static GLOBAL: LazyLock<Arc<Logger>> = LazyLock::new(|| Arc::new(Logger::default()));

pub fn global() -> &'static Logger {
    &GLOBAL
}

/// The process-wide logger as a shareable handle.
pub fn shared() -> Arc<Logger> {
    Arc::clone(&*GLOBAL)
}

pub fn configure_logger(partial: PartialConfig, replace: bool) -> LoggerConfig {
    GLOBAL.configure(partial, replace)
}

/// Restores factory defaults and discards context left installed on the
/// calling thread outside any active [`run`]/[`run_sync`] scope.
pub fn reset_logger() {
    GLOBAL.reset();
    ctxlog_context::clear();
}

pub fn config() -> LoggerConfig {
    GLOBAL.config()
}

pub fn set_sink(sink: impl Sink + 'static) {
    GLOBAL.set_sink(sink);
}

pub fn enabled(level: Level) -> bool {
    GLOBAL.enabled(level)
}

pub fn log(level: Level, msg: &str, metadata: Option<&Metadata>) {
    GLOBAL.log(level, msg, metadata);
}

pub fn log_named(level: &str, msg: &str, metadata: Option<&Metadata>) {
    GLOBAL.log_named(level, msg, metadata);
}

pub fn debug(msg: &str) {
    GLOBAL.debug(msg);
}

pub fn info(msg: &str) {
    GLOBAL.info(msg);
}

pub fn warn(msg: &str) {
    GLOBAL.warn(msg);
}

pub fn error(msg: &str) {
    GLOBAL.error(msg);
}

pub fn fatal(msg: &str) {
    GLOBAL.fatal(msg);
}

pub fn debug_with(msg: &str, metadata: impl Into<Metadata>) {
    GLOBAL.debug_with(msg, metadata);
}

pub fn info_with(msg: &str, metadata: impl Into<Metadata>) {
    GLOBAL.info_with(msg, metadata);
}

pub fn warn_with(msg: &str, metadata: impl Into<Metadata>) {
    GLOBAL.warn_with(msg, metadata);
}

pub fn error_with(msg: &str, metadata: impl Into<Metadata>) {
    GLOBAL.error_with(msg, metadata);
}

pub fn fatal_with(msg: &str, metadata: impl Into<Metadata>) {
    GLOBAL.fatal_with(msg, metadata);
}
