use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use ctxlog_context::Context;
use ctxlog_core::{Level, LogRecord, LoggerConfig, Metadata, PartialConfig};

use crate::format;
use crate::sink::{Sink, StdoutSink};

/// Leveled logger writing one line per emitted record.
///
/// The configuration and the sink are each swapped atomically as a whole, so
/// a call always sees one consistent configuration.
pub struct Logger {
    config: ArcSwap<LoggerConfig>,
    sink: ArcSwap<Box<dyn Sink>>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(StdoutSink)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config())
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self {
            config: ArcSwap::from_pointee(LoggerConfig::default()),
            sink: ArcSwap::new(boxed(sink)),
        }
    }

    pub fn with_config(self, config: LoggerConfig) -> Self {
        self.config.store(Arc::new(config));
        self
    }

    pub fn config(&self) -> LoggerConfig {
        **self.config.load()
    }

    /// Applies `partial`. With `replace` the update starts from factory
    /// defaults, otherwise it is merged onto the active configuration.
    pub fn configure(&self, partial: PartialConfig, replace: bool) -> LoggerConfig {
        if replace {
            let next = LoggerConfig::default().merged(&partial);
            self.config.store(Arc::new(next));
            return next;
        }

        let mut next = LoggerConfig::default();
        self.config.rcu(|current| {
            next = current.merged(&partial);
            next
        });
        next
    }

    /// Restores factory defaults. The sink and any installed context are kept.
    pub fn reset(&self) {
        self.config.store(Arc::new(LoggerConfig::default()));
    }

    pub fn set_sink(&self, sink: impl Sink + 'static) {
        self.sink.store(boxed(sink));
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.config.load().level
    }

    /// Emits one record when `level` passes the configured minimum.
    ///
    /// Fields are merged from the ambient context, then `metadata`. The
    /// reserved keys `level`, `time` and `msg` always carry the record's own
    /// values, so metadata entries with those names are dropped.
    pub fn log(&self, level: Level, msg: &str, metadata: Option<&Metadata>) {
        let config = **self.config.load();
        if level < config.level {
            return;
        }

        let ctx = ctxlog_context::current();
        let record = LogRecord::merged(level, msg, ctx.as_ref().map(Context::fields), metadata);
        self.emit(&record, config);
    }

    /// Logs at the level called `level`. Unknown names rank below every
    /// level, so the call is dropped.
    pub fn log_named(&self, level: &str, msg: &str, metadata: Option<&Metadata>) {
        match Level::from_str(level) {
            Ok(level) => self.log(level, msg, metadata),
            Err(_) => tracing::debug!(requested = level, "dropping log call with unknown level"),
        }
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::Debug, msg, None);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::Info, msg, None);
    }

    pub fn warn(&self, msg: &str) {
        self.log(Level::Warn, msg, None);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::Error, msg, None);
    }

    pub fn fatal(&self, msg: &str) {
        self.log(Level::Fatal, msg, None);
    }

    /// Like [`Logger::debug`] with extra fields; see [`Logger::log`] for the
    /// reserved keys.
    pub fn debug_with(&self, msg: &str, metadata: impl Into<Metadata>) {
        self.log(Level::Debug, msg, Some(&metadata.into()));
    }

    pub fn info_with(&self, msg: &str, metadata: impl Into<Metadata>) {
        self.log(Level::Info, msg, Some(&metadata.into()));
    }

    pub fn warn_with(&self, msg: &str, metadata: impl Into<Metadata>) {
        self.log(Level::Warn, msg, Some(&metadata.into()));
    }

    pub fn error_with(&self, msg: &str, metadata: impl Into<Metadata>) {
        self.log(Level::Error, msg, Some(&metadata.into()));
    }

    pub fn fatal_with(&self, msg: &str, metadata: impl Into<Metadata>) {
        self.log(Level::Fatal, msg, Some(&metadata.into()));
    }

    fn emit(&self, record: &LogRecord, config: LoggerConfig) {
        let guard = self.sink.load();
        let sink: &dyn Sink = &***guard;
        let line = if config.pretty_print {
            format::pretty_line(record, sink.supports_color())
        } else {
            format::json_line(record)
        };
        if let Err(e) = sink.write_line(&line) {
            tracing::debug!(error = %e, "dropping log line after sink write failure");
        }
    }
}

fn boxed(sink: impl Sink + 'static) -> Arc<Box<dyn Sink>> {
    let sink: Box<dyn Sink> = Box::new(sink);
    Arc::new(sink)
}
