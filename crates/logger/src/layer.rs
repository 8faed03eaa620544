use std::sync::Arc;

use ctxlog_core::{Level, Metadata};
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::logger::Logger;

/// Forwards `tracing` events to a [`Logger`], so they pick up the ambient
/// request context and the logger's level and output format.
///
/// Events from `ctxlog*` targets are the logger's own diagnostics and are
/// never forwarded.
#[derive(Clone)]
pub struct ContextLayer {
    logger: Arc<Logger>,
}

impl ContextLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// A layer feeding the process-wide logger.
    pub fn global() -> Self {
        Self::new(crate::shared())
    }
}

impl<S> Layer<S> for ContextLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target().starts_with("ctxlog") {
            return;
        }

        let level = map_level(*meta.level());
        let logger = &self.logger;
        if !logger.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let msg = visitor.message.unwrap_or_else(|| meta.name().to_string());
        logger.log(level, &msg, Some(&visitor.fields));
    }
}

fn map_level(level: tracing::Level) -> Level {
    match level {
        tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::ERROR => Level::Error,
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Metadata,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        self.fields.insert_value(field.name(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(rendered);
            return;
        }
        self.put(field, Value::String(rendered));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
            return;
        }
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }
}
