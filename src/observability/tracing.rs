//! Bridge from `tracing` events to the request log format.
//!
//! Each event becomes one line rendered exactly like a [`Logger`] call: the
//! `message` field is the message, every other field is appended to the
//! layer's tags, and the ambient request context decides the shape.

use std::fmt;

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::format::{Level, Metadata};
use crate::logger::Logger;

/// `tracing_subscriber` layer that writes events through a [`Logger`].
#[derive(Debug, Clone, Default)]
pub struct RequestLogLayer {
    logger: Logger,
}

impl RequestLogLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `logger`'s tags and sink.
    pub fn with_logger(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S: Subscriber> Layer<S> for RequestLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level = Level::from(event.metadata().level());
        let message = visitor.message.unwrap_or_default();
        if visitor.fields.is_empty() {
            self.logger.log(level, &[&message]);
        } else {
            self.logger.child(visitor.fields).log(level, &[&message]);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Metadata,
}

impl EventVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name(), value);
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
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

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::from(format!("{:?}", value)));
    }
}
