use std::error::Error;
use std::sync::Arc;

use sentry_core::protocol::Value;
use sentry_core::Level;
use tracing_core::field::{Field, Visit};
use tracing_core::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::hook::Hook;
use crate::record::{CapturedError, FieldValue, Record};

/// Converts a [`tracing_core::Level`] to a Sentry [`Level`].
pub fn convert_tracing_level(level: &tracing_core::Level) -> Level {
    match level {
        &tracing_core::Level::TRACE | &tracing_core::Level::DEBUG => Level::Debug,
        &tracing_core::Level::INFO => Level::Info,
        &tracing_core::Level::WARN => Level::Warning,
        &tracing_core::Level::ERROR => Level::Error,
    }
}

/// Collects the fields of a [`tracing_core::Event`].
#[derive(Default)]
struct RecordVisitor {
    message: Option<String>,
    fields: Vec<(&'static str, FieldValue)>,
}

impl RecordVisitor {
    fn record<T: Into<Value>>(&mut self, field: &Field, value: T) {
        self.fields.push((field.name(), FieldValue::Value(value.into())));
    }

    fn into_record(self, level: Level) -> Record {
        let mut record = Record::new(level, self.message.unwrap_or_default());
        for (key, value) in self.fields {
            record.insert(key, value);
        }
        record
    }
}

impl Visit for RecordVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.record(field, format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.record(field, value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.push((field.name(), value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        let error = Arc::new(CapturedError::new(value));
        self.fields.push((field.name(), FieldValue::Error(error)));
    }
}

/// Creates a [`Record`] from a given [`tracing_core::Event`].
///
/// The `message` field becomes the message of the record, all other fields
/// are kept as record fields.
pub fn record_from_event(event: &Event<'_>) -> Record {
    let mut visitor = RecordVisitor::default();
    event.record(&mut visitor);
    visitor.into_record(convert_tracing_level(event.metadata().level()))
}

/// Lets the [`Hook`] receive `tracing` events.
///
/// ```
/// use sentry_core::Level;
/// use tracing_subscriber::prelude::*;
///
/// let mut hook = sentry_hook::Hook::with_current_hub();
/// hook.set_async([Level::Error]).unwrap();
///
/// let subscriber = tracing_subscriber::registry().with(hook);
/// tracing::subscriber::with_default(subscriber, || {
///     let error = std::io::Error::new(std::io::ErrorKind::Other, "oh no");
///     tracing::error!(error = &error as &dyn std::error::Error, "my operation failed");
/// });
/// ```
impl<S> Layer<S> for Hook
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.is_enabled(convert_tracing_level(event.metadata().level())) {
            return;
        }
        self.fire(&record_from_event(event));
    }
}
