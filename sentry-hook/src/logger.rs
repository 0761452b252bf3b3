use std::sync::Arc;

use log::kv::{self, VisitSource};
use sentry_core::protocol::Value;
use sentry_core::Level;

use crate::hook::Hook;
use crate::record::{CapturedError, FieldValue, Record};

/// Converts a [`log::Level`] to a Sentry [`Level`].
pub fn convert_log_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

struct FieldVisitor<'r> {
    record: &'r mut Record,
}

impl<'kvs> VisitSource<'kvs> for FieldVisitor<'_> {
    fn visit_pair(
        &mut self,
        key: kv::Key<'kvs>,
        value: kv::Value<'kvs>,
    ) -> Result<(), kv::Error> {
        self.record.insert(key.as_str(), field_from_kv(&value));
        Ok(())
    }
}

fn field_from_kv(value: &kv::Value<'_>) -> FieldValue {
    if let Some(error) = value.to_borrowed_error() {
        return FieldValue::Error(Arc::new(CapturedError::new(error)));
    }
    if let Some(value) = value.to_bool() {
        Value::from(value).into()
    } else if let Some(value) = value.to_i64() {
        Value::from(value).into()
    } else if let Some(value) = value.to_u64() {
        Value::from(value).into()
    } else if let Some(value) = value.to_f64() {
        value.into()
    } else if let Some(value) = value.to_borrowed_str() {
        Value::from(value).into()
    } else {
        Value::from(value.to_string()).into()
    }
}

/// Creates a [`Record`] from a given [`log::Record`].
///
/// The formatted arguments become the message, the key-values become
/// fields. Values captured with the `:err` modifier are kept as errors.
pub fn record_from_log(record: &log::Record<'_>) -> Record {
    let mut result = Record::new(convert_log_level(record.level()), record.args().to_string());
    let mut visitor = FieldVisitor {
        record: &mut result,
    };
    let _ = record.key_values().visit(&mut visitor);
    result
}

/// A logger that does nothing, used when [`HookLogger`] has no destination.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl log::Log for NoopLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _: &log::Record<'_>) {}

    fn flush(&self) {}
}

/// Provides a dispatching logger that fires the [`Hook`] for `log` records.
///
/// Records are passed on to an optional destination logger afterwards.
///
/// # Examples
///
/// ```
/// use sentry_core::Level;
///
/// let mut hook = sentry_hook::Hook::with_current_hub();
/// hook.set_sync([Level::Error]).unwrap();
///
/// let logger = sentry_hook::HookLogger::new(hook)
///     .with_dest(pretty_env_logger::formatted_builder().build());
///
/// log::set_boxed_logger(Box::new(logger))
///     .map(|()| log::set_max_level(log::LevelFilter::Info))
///     .unwrap();
///
/// log::error!(worker = "worker1"; "could not reach upstream");
/// ```
#[derive(Debug)]
pub struct HookLogger<L: log::Log = NoopLogger> {
    hook: Hook,
    dest: L,
}

impl HookLogger<NoopLogger> {
    /// Creates a logger without a destination.
    pub fn new(hook: Hook) -> Self {
        Self {
            hook,
            dest: NoopLogger,
        }
    }
}

impl<L: log::Log> HookLogger<L> {
    /// Sets the destination logger.
    #[must_use]
    pub fn with_dest<D: log::Log>(self, dest: D) -> HookLogger<D> {
        HookLogger {
            hook: self.hook,
            dest,
        }
    }

    /// Returns the hook records are fired at.
    pub fn hook(&self) -> &Hook {
        &self.hook
    }
}

impl<L: log::Log> log::Log for HookLogger<L> {
    fn enabled(&self, md: &log::Metadata<'_>) -> bool {
        self.hook.is_enabled(convert_log_level(md.level())) || self.dest.enabled(md)
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.hook.is_enabled(convert_log_level(record.level())) {
            self.hook.fire(&record_from_log(record));
        }
        if self.dest.enabled(record.metadata()) {
            self.dest.log(record);
        }
    }

    fn flush(&self) {
        self.dest.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    #[test]
    fn test_record_from_log() {
        let error = io::Error::new(io::ErrorKind::Other, "disk on fire");
        let kvs: Vec<(&str, kv::Value<'_>)> = vec![
            ("attempt", kv::Value::from(3u64)),
            ("worker", kv::Value::from("worker1")),
            ("ready", kv::Value::from(false)),
            ("error", kv::Value::from_dyn_error(&error)),
        ];
        let record = log::Record::builder()
            .level(log::Level::Warn)
            .args(format_args!("could not write cache"))
            .key_values(&kvs)
            .build();

        let converted = record_from_log(&record);

        assert_eq!(converted.level(), Level::Warning);
        assert_eq!(converted.message(), "could not write cache");
        let tags = converted.tags();
        assert_eq!(tags["attempt"], "3");
        assert_eq!(tags["worker"], "worker1");
        assert_eq!(tags["ready"], "false");
        assert!(!tags.contains_key("error"));
        assert_eq!(
            converted.error().map(|error| error.to_string()).as_deref(),
            Some("disk on fire")
        );
    }

    #[test]
    fn test_record_from_log_non_finite_floats() {
        let kvs: Vec<(&str, kv::Value<'_>)> = vec![
            ("ratio", kv::Value::from(0.5f64)),
            ("nan", kv::Value::from(f64::NAN)),
            ("inf", kv::Value::from(f64::INFINITY)),
        ];
        let record = log::Record::builder()
            .level(log::Level::Error)
            .args(format_args!("bad sample"))
            .key_values(&kvs)
            .build();

        let tags = record_from_log(&record).tags();
        assert_eq!(tags["ratio"], "0.5");
        assert_eq!(tags["nan"], "NaN");
        assert_eq!(tags["inf"], "inf");
    }

    #[test]
    fn test_convert_log_level() {
        assert_eq!(convert_log_level(log::Level::Trace), Level::Debug);
        assert_eq!(convert_log_level(log::Level::Debug), Level::Debug);
        assert_eq!(convert_log_level(log::Level::Info), Level::Info);
        assert_eq!(convert_log_level(log::Level::Warn), Level::Warning);
        assert_eq!(convert_log_level(log::Level::Error), Level::Error);
    }
}
