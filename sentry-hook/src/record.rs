use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use sentry_core::protocol::{Map, Value};
use sentry_core::Level;

/// The field that holds the error attached to a log event.
pub const ERROR_KEY: &str = "error";

/// A thread-safe, shareable error attached to a [`Record`].
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// The tags that are sent along with every captured event.
pub type Tags = Map<String, String>;

/// An owned snapshot of an error that was only borrowed by the logging facility.
///
/// Both `tracing` and `log` hand out errors for the duration of a callback,
/// so the display text, the debug text and the whole `source()` chain are
/// copied out. The debug text is kept verbatim because Sentry derives the
/// exception type from it.
pub struct CapturedError {
    display: String,
    debug: String,
    source: Option<Box<CapturedError>>,
}

impl CapturedError {
    /// Snapshots the given error and all of its sources.
    pub fn new(error: &(dyn Error + 'static)) -> Self {
        Self {
            display: error.to_string(),
            debug: format!("{error:?}"),
            source: error.source().map(|source| Box::new(Self::new(source))),
        }
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl fmt::Debug for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug)
    }
}

impl Error for CapturedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|source| source as &(dyn Error + 'static))
    }
}

/// The value of a single [`Record`] field.
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// A structured value.
    Value(Value),
    /// An error value.
    Error(SharedError),
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

/// JSON has no NaN or infinity, so non-finite floats are kept as text.
impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            FieldValue::Value(Value::from(value))
        } else {
            FieldValue::Value(Value::String(value.to_string()))
        }
    }
}

impl From<SharedError> for FieldValue {
    fn from(error: SharedError) -> Self {
        FieldValue::Error(error)
    }
}

/// Renders the value the way it shows up as a tag.
///
/// Strings are written as-is, other structured values in their compact
/// JSON form and errors through their `Display` implementation.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Value(Value::String(value)) => f.write_str(value),
            FieldValue::Value(value) => write!(f, "{value}"),
            FieldValue::Error(error) => write!(f, "{error}"),
        }
    }
}

/// A single log event as seen by the [`Hook`](crate::Hook).
///
/// # Examples
///
/// ```
/// use sentry_core::Level;
/// use sentry_hook::Record;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
/// let record = Record::new(Level::Error, "could not write cache")
///     .with_field("attempt", 3)
///     .with_error(error);
///
/// assert_eq!(record.tags()["attempt"], "3");
/// assert!(record.error().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct Record {
    level: Level,
    message: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates a record without any fields.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a structured field.
    #[must_use]
    pub fn with_field(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_field_value(key, FieldValue::Value(value.into()))
    }

    /// Attaches an error under [`ERROR_KEY`].
    #[must_use]
    pub fn with_error<E>(self, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.with_field_value(ERROR_KEY, FieldValue::Error(Arc::new(error)))
    }

    /// Adds a field with an arbitrary [`FieldValue`].
    #[must_use]
    pub fn with_field_value(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a field in place.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// The severity of the event.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// All fields, including the attached error.
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Returns the attached error.
    ///
    /// This is `None` both when there is no [`ERROR_KEY`] field and when that
    /// field holds something other than an error.
    pub fn error(&self) -> Option<&SharedError> {
        match self.fields.get(ERROR_KEY) {
            Some(FieldValue::Error(error)) => Some(error),
            _ => None,
        }
    }

    /// Derives the tags for this record, see [`make_tags`].
    pub fn tags(&self) -> Tags {
        make_tags(&self.fields)
    }
}

/// Converts record fields to tags.
///
/// Every field except [`ERROR_KEY`] becomes a tag, whatever the type of the
/// error field's value.
pub fn make_tags(fields: &BTreeMap<String, FieldValue>) -> Tags {
    fields
        .iter()
        .filter(|(key, _)| key.as_str() != ERROR_KEY)
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}
