use std::sync::Arc;
use std::time::Duration;

use sentry_core::protocol::Event;
use sentry_core::types::Uuid;
use sentry_core::{Hub, Level};

use crate::record::{SharedError, Tags};

/// The reporting client a [`Hook`](crate::Hook) forwards events to.
///
/// The plain methods must not block: they hand the event off and return,
/// leaving delivery to whatever background machinery the implementation
/// has. The `_and_wait` methods return only once the event was delivered.
/// All methods return the id of the captured event.
pub trait Sender: Send + Sync {
    /// Captures a message without waiting for delivery.
    fn capture_message(&self, message: &str, level: Level, tags: Tags) -> Uuid;

    /// Captures an error without waiting for delivery.
    ///
    /// `message` is the message of the log event the error was attached to.
    fn capture_error(&self, error: SharedError, level: Level, tags: Tags, message: &str) -> Uuid;

    /// Captures a message and blocks until it was delivered.
    fn capture_message_and_wait(&self, message: &str, level: Level, tags: Tags) -> Uuid;

    /// Captures an error and blocks until it was delivered.
    fn capture_error_and_wait(
        &self,
        error: SharedError,
        level: Level,
        tags: Tags,
        message: &str,
    ) -> Uuid;
}

impl<T: Sender + ?Sized> Sender for Arc<T> {
    fn capture_message(&self, message: &str, level: Level, tags: Tags) -> Uuid {
        (**self).capture_message(message, level, tags)
    }

    fn capture_error(&self, error: SharedError, level: Level, tags: Tags, message: &str) -> Uuid {
        (**self).capture_error(error, level, tags, message)
    }

    fn capture_message_and_wait(&self, message: &str, level: Level, tags: Tags) -> Uuid {
        (**self).capture_message_and_wait(message, level, tags)
    }

    fn capture_error_and_wait(
        &self,
        error: SharedError,
        level: Level,
        tags: Tags,
        message: &str,
    ) -> Uuid {
        (**self).capture_error_and_wait(error, level, tags, message)
    }
}

/// A [`Sender`] that captures events on a Sentry [`Hub`].
///
/// Captured events are queued on the client's transport, which sends them
/// from its own worker, so the non-waiting methods return right away. The
/// waiting methods flush the client afterwards.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// let sender = sentry_hook::HubSender::current().flush_timeout(Duration::from_secs(2));
/// let hook = sentry_hook::Hook::new(sender);
/// ```
#[derive(Clone, Default)]
pub struct HubSender {
    hub: Option<Arc<Hub>>,
    flush_timeout: Option<Duration>,
}

impl HubSender {
    /// Creates a sender bound to the given hub.
    pub fn new(hub: Arc<Hub>) -> Self {
        Self {
            hub: Some(hub),
            flush_timeout: None,
        }
    }

    /// Creates a sender that uses whatever hub is active when an event is sent.
    ///
    /// That is the current thread's hub, which falls back to the main hub
    /// configured by `sentry::init`. Events fired before a client is bound
    /// are dropped and reported with a nil id.
    pub fn current() -> Self {
        Self::default()
    }

    /// Sets how long the waiting methods block at most.
    ///
    /// Without a timeout the client's `shutdown_timeout` applies.
    #[must_use]
    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = Some(timeout);
        self
    }

    fn with_hub<F>(&self, f: F) -> Uuid
    where
        F: FnOnce(&Hub) -> Uuid,
    {
        match self.hub {
            Some(ref hub) => f(hub),
            None => Hub::with_active(|hub| f(hub)),
        }
    }

    fn capture(&self, event: Event<'static>, wait: bool) -> Uuid {
        self.with_hub(|hub| {
            let event_id = hub.capture_event(event);
            if wait {
                if let Some(client) = hub.client() {
                    if !client.flush(self.flush_timeout) {
                        sentry_core::sentry_debug!(
                            "[HubSender] flush timed out, event {} may not be delivered",
                            event_id
                        );
                    }
                }
            }
            event_id
        })
    }
}

impl std::fmt::Debug for HubSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubSender")
            .field("bound_hub", &self.hub.is_some())
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}

/// Creates a message [`Event`].
pub fn event_from_message(message: &str, level: Level, tags: Tags) -> Event<'static> {
    Event {
        message: Some(message.to_owned()),
        level,
        tags,
        ..Default::default()
    }
}

/// Creates an exception [`Event`] from an error and its source chain.
pub fn event_from_error(
    error: &SharedError,
    level: Level,
    tags: Tags,
    message: &str,
) -> Event<'static> {
    let mut event = sentry_core::event_from_error(&**error);
    event.message = Some(message.to_owned());
    event.level = level;
    event.tags = tags;
    event
}

impl Sender for HubSender {
    fn capture_message(&self, message: &str, level: Level, tags: Tags) -> Uuid {
        self.capture(event_from_message(message, level, tags), false)
    }

    fn capture_error(&self, error: SharedError, level: Level, tags: Tags, message: &str) -> Uuid {
        self.capture(event_from_error(&error, level, tags, message), false)
    }

    fn capture_message_and_wait(&self, message: &str, level: Level, tags: Tags) -> Uuid {
        self.capture(event_from_message(message, level, tags), true)
    }

    fn capture_error_and_wait(
        &self,
        error: SharedError,
        level: Level,
        tags: Tags,
        message: &str,
    ) -> Uuid {
        self.capture(event_from_error(&error, level, tags, message), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    #[test]
    fn test_event_from_error() {
        let error: SharedError = Arc::new(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        let mut tags = Tags::new();
        tags.insert("worker".into(), "worker1".into());

        let event = event_from_error(&error, Level::Fatal, tags, "could not write cache");

        assert_eq!(event.message.as_deref(), Some("could not write cache"));
        assert_eq!(event.level, Level::Fatal);
        assert_eq!(event.tags["worker"], "worker1");
        assert_eq!(event.exception.values.len(), 1);
        assert_eq!(
            event.exception.values[0].value.as_deref(),
            Some("disk on fire")
        );
    }

    #[test]
    fn test_capture_without_client() {
        let hub = Arc::new(Hub::new(None, Default::default()));
        let sender = HubSender::new(hub);

        assert!(sender
            .capture_message_and_wait("nobody listens", Level::Error, Tags::new())
            .is_nil());
    }
}
