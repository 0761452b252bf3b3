use std::collections::BTreeSet;
use std::sync::Arc;

use sentry_core::Level;

use crate::error::{Dispatch, HookError};
use crate::record::Record;
use crate::sender::{HubSender, Sender};

/// Forwards log events of registered levels to a [`Sender`].
///
/// Every level is registered either for async dispatch, where firing hands
/// the event to the sender and returns, or for sync dispatch, where firing
/// blocks until the sender delivered the event. Events of other levels are
/// dropped.
///
/// # Examples
///
/// ```
/// use sentry_core::Level;
/// use sentry_hook::{Hook, Record};
///
/// let mut hook = Hook::with_current_hub();
/// hook.set_async([Level::Error]).unwrap();
/// hook.set_sync([Level::Fatal]).unwrap();
///
/// // Returns immediately.
/// hook.fire(&Record::new(Level::Error, "could not reach upstream"));
/// // Not registered, nothing is sent.
/// hook.fire(&Record::new(Level::Info, "listening on :8080"));
/// ```
pub struct Hook {
    async_levels: BTreeSet<Level>,
    sync_levels: BTreeSet<Level>,
    sender: Arc<dyn Sender>,
}

impl Hook {
    /// Creates a hook without any registered levels.
    pub fn new<S: Sender + 'static>(sender: S) -> Self {
        Self::from_arc(Arc::new(sender))
    }

    /// Creates a hook that shares an existing sender.
    pub fn from_arc(sender: Arc<dyn Sender>) -> Self {
        Self {
            async_levels: BTreeSet::new(),
            sync_levels: BTreeSet::new(),
            sender,
        }
    }

    /// Creates a hook that sends to the active Sentry hub.
    ///
    /// See [`HubSender::current`]: `sentry::init` has to run before events
    /// are fired, or they are dropped.
    pub fn with_current_hub() -> Self {
        Self::new(HubSender::current())
    }

    /// Registers levels whose events are sent without blocking.
    ///
    /// Fails on the first level that is already registered for sync
    /// dispatch. Levels before it in `levels` stay registered.
    pub fn set_async<I>(&mut self, levels: I) -> Result<(), HookError>
    where
        I: IntoIterator<Item = Level>,
    {
        for level in levels {
            if self.sync_levels.contains(&level) {
                return Err(HookError::LevelConflict {
                    level,
                    set: Dispatch::Sync,
                });
            }
            self.async_levels.insert(level);
        }
        Ok(())
    }

    /// Registers levels whose events are sent blocking.
    ///
    /// Fails on the first level that is already registered for async
    /// dispatch. Levels before it in `levels` stay registered.
    pub fn set_sync<I>(&mut self, levels: I) -> Result<(), HookError>
    where
        I: IntoIterator<Item = Level>,
    {
        for level in levels {
            if self.async_levels.contains(&level) {
                return Err(HookError::LevelConflict {
                    level,
                    set: Dispatch::Async,
                });
            }
            self.sync_levels.insert(level);
        }
        Ok(())
    }

    /// Returns all registered levels, in no particular order.
    pub fn levels(&self) -> Vec<Level> {
        self.async_levels
            .iter()
            .chain(self.sync_levels.iter())
            .copied()
            .collect()
    }

    /// Returns how events of `level` are dispatched, if at all.
    pub fn dispatch_for(&self, level: Level) -> Option<Dispatch> {
        if self.async_levels.contains(&level) {
            Some(Dispatch::Async)
        } else if self.sync_levels.contains(&level) {
            Some(Dispatch::Sync)
        } else {
            None
        }
    }

    /// Checks if events of `level` are forwarded.
    pub fn is_enabled(&self, level: Level) -> bool {
        self.dispatch_for(level).is_some()
    }

    /// Forwards a record according to its level.
    ///
    /// Delivery failures are the sender's business and never surface here.
    pub fn fire(&self, record: &Record) {
        if let Some(dispatch) = self.dispatch_for(record.level()) {
            self.send(record, dispatch);
        }
    }

    fn send(&self, record: &Record, dispatch: Dispatch) {
        let tags = record.tags();
        let level = record.level();
        let message = record.message();

        let event_id = match (record.error().cloned(), dispatch) {
            (Some(error), Dispatch::Async) => {
                self.sender.capture_error(error, level, tags, message)
            }
            (Some(error), Dispatch::Sync) => {
                self.sender.capture_error_and_wait(error, level, tags, message)
            }
            (None, Dispatch::Async) => self.sender.capture_message(message, level, tags),
            (None, Dispatch::Sync) => self.sender.capture_message_and_wait(message, level, tags),
        };
        sentry_core::sentry_debug!("[Hook] sent {} {} event {}", dispatch, level, event_id);
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("async_levels", &self.async_levels)
            .field("sync_levels", &self.sync_levels)
            .finish_non_exhaustive()
    }
}
