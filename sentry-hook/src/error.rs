use std::fmt;

use sentry_core::Level;
use thiserror::Error;

/// How a [`Hook`](crate::Hook) forwards events of a registered level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// Hand the event to the sender and return without waiting.
    Async,
    /// Block until the sender acknowledged the event.
    Sync,
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Dispatch::Async => write!(f, "async"),
            Dispatch::Sync => write!(f, "sync"),
        }
    }
}

/// Errors raised while configuring a [`Hook`](crate::Hook).
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The level is already registered with the other dispatch mode.
    #[error("log level {level} already in {set} levels")]
    LevelConflict {
        /// The level that was being registered.
        level: Level,
        /// The set that already holds the level.
        set: Dispatch,
    },
}
