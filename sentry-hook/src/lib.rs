//! Forwards log events to Sentry based on their level.
//!
//! A [`Hook`] holds two disjoint sets of levels. Events of an *async* level
//! are handed to the [`Sender`] without waiting, events of a *sync* level
//! block the logging call until the sender delivered them, and all other
//! events are dropped.
//!
//! Fields of an event become Sentry tags. The field called `"error"` is
//! special: when it holds an error value the event is captured as an
//! exception carrying that error and its sources, otherwise as a plain
//! message.
//!
//! # Examples
//!
//! With `tracing`, the [`Hook`] is a [`Layer`](tracing_subscriber::Layer):
//!
//! ```
//! use sentry_core::Level;
//! use tracing_subscriber::prelude::*;
//!
//! let _sentry = sentry::init(());
//!
//! let mut hook = sentry_hook::Hook::with_current_hub();
//! hook.set_async([Level::Error, Level::Warning]).unwrap();
//! hook.set_sync([Level::Fatal]).unwrap();
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(hook)
//!     .init();
//!
//! tracing::warn!(worker = "worker1", "recorded as message with a `worker` tag");
//! ```
//!
//! With `log`, wrap it in a [`HookLogger`]:
//!
//! ```
//! use sentry_core::Level;
//!
//! let mut hook = sentry_hook::Hook::with_current_hub();
//! hook.set_sync([Level::Error]).unwrap();
//!
//! log::set_boxed_logger(Box::new(sentry_hook::HookLogger::new(hook)))
//!     .map(|()| log::set_max_level(log::LevelFilter::Info))
//!     .unwrap();
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "oh no");
//! log::error!(error:err = error; "recorded as exception, waits for delivery");
//! ```
//!
//! Any reporting backend can be plugged in by implementing [`Sender`];
//! [`HubSender`] is the one that captures on a Sentry hub.

#![doc(html_favicon_url = "https://sentry-brand.storage.googleapis.com/favicon.ico")]
#![doc(html_logo_url = "https://sentry-brand.storage.googleapis.com/sentry-glyph-black.png")]
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod error;
mod hook;
#[cfg(feature = "tracing")]
mod layer;
#[cfg(feature = "log")]
mod logger;
mod record;
mod sender;

pub use error::{Dispatch, HookError};
pub use hook::Hook;
#[cfg(feature = "tracing")]
pub use layer::{convert_tracing_level, record_from_event};
#[cfg(feature = "log")]
pub use logger::{convert_log_level, record_from_log, HookLogger, NoopLogger};
pub use record::{make_tags, CapturedError, FieldValue, Record, SharedError, Tags, ERROR_KEY};
pub use sender::{event_from_error, event_from_message, HubSender, Sender};
