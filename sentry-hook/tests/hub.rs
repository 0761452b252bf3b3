use std::io;
use std::sync::Arc;
use std::time::Duration;

use sentry::test::with_captured_events;
use sentry::{ClientOptions, Hub};
use sentry_core::test::TestTransport;
use sentry_core::Level;
use sentry_hook::{Hook, HubSender, Record, Sender, SharedError, Tags};

fn init_hook() -> Hook {
    let mut hook = Hook::with_current_hub();
    hook.set_async([Level::Warning]).unwrap();
    hook.set_sync([Level::Error]).unwrap();
    hook
}

#[test]
fn test_async_message_event() {
    let hook = init_hook();

    let events = with_captured_events(|| {
        sentry::configure_scope(|scope| scope.set_tag("worker", "worker1"));
        hook.fire(&Record::new(Level::Warning, "slow disk").with_field("latency_ms", 250));
        hook.fire(&Record::new(Level::Info, "not forwarded"));
    });

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.message.as_deref(), Some("slow disk"));
    assert_eq!(event.level, Level::Warning);
    assert_eq!(event.tags["latency_ms"], "250");
    assert_eq!(event.tags["worker"], "worker1");
    assert!(event.exception.values.is_empty());
}

#[test]
fn test_sync_error_event() {
    let hook = init_hook();

    let events = with_captured_events(|| {
        hook.fire(
            &Record::new(Level::Error, "could not write cache")
                .with_field("path", "/var/cache/app")
                .with_error(io::Error::new(io::ErrorKind::Other, "disk on fire")),
        );
    });

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.message.as_deref(), Some("could not write cache"));
    assert_eq!(event.level, Level::Error);
    assert_eq!(event.tags.len(), 1);
    assert_eq!(event.tags["path"], "/var/cache/app");
    assert_eq!(event.exception.values.len(), 1);
    assert_eq!(
        event.exception.values[0].value.as_deref(),
        Some("disk on fire")
    );
}

#[test]
fn test_bound_hub_flushes() {
    let transport = TestTransport::new();
    let options = ClientOptions {
        dsn: Some("https://public@sentry.invalid/1".parse().unwrap()),
        transport: Some(Arc::new(transport.clone())),
        ..ClientOptions::default()
    };
    let hub = Arc::new(Hub::new(
        Some(Arc::new(options.into())),
        Default::default(),
    ));

    let sender = HubSender::new(hub).flush_timeout(Duration::from_secs(1));
    let mut hook = Hook::new(sender);
    hook.set_sync([Level::Fatal]).unwrap();

    hook.fire(&Record::new(Level::Fatal, "shutting down"));

    let events = transport.fetch_and_clear_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message.as_deref(), Some("shutting down"));
    assert_eq!(events[0].level, Level::Fatal);
}

#[test]
fn test_no_client_is_silent() {
    let hub = Arc::new(Hub::new(None, Default::default()));
    let sender = HubSender::new(hub.clone()).flush_timeout(Duration::from_millis(10));
    let error: SharedError = Arc::new(io::Error::new(io::ErrorKind::Other, "disk on fire"));

    assert!(sender
        .capture_message("nobody listens", Level::Warning, Tags::new())
        .is_nil());
    assert!(sender
        .capture_message_and_wait("nobody listens", Level::Error, Tags::new())
        .is_nil());
    assert!(sender
        .capture_error(error.clone(), Level::Warning, Tags::new(), "nobody listens")
        .is_nil());
    assert!(sender
        .capture_error_and_wait(error, Level::Error, Tags::new(), "nobody listens")
        .is_nil());

    let mut hook = Hook::new(sender);
    hook.set_sync([Level::Error]).unwrap();
    hook.fire(&Record::new(Level::Error, "nobody listens"));
    assert!(hub.last_event_id().is_none());
}
