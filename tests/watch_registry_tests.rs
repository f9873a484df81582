// WatchRegistry tests
// Registration, fire-once delivery and de-registration.

use walkv::watch::{WatchEvent, WatchRegistry};
use walkv::LogRecord;

fn put_event(key: &str, value: &str) -> WatchEvent {
    WatchEvent::from(LogRecord::put(key, value))
}

// =============================================================================
// Test 1: Register adds a slot under the key
// =============================================================================
#[test]
fn register_single_watcher() {
    let mut registry = WatchRegistry::new();
    let (_id, _rx) = registry.register("k");

    assert_eq!(registry.watcher_count("k"), 1);
    assert_eq!(registry.watched_key_count(), 1);
}

// =============================================================================
// Test 2: Several slots on one key get distinct ids
// =============================================================================
#[test]
fn register_multiple_watchers_same_key() {
    let mut registry = WatchRegistry::new();
    let (a, _ra) = registry.register("shared");
    let (b, _rb) = registry.register("shared");
    let (c, _rc) = registry.register("shared");

    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_eq!(registry.watcher_count("shared"), 3);
    assert_eq!(registry.watched_key_count(), 1);
}

// =============================================================================
// Test 3: Fire delivers to every slot and drains the key
// =============================================================================
#[test]
fn fire_delivers_once_and_drains() {
    let mut registry = WatchRegistry::new();
    let (_, rx1) = registry.register("k");
    let (_, rx2) = registry.register("k");

    assert_eq!(registry.fire(&put_event("k", "v")), 2);
    assert_eq!(registry.watcher_count("k"), 0);
    assert_eq!(registry.watched_key_count(), 0);

    assert_eq!(rx1.try_recv().unwrap().value, "v");
    assert_eq!(rx2.try_recv().unwrap().value, "v");

    // Sender side is gone: nothing more will ever arrive.
    assert!(rx1.recv().is_err());
}

// =============================================================================
// Test 4: Fire only touches its own key
// =============================================================================
#[test]
fn fire_ignores_other_keys() {
    let mut registry = WatchRegistry::new();
    let (_, rx) = registry.register("key1");

    assert_eq!(registry.fire(&put_event("key2", "v")), 0);
    assert_eq!(registry.watcher_count("key1"), 1);
    assert!(rx.try_recv().is_err());
}

// =============================================================================
// Test 5: Firing into a dropped receiver does not fail or block
// =============================================================================
#[test]
fn fire_with_dropped_receiver() {
    let mut registry = WatchRegistry::new();
    let (_, rx) = registry.register("k");
    drop(rx);

    assert_eq!(registry.fire(&put_event("k", "v")), 1);
    assert_eq!(registry.watched_key_count(), 0);
}

// =============================================================================
// Test 6: Deregister removes one slot, and the key once empty
// =============================================================================
#[test]
fn deregister_removes_slot_then_key() {
    let mut registry = WatchRegistry::new();
    let (a, _ra) = registry.register("k");
    let (b, rb) = registry.register("k");

    assert!(registry.deregister("k", a));
    assert_eq!(registry.watcher_count("k"), 1);

    // Unknown ids and keys are ignored.
    assert!(!registry.deregister("k", a));
    assert!(!registry.deregister("nope", b));

    assert!(registry.deregister("k", b));
    assert_eq!(registry.watched_key_count(), 0);

    registry.fire(&put_event("k", "v"));
    assert!(rb.try_recv().is_err());
}
