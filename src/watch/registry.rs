use std::collections::HashMap;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tracing::trace;

use crate::types::Key;
use crate::watch::WatchEvent;

/// One pending watcher.
#[derive(Debug)]
struct WatchSlot {
    id: u64,
    sender: Sender<WatchEvent>,
}

/// Pending one-shot watchers, grouped by key.
///
/// A key has an entry only while at least one slot is pending on it.
/// Not synchronized on its own: the store keeps it behind the same lock
/// as the state so registration and firing never race.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    slots: HashMap<Key, Vec<WatchSlot>>,
    next_id: u64,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot under `key`. Returns its id and the receiving end of a
    /// one-value channel.
    pub fn register(&mut self, key: &str) -> (u64, Receiver<WatchEvent>) {
        self.next_id += 1;
        let id = self.next_id;

        // Capacity 1 so firing never waits on the receiver.
        let (sender, receiver) = bounded(1);
        self.slots
            .entry(key.to_owned())
            .or_default()
            .push(WatchSlot { id, sender });

        trace!(watcher_id = id, key, "watcher registered");
        (id, receiver)
    }

    /// Deliver `event` to every slot pending on its key and drop them all.
    ///
    /// Returns the number of slots that were pending.
    pub fn fire(&mut self, event: &WatchEvent) -> usize {
        let Some(slots) = self.slots.remove(&event.key) else {
            return 0;
        };

        for slot in &slots {
            match slot.sender.try_send(event.clone()) {
                Ok(()) => {}
                // Waiter gave up and dropped its handle.
                Err(TrySendError::Disconnected(_)) => {
                    trace!(watcher_id = slot.id, key = %event.key, "watcher already gone");
                }
                // Unreachable for a fresh slot; never wait here either way.
                Err(TrySendError::Full(_)) => {}
            }
        }

        trace!(key = %event.key, kind = ?event.kind, watchers = slots.len(), "watchers fired");
        slots.len()
    }

    /// Remove the slot `id` under `key` if it is still pending.
    pub fn deregister(&mut self, key: &str, id: u64) -> bool {
        let Some(slots) = self.slots.get_mut(key) else {
            return false;
        };

        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        let removed = slots.len() != before;

        if slots.is_empty() {
            self.slots.remove(key);
        }
        removed
    }

    /// Number of pending slots on `key`.
    pub fn watcher_count(&self, key: &str) -> usize {
        self.slots.get(key).map_or(0, Vec::len)
    }

    /// Number of keys with at least one pending slot.
    pub fn watched_key_count(&self) -> usize {
        self.slots.len()
    }
}
