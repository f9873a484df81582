use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::trace;

use crate::error::{Error, Result};
use crate::types::Key;
use crate::watch::WatchEvent;

/// Whatever owns the registry a handle was issued from.
pub(crate) trait Deregister: Send + Sync {
    fn deregister(&self, key: &str, id: u64);
}

/// Waiting end of a single watch.
///
/// Receives at most one [`WatchEvent`]. Dropping the handle before the
/// watch fires removes its slot from the store, so abandoned watchers do
/// not accumulate. The handle does not keep the store alive.
pub struct WatchHandle {
    id: u64,
    key: Key,
    receiver: Receiver<WatchEvent>,
    owner: Weak<dyn Deregister>,
    /// The event has been taken, so `fire` already removed the slot.
    fired: AtomicBool,
}

impl WatchHandle {
    pub(crate) fn new(
        id: u64,
        key: Key,
        receiver: Receiver<WatchEvent>,
        owner: Weak<dyn Deregister>,
    ) -> Self {
        WatchHandle {
            id,
            key,
            receiver,
            owner,
            fired: AtomicBool::new(false),
        }
    }

    /// Unique identifier of this watch within its store.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The key being watched.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Block until the watch fires.
    ///
    /// Fails with [`Error::WatchClosed`] if the store is dropped first or
    /// the event was already taken.
    pub fn wait(&self) -> Result<WatchEvent> {
        let event = self.receiver.recv().map_err(|_| Error::WatchClosed)?;
        Ok(self.taken(event))
    }

    /// Block until the watch fires or `timeout` elapses.
    ///
    /// A timed-out handle stays registered and may still be waited on;
    /// drop it to give up for good.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<WatchEvent> {
        let event = self.receiver.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => Error::WatchTimeout(timeout),
            RecvTimeoutError::Disconnected => Error::WatchClosed,
        })?;
        Ok(self.taken(event))
    }

    /// Take the event if the watch has already fired.
    pub fn try_recv(&self) -> Option<WatchEvent> {
        self.receiver.try_recv().ok().map(|event| self.taken(event))
    }

    /// Whether this handle has already received its event.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Relaxed)
    }

    fn taken(&self, event: WatchEvent) -> WatchEvent {
        self.fired.store(true, Ordering::Relaxed);
        event
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("fired", &self.has_fired())
            .finish_non_exhaustive()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if self.has_fired() {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            owner.deregister(&self.key, self.id);
            trace!(watcher_id = self.id, key = %self.key, "watch handle dropped");
        }
    }
}
