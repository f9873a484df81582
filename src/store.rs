use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::memtable::MemTable;
use crate::types::{Key, Value};
use crate::wal::{Log, LogRecord, Wal};
use crate::watch::{Deregister, WatchEvent, WatchHandle, WatchRegistry};

/// State and pending watchers, guarded together.
#[derive(Debug, Default)]
struct Core {
    state: MemTable,
    watchers: WatchRegistry,
}

impl Deregister for RwLock<Core> {
    fn deregister(&self, key: &str, id: u64) {
        if self.write().watchers.deregister(key, id) {
            trace!(watcher_id = id, key, "pending watcher removed");
        }
    }
}

/// The key-value store.
///
/// Every mutation goes log → memtable → watchers while holding the write
/// lock, so log order, apply order and firing order are one and the same.
/// Reads take the read lock and never see a half-applied mutation.
///
/// ```
/// use walkv::{MemoryLog, Store};
///
/// let store = Store::new(MemoryLog::new());
/// let watch = store.watch("k");
/// store.put("k", "v").unwrap();
/// assert_eq!(store.get("k").as_deref(), Some("v"));
/// assert_eq!(watch.wait().unwrap().value, "v");
/// ```
pub struct Store<L: Log = Wal> {
    log: L,
    core: Arc<RwLock<Core>>,
}

impl Store<Wal> {
    /// Open the configured log, replay it, and return a store ready for
    /// traffic.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let wal = Wal::open(&config.wal_path, config.sync_policy, config.recovery)?;
        let records = wal.read_all()?;

        let store = Store::new(wal);
        let restored = store.restore(records);
        info!(restored, keys = store.len(), "store recovered from WAL");

        Ok(store)
    }
}

impl<L: Log> Store<L> {
    /// Create an empty store on top of `log`. Call [`restore`](Self::restore)
    /// with the log's records before admitting traffic.
    pub fn new(log: L) -> Self {
        Store {
            log,
            core: Arc::new(RwLock::new(Core::default())),
        }
    }

    /// Set `key` to `value`.
    ///
    /// If the log append fails nothing changes and the error is returned.
    pub fn put(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        self.commit(LogRecord::put(key, value))
    }

    /// Remove `key`. Deleting an absent key still logs and succeeds.
    pub fn delete(&self, key: impl Into<Key>) -> Result<()> {
        self.commit(LogRecord::delete(key))
    }

    fn commit(&self, record: LogRecord) -> Result<()> {
        let mut core = self.core.write();

        if let Err(err) = self.log.append(&record) {
            warn!(key = %record.key, command = ?record.command, error = %err, "log append failed");
            return Err(err);
        }

        core.state.apply(&record);

        let event = WatchEvent::from(record);
        let fired = core.watchers.fire(&event);
        debug!(key = %event.key, command = ?event.kind, fired, "committed");

        Ok(())
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.core.read().state.get(key).map(str::to_owned)
    }

    /// Register a one-shot watch on `key`.
    ///
    /// Returns immediately. The handle receives the next Put or Delete of
    /// `key`; the current value is not consulted.
    pub fn watch(&self, key: impl Into<Key>) -> WatchHandle {
        let key = key.into();
        let (id, receiver) = self.core.write().watchers.register(&key);

        let owner: Weak<RwLock<Core>> = Arc::downgrade(&self.core);
        WatchHandle::new(id, key, receiver, owner)
    }

    /// Replay `records` into the state in order, last writer wins.
    ///
    /// For startup, before any other traffic: watchers are not fired.
    /// Returns the number of records applied.
    pub fn restore<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = LogRecord>,
    {
        let mut core = self.core.write();
        let mut applied = 0;
        for record in records {
            core.state.apply(&record);
            applied += 1;
        }
        applied
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.core.read().state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.read().state.is_empty()
    }

    /// Pending watchers on `key`.
    pub fn watcher_count(&self, key: &str) -> usize {
        self.core.read().watchers.watcher_count(key)
    }

    /// Keys with at least one pending watcher.
    pub fn watched_key_count(&self) -> usize {
        self.core.read().watchers.watched_key_count()
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Close the underlying log. Pending watchers see
    /// [`Error::WatchClosed`](crate::Error::WatchClosed).
    pub fn close(self) -> Result<()> {
        self.log.close()
    }
}
