//! One-shot watches on single keys.
//!
//! A watch is registered under the store's write lock and fired by the
//! next Put or Delete of its key, under the same lock. Each slot is a
//! bounded(1) channel, so firing is a non-blocking `try_send` and the
//! mutating call never waits on a watcher. After firing, the slot is gone;
//! watching again means registering a new one.
//!
//! ```text
//! watch(k)  ──► WatchRegistry[k] += slot ──► WatchHandle (caller waits)
//! put(k, v) ──► log ─► memtable ─► WatchRegistry.remove(k) ─► try_send(v)
//! ```

mod handle;
mod registry;

pub(crate) use handle::Deregister;
pub use handle::WatchHandle;
pub use registry::WatchRegistry;

use crate::types::{Command, Key, Value};
use crate::wal::LogRecord;

/// The change that fired a watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub key: Key,
    /// New value on Put; the empty delete sentinel on Delete.
    pub value: Value,
    pub kind: Command,
}

impl WatchEvent {
    pub fn is_delete(&self) -> bool {
        self.kind == Command::Delete
    }
}

impl From<LogRecord> for WatchEvent {
    fn from(record: LogRecord) -> Self {
        WatchEvent {
            key: record.key,
            value: record.value,
            kind: record.command,
        }
    }
}
