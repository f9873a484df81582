//! # walkv
//!
//! A single-node, in-memory key-value store with a write-ahead log and
//! one-shot watches.
//!
//! ## Core idea
//! Every Put and Delete is appended to the log before it touches memory.
//! On startup the log is replayed from the beginning to rebuild the
//! state, so the log is the only thing that has to survive a restart.
//! Callers can also ask to be told, once, when a key next changes.
//!
//! ```no_run
//! use walkv::{Store, StoreConfig};
//!
//! let store = Store::open(&StoreConfig::with_wal_path("server.wal"))?;
//! store.put("greeting", "hello")?;
//! assert_eq!(store.get("greeting").as_deref(), Some("hello"));
//! store.close()?;
//! # Ok::<(), walkv::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod memtable;
pub mod store;
pub mod types;
pub mod wal;
pub mod watch;

// Public re-exports for the top-level API
pub use crate::config::StoreConfig;
pub use error::{DecodeError, Error, Result};
pub use store::Store;
pub use types::{Command, DELETE_SENTINEL, Key, Value};
pub use wal::{Log, LogRecord, MemoryLog, RecoveryMode, SyncPolicy, Wal};
pub use watch::{WatchEvent, WatchHandle};
