use std::collections::HashMap;

use crate::types::{Command, Key, Value};
use crate::wal::LogRecord;

/// Current contents of the store.
///
/// Only ever changed by applying a [`LogRecord`], either from replay or
/// from a live mutation that has already been logged. Deletes remove the
/// key outright: there is no older version anywhere to shadow.
#[derive(Debug, Default)]
pub struct MemTable {
    data: HashMap<Key, Value>,
}

impl MemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record: Put overwrites, Delete removes (no-op if absent).
    pub fn apply(&mut self, record: &LogRecord) {
        match record.command {
            Command::Put => {
                self.data.insert(record.key.clone(), record.value.clone());
            }
            Command::Delete => {
                self.data.remove(&record.key);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
