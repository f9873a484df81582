use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::wal::reader::replay;
use crate::wal::record::LogRecord;
use crate::wal::{Log, RecoveryMode};

/// A [`Log`] kept in memory, using the same framing as the file log.
///
/// Nothing survives the process; useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryLog {
    buf: Mutex<Vec<u8>>,
    recovery: RecoveryMode,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously encoded frames.
    pub fn from_bytes(bytes: Vec<u8>, recovery: RecoveryMode) -> Self {
        MemoryLog {
            buf: Mutex::new(bytes),
            recovery,
        }
    }

    /// Copy of the encoded log.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.lock().clone()
    }

    pub fn len_bytes(&self) -> usize {
        self.buf.lock().len()
    }
}

impl Log for MemoryLog {
    fn append(&self, record: &LogRecord) -> Result<()> {
        record.encode_into(&mut self.buf.lock());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<LogRecord>> {
        let mut buf = self.buf.lock();
        let replay = replay(&buf, self.recovery)?;
        buf.truncate(replay.valid_len as usize);
        debug!(records = replay.records.len(), "read in-memory log");
        Ok(replay.records)
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
