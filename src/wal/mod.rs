pub mod memory;
pub mod reader;
pub mod record;
pub mod writer;

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use reader::WALReader;
use writer::WALWriter;

pub use memory::MemoryLog;
pub use record::LogRecord;

/// Controls when the log is fsync'd to disk.
///
/// Trade-off: durability vs throughput.
///   - EveryWrite: zero data loss, ~10x slower (each fsync waits for disk)
///   - EveryNWrites: batched durability, lose up to N writes on power loss
///   - EveryNMillis: bounded loss window, much higher throughput
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// fsync after every record. Safest, slowest.
    #[default]
    EveryWrite,
    /// fsync every N records.
    EveryNWrites(usize),
    /// fsync on the first append at least N milliseconds after the last one.
    EveryNMillis(u64),
}

/// What replay does with a malformed or truncated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMode {
    /// Fail the whole replay with `Error::Corruption`.
    #[default]
    Strict,
    /// Keep the records before the bad one and drop the rest of the log.
    TruncateTail,
}

/// Durable, ordered, append-only record of mutations.
pub trait Log: Send + Sync {
    /// Append one record. Once this returns `Ok`, the record is part of
    /// every later [`read_all`](Log::read_all). Concurrent appends never
    /// interleave.
    fn append(&self, record: &LogRecord) -> Result<()>;

    /// Decode every record from the start of the log, in append order.
    ///
    /// Meant for startup; callers should not race it against `append`.
    fn read_all(&self) -> Result<Vec<LogRecord>>;

    /// Release the underlying resource.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// File-backed write-ahead log.
pub struct Wal {
    path: PathBuf,
    writer: Mutex<WALWriter>,
    recovery: RecoveryMode,
}

impl Wal {
    /// Open or create the log file at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        sync_policy: SyncPolicy,
        recovery: RecoveryMode,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = WALWriter::new(&path, sync_policy)?;

        info!(
            path = %path.display(),
            bytes = writer.offset(),
            ?sync_policy,
            ?recovery,
            "opened WAL"
        );

        Ok(Wal {
            path,
            writer: Mutex::new(writer),
            recovery,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Force an fsync regardless of the sync policy.
    pub fn sync(&self) -> Result<()> {
        self.writer.lock().sync()
    }
}

impl Log for Wal {
    fn append(&self, record: &LogRecord) -> Result<()> {
        self.writer.lock().append(record)
    }

    fn read_all(&self) -> Result<Vec<LogRecord>> {
        // Held for the whole read so no append lands mid-replay.
        let mut writer = self.writer.lock();

        let replay = WALReader::new(&self.path)?.replay(self.recovery)?;
        if replay.discarded > 0 {
            warn!(
                path = %self.path.display(),
                valid_len = replay.valid_len,
                discarded = replay.discarded,
                "truncating WAL to last valid record"
            );
            writer.truncate(replay.valid_len)?;
        }

        info!(
            path = %self.path.display(),
            records = replay.records.len(),
            "read WAL"
        );
        Ok(replay.records)
    }

    fn close(self) -> Result<()> {
        let mut writer = self.writer.into_inner();
        writer.sync()?;
        info!(path = %self.path.display(), "closed WAL");
        Ok(())
    }
}
