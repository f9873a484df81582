use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::error;

use crate::error::Result;
use crate::wal::SyncPolicy;
use crate::wal::record::LogRecord;

/// The file operations a [`WALWriter`] needs beyond [`Write`].
pub trait LogFile: Write {
    fn sync_all(&self) -> io::Result<()>;
    fn set_len(&self, len: u64) -> io::Result<()>;
    fn file_len(&self) -> io::Result<u64>;
}

impl LogFile for File {
    fn sync_all(&self) -> io::Result<()> {
        File::sync_all(self)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn file_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

/// Writes log records to a file on disk.
///
/// Each frame goes to the file in a single `write_all` and is flushed to
/// the OS before `append` returns, so a process crash never loses an
/// acknowledged record. Surviving a machine crash depends on the
/// [`SyncPolicy`].
///
/// A failed append leaves no trace: the file is cut back to the last
/// acknowledged record, so neither a torn frame nor the failed record can
/// reach a later replay. `offset` is always that acknowledged length.
pub struct WALWriter<F: LogFile = File> {
    file: F,
    offset: u64,
    sync_policy: SyncPolicy,
    writes_since_sync: usize,
    last_sync: Instant,
    /// Set when a rollback itself failed; the tail is then unknown.
    broken: bool,
}

impl WALWriter<File> {
    /// Open (or create) a log file for appending.
    pub fn new(path: &Path, sync_policy: SyncPolicy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        Self::from_file(file, sync_policy)
    }
}

impl<F: LogFile> WALWriter<F> {
    /// Append to an already open file, starting at its current end.
    pub fn from_file(file: F, sync_policy: SyncPolicy) -> Result<Self> {
        let offset = file.file_len()?;
        Ok(WALWriter {
            file,
            offset,
            sync_policy,
            writes_since_sync: 0,
            last_sync: Instant::now(),
            broken: false,
        })
    }

    /// Append a record to the log.
    /// Depending on SyncPolicy, may fsync after this write.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        if self.broken {
            return Err(io::Error::other("WAL tail unknown after failed rollback").into());
        }

        let encoded = record.encode();
        let due = match self.sync_policy {
            SyncPolicy::EveryWrite => true,
            SyncPolicy::EveryNWrites(n) => self.writes_since_sync + 1 >= n,
            SyncPolicy::EveryNMillis(ms) => self.last_sync.elapsed() >= Duration::from_millis(ms),
        };

        let written = self
            .file
            .write_all(&encoded)
            .and_then(|()| self.file.flush())
            .and_then(|()| if due { self.file.sync_all() } else { Ok(()) });

        if let Err(err) = written {
            self.rollback();
            return Err(err.into());
        }

        self.offset += encoded.len() as u64;
        if due {
            self.writes_since_sync = 0;
            self.last_sync = Instant::now();
        } else {
            self.writes_since_sync += 1;
        }

        Ok(())
    }

    /// Drop whatever part of a failed append reached the file.
    fn rollback(&mut self) {
        if let Err(err) = self.file.set_len(self.offset) {
            error!(offset = self.offset, error = %err, "WAL rollback failed");
            self.broken = true;
        }
    }

    /// Force fsync to disk. Ensures all written records are durable.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.sync_file()
    }

    fn sync_file(&mut self) -> Result<()> {
        self.file.sync_all()?;
        self.writes_since_sync = 0;
        self.last_sync = Instant::now();
        Ok(())
    }

    /// Cut the file back to `len` bytes and make that durable.
    ///
    /// The file is in append mode, so later writes land at the new end.
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        self.file.flush()?;
        self.file.set_len(len)?;
        self.offset = len;
        self.sync_file()
    }

    /// Current file length (bytes acknowledged so far, including prior sessions).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Appends since the last fsync.
    pub fn writes_since_sync(&self) -> usize {
        self.writes_since_sync
    }

    pub fn get_ref(&self) -> &F {
        &self.file
    }
}
