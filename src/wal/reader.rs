use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};
use crate::wal::RecoveryMode;
use crate::wal::record::LogRecord;

/// Reads log records from a file for recovery.
///
/// Loads the entire file into memory, then iterates record by record.
pub struct WALReader {
    data: Vec<u8>,
}

impl WALReader {
    /// Open a log file for reading.
    pub fn new(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(WALReader { data })
    }

    /// Read from an in-memory copy of a log.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        WALReader { data }
    }

    /// Create an iterator over the records in the log.
    pub fn iter(&self) -> WALIterator<'_> {
        WALIterator::new(&self.data)
    }

    /// Decode every record, applying `mode` to a bad record.
    pub fn replay(&self, mode: RecoveryMode) -> Result<Replay> {
        replay(&self.data, mode)
    }
}

/// Outcome of decoding a whole log.
#[derive(Debug, Default)]
pub struct Replay {
    /// Records in append order.
    pub records: Vec<LogRecord>,
    /// Length of the prefix made of well-formed records.
    pub valid_len: u64,
    /// Bytes after `valid_len` that were dropped. Always zero in strict mode.
    pub discarded: u64,
}

/// Decode every record in `data`.
///
/// In [`RecoveryMode::Strict`] the first malformed record fails the whole
/// replay. In [`RecoveryMode::TruncateTail`] decoding stops there and the
/// valid prefix is returned.
pub fn replay(data: &[u8], mode: RecoveryMode) -> Result<Replay> {
    let mut iter = WALIterator::new(data);
    let mut records = Vec::new();

    for item in iter.by_ref() {
        match item {
            Ok(record) => records.push(record),
            Err(err) => match mode {
                RecoveryMode::Strict => return Err(err),
                RecoveryMode::TruncateTail => {
                    warn!(error = %err, "discarding log tail after malformed record");
                    break;
                }
            },
        }
    }

    let valid_len = iter.offset() as u64;
    Ok(Replay {
        records,
        valid_len,
        discarded: data.len() as u64 - valid_len,
    })
}

/// Iterator over log records.
///
/// Yields records until EOF. At the first malformed record it yields one
/// `Error::Corruption` carrying the record's offset, then stops: appends
/// are sequential, so nothing after a bad frame can be trusted.
pub struct WALIterator<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> WALIterator<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        WALIterator {
            data,
            offset: 0,
            failed: false,
        }
    }

    /// Byte offset just past the last record yielded successfully.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for WALIterator<'a> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }

        match LogRecord::decode(&self.data[self.offset..]) {
            Ok((record, size)) => {
                self.offset += size;
                Some(Ok(record))
            }
            Err(source) => {
                self.failed = true;
                Some(Err(Error::Corruption {
                    offset: self.offset as u64,
                    source,
                }))
            }
        }
    }
}
