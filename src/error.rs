use std::io;
use std::time::Duration;

/// Unified error type for the store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error from log file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A log record could not be decoded during replay.
    #[error("corrupt log record at offset {offset}: {source}")]
    Corruption {
        /// Byte offset of the first bad record.
        offset: u64,
        #[source]
        source: DecodeError,
    },

    /// Configuration could not be loaded or deserialized.
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// A watch did not fire within the caller's deadline.
    #[error("watch timed out after {0:?}")]
    WatchTimeout(Duration),

    /// The watch can no longer deliver: the store is gone, or the single
    /// value has already been taken.
    #[error("watch closed before delivery")]
    WatchClosed,
}

/// Why a single log record failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes remain than the header or the declared length needs.
    #[error("record truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("CRC mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("invalid command byte: {0:#04x}")]
    InvalidCommand(u8),

    #[error("key length exceeds record")]
    KeyOutOfBounds,

    #[error("key or value is not valid UTF-8")]
    InvalidUtf8,
}

/// Result type alias used throughout the store.
pub type Result<T> = std::result::Result<T, Error>;
