use crate::error::DecodeError;
use crate::types::{Command, DELETE_SENTINEL, Key, Value};

/// A single mutation in the log.
///
/// On-disk format:
/// ```text
/// ┌──────────┬─────────┬─────────┬────────────┬───────────┬───────────┐
/// │ CRC (4B) │ Len (4B)│ Cmd (1B)│ Key Len(4B)│ Key (var) │ Val (var) │
/// └──────────┴─────────┴─────────┴────────────┴───────────┴───────────┘
/// ```
///
/// Len counts everything after the Len field, so each frame is
/// self-delimiting. CRC covers everything after the CRC field itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub command: Command,
    pub key: Key,
    pub value: Value,
}

const CRC_SIZE: usize = 4;
const LEN_SIZE: usize = 4;
const CMD_SIZE: usize = 1;
const KEY_LEN_SIZE: usize = 4;
/// Size of a frame with an empty key and value.
pub const HEADER_SIZE: usize = CRC_SIZE + LEN_SIZE + CMD_SIZE + KEY_LEN_SIZE;

impl LogRecord {
    /// Create a Put record.
    pub fn put(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        LogRecord {
            command: Command::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete record. Its value is always empty.
    pub fn delete(key: impl Into<Key>) -> Self {
        LogRecord {
            command: Command::Delete,
            key: key.into(),
            value: DELETE_SENTINEL.to_owned(),
        }
    }

    fn value_bytes(&self) -> &[u8] {
        match self.command {
            Command::Put => self.value.as_bytes(),
            Command::Delete => &[],
        }
    }

    /// Serialize this record to a complete frame, CRC included.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_size());
        self.encode_into(&mut buf);
        buf
    }

    /// Append this record's frame to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        let key = self.key.as_bytes();
        let value = self.value_bytes();
        let payload_len = CMD_SIZE + KEY_LEN_SIZE + key.len() + value.len();
        let start = buf.len();

        // CRC placeholder, filled once the payload is in place
        buf.extend_from_slice(&[0u8; CRC_SIZE]);
        buf.extend_from_slice(&(payload_len as u32).to_le_bytes());
        buf.push(self.command as u8);
        buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
        buf.extend_from_slice(key);
        buf.extend_from_slice(value);

        let crc = crc32fast::hash(&buf[start + CRC_SIZE..]);
        buf[start..start + CRC_SIZE].copy_from_slice(&crc.to_le_bytes());
    }

    /// Decode the frame at the start of `data`.
    ///
    /// Returns the record and the number of bytes it occupied. Trailing
    /// bytes after the frame are left alone.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        if data.len() < HEADER_SIZE {
            return Err(DecodeError::Truncated {
                needed: HEADER_SIZE,
                available: data.len(),
            });
        }

        let stored = read_u32(data, 0);
        let payload_len = read_u32(data, CRC_SIZE) as usize;

        let total_len = CRC_SIZE + LEN_SIZE + payload_len;
        if data.len() < total_len {
            return Err(DecodeError::Truncated {
                needed: total_len,
                available: data.len(),
            });
        }

        let computed = crc32fast::hash(&data[CRC_SIZE..total_len]);
        if stored != computed {
            return Err(DecodeError::ChecksumMismatch { stored, computed });
        }

        // A valid CRC over a too-short payload is still malformed.
        if payload_len < CMD_SIZE + KEY_LEN_SIZE {
            return Err(DecodeError::KeyOutOfBounds);
        }

        let mut offset = CRC_SIZE + LEN_SIZE;
        let command =
            Command::from_u8(data[offset]).ok_or(DecodeError::InvalidCommand(data[offset]))?;
        offset += CMD_SIZE;

        let key_len = read_u32(data, offset) as usize;
        offset += KEY_LEN_SIZE;

        let key_end = offset
            .checked_add(key_len)
            .filter(|end| *end <= total_len)
            .ok_or(DecodeError::KeyOutOfBounds)?;

        let key = std::str::from_utf8(&data[offset..key_end])
            .map_err(|_| DecodeError::InvalidUtf8)?
            .to_owned();

        let value = match command {
            Command::Put => std::str::from_utf8(&data[key_end..total_len])
                .map_err(|_| DecodeError::InvalidUtf8)?
                .to_owned(),
            Command::Delete => DELETE_SENTINEL.to_owned(),
        };

        Ok((
            LogRecord {
                command,
                key,
                value,
            },
            total_len,
        ))
    }

    /// Size of this record when serialized.
    pub fn encoded_size(&self) -> usize {
        HEADER_SIZE + self.key.len() + self.value_bytes().len()
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[at..at + 4]);
    u32::from_le_bytes(bytes)
}
