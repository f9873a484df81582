/// Key of a store entry.
pub type Key = String;

/// Value of a store entry.
pub type Value = String;

/// Value delivered to watchers when their key is deleted.
pub const DELETE_SENTINEL: &str = "";

/// The kind of mutation a log record or watch event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Insert or overwrite a key.
    Put = 0x01,
    /// Remove a key. Carries no value.
    Delete = 0x02,
}

impl Command {
    pub(crate) fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Command::Put),
            0x02 => Some(Command::Delete),
            _ => None,
        }
    }
}
