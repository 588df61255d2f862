use std::io;

use crate::containers::{DIRECTORY_SIZE, ENTRY_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("directory record must be {} bytes, got {len}", ENTRY_SIZE)]
    MalformedEntry { len: usize },
    #[error("{field} value {value} does not fit in {bits} bits")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        bits: u32,
    },
    #[error("directory needs {} bytes, only {available} available", DIRECTORY_SIZE)]
    TruncatedDirectory { available: usize },
    #[error("payload needs {expected} bytes, only {available} available")]
    ShortRead { expected: usize, available: usize },
    #[error("entry index {0} is outside the directory")]
    IndexOutOfRange(usize),
    #[error("entry {index} records {recorded} bytes but carries a {payload} byte payload")]
    LengthMismatch {
        index: usize,
        recorded: u32,
        payload: usize,
    },
    #[error("no start-of-frame marker found, image dimensions unknown")]
    MissingDimensions,
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Per-entry problems that let the rest of a container be processed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::ShortRead { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
