//! Error types for KeyValue operations.

use common::StorageError;

/// Error type for KeyValue operations.
///
/// Every variant is reported identically at the C boundary: a failure status
/// plus the `Display` text in the last-error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The handle does not name an open store.
    InvalidHandle(u64),

    /// The store could not be opened (directory, configuration, or engine).
    Open(String),

    /// A point read missed.
    NotFound,

    /// A batch or scan payload could not be decoded, or a key is empty or
    /// longer than [`crate::MAX_KEY_LEN`].
    MalformedInput(String),

    /// A batch record carried an opcode other than set or delete.
    UnknownOperation(u8),

    /// A result buffer could not be allocated.
    AllocationFailed(String),

    /// Errors raised by the storage engine, text preserved verbatim.
    Storage(String),

    /// Internal errors indicating bugs or invariant violations.
    Internal(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidHandle(handle) => write!(f, "invalid handle: {}", handle),
            Error::Open(msg) => write!(f, "failed to open store: {}", msg),
            Error::NotFound => write!(f, "key not found"),
            Error::MalformedInput(msg) => write!(f, "malformed input: {}", msg),
            Error::UnknownOperation(code) => write!(f, "unknown operation code: {}", code),
            Error::AllocationFailed(msg) => write!(f, "allocation failed: {}", msg),
            Error::Storage(msg) => write!(f, "{}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl Error {
    /// Wraps a native engine error, keeping its message as-is.
    pub fn from_storage(e: impl std::fmt::Display) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Storage(msg) => Error::Storage(msg),
            StorageError::Internal(msg) => Error::Internal(msg),
        }
    }
}

impl From<fjall::Error> for Error {
    fn from(err: fjall::Error) -> Self {
        Error::from_storage(err)
    }
}

/// Result type alias for KeyValue operations.
pub type Result<T> = std::result::Result<T, Error>;
