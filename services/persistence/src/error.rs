//! Error taxonomy for the persistence layer
//!
//! Two failure families reach callers: `StorageError` (the engine could not
//! do what was asked) and `DecodeError` (a stored record is corrupt or of
//! the wrong shape). A missing key is not an error at this layer: reads
//! return `Option`.

use std::time::Duration;
use thiserror::Error;

/// Underlying engine failure. Fatal to the operation, retryable by the
/// transport layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Merge on key {key:?} did not settle within {waited:?}")]
    MergeTimeout { key: Vec<u8>, waited: Duration },

    #[error("Counter at key {key:?} would overflow")]
    CounterOverflow { key: Vec<u8> },

    #[error("Backend lock poisoned")]
    Poisoned,
}

/// Stored bytes could not be turned back into a record. Indicates data
/// corruption; never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Truncated record: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Unsupported record version: {0}")]
    UnsupportedVersion(u8),

    #[error("Record kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: u8, found: u8 },

    #[error("Checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// Everything the store can return.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Storage(StorageError::Backend(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
