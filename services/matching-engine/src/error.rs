//! Engine errors

use persistence::{DecodeError, StorageError, StoreError};
use thiserror::Error;
use types::ids::{RoomId, UserId};

#[derive(Error, Debug)]
pub enum EngineError {
    /// Expected outcome of lookups; not a failure to log.
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// Business-rule violation reported back to the user.
    #[error("User {0} is already searching")]
    AlreadySearching(UserId),

    #[error("A room needs at least one member")]
    EmptyRoom,

    #[error("User {0} listed more than once for the same room")]
    DuplicateMember(UserId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Stored data is corrupt.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Storage(e) => EngineError::Storage(e),
            StoreError::Decode(e) => EngineError::Decode(e),
        }
    }
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::RoomNotFound(_))
    }

    /// Storage and decode failures abort the operation; the rest are
    /// ordinary outcomes the caller reports to the user.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Storage(_) | EngineError::Decode(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
