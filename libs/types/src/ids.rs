//! Identifier types for users and rooms
//!
//! User identifiers are opaque integers handed over by the transport layer.
//! Room identifiers come from the persistent room counter and are never zero:
//! zero is reserved to mean "no room", so [`RoomId`] wraps a `NonZeroU64`
//! and "no room" is spelled `Option<RoomId>::None`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Identifier of a user, supplied by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw integer value
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Big-endian bytes, used as the opaque key identifier
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a conversation room.
///
/// Unique and monotonically assigned by the room allocator. Deserializing a
/// zero value fails, so a corrupt record can never smuggle in the reserved
/// "no room" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(NonZeroU64);

impl RoomId {
    /// Create from a raw counter value, returning None for the reserved zero
    pub const fn new(id: u64) -> Option<Self> {
        match NonZeroU64::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Raw counter value (never zero)
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.get().to_be_bytes()
    }
}

impl TryFrom<u64> for RoomId {
    type Error = ReservedRoomId;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::new(id).ok_or(ReservedRoomId)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when converting the reserved value 0 into a [`RoomId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedRoomId;

impl fmt::Display for ReservedRoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("room id 0 is reserved for \"no room\"")
    }
}

impl std::error::Error for ReservedRoomId {}
