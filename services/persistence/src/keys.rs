//! Key encoding for the flat keyspace
//!
//! # Layout
//! ```text
//! [prefix_len: u8][prefix: bytes][identifier: bytes]
//! ```
//!
//! The identifier is opaque. Since the prefix length is explicit, an
//! identifier can never make a key of one prefix look like a key of another
//! (`"room" + "count…"` and `"roomcount"` encode differently).

use types::ids::{RoomId, UserId};

/// Entity partitions of the keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    User,
    Search,
    Room,
    RoomCount,
}

impl Prefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Prefix::User => "user",
            Prefix::Search => "search",
            Prefix::Room => "room",
            Prefix::RoomCount => "roomcount",
        }
    }
}

/// Encode `prefix` + `identifier` into a storage key.
pub fn encode(prefix: Prefix, identifier: &[u8]) -> Vec<u8> {
    let name = prefix.as_str().as_bytes();
    let mut key = Vec::with_capacity(1 + name.len() + identifier.len());
    key.push(name.len() as u8);
    key.extend_from_slice(name);
    key.extend_from_slice(identifier);
    key
}

pub fn user(id: UserId) -> Vec<u8> {
    encode(Prefix::User, &id.to_be_bytes())
}

pub fn room(id: RoomId) -> Vec<u8> {
    encode(Prefix::Room, &id.to_be_bytes())
}

/// The single search-queue record
pub fn search() -> Vec<u8> {
    encode(Prefix::Search, &[])
}

/// The single room counter
pub fn room_count() -> Vec<u8> {
    encode(Prefix::RoomCount, &[])
}

/// Split a key back into its prefix name and identifier.
///
/// Returns None for bytes that are not a well-formed key.
pub fn split(key: &[u8]) -> Option<(&str, &[u8])> {
    let (&len, rest) = key.split_first()?;
    let len = len as usize;
    if rest.len() < len {
        return None;
    }
    let (name, identifier) = rest.split_at(len);
    Some((std::str::from_utf8(name).ok()?, identifier))
}
