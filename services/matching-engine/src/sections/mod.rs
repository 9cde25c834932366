//! Exclusive sections
//!
//! The storage layer makes single calls atomic, not the read-modify-write
//! sequences built from them. Two coarse sections serialize those:
//!
//! - [`SearchSection`]: `search`, `unsearch`, `is_searching`
//! - [`RoomSection`]: `add_room`, `del_room`
//!
//! The sections run concurrently with each other. Lock order is fixed: the
//! room section may enter the search section, never the reverse.

pub mod room;
pub mod search;

pub use room::RoomSection;
pub use search::SearchSection;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Enter a section. The mutex guards no data of its own (all state lives in
/// the store), so a poisoned lock is safe to take over.
pub(crate) fn enter(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
