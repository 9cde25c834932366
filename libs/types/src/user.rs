//! User records and derived pairing state

use crate::ids::{RoomId, UserId};
use crate::search::SearchQueue;
use serde::{Deserialize, Serialize};

/// Persisted per-user record.
///
/// Created lazily on first reference with no room, mutated whenever the
/// user joins or leaves a room, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Room the user currently belongs to, if any
    pub current_room: Option<RoomId>,
}

impl User {
    /// Initial record for a user seen for the first time
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            current_room: None,
        }
    }

    pub fn is_in_room(&self) -> bool {
        self.current_room.is_some()
    }

    /// Point the user at `room`
    pub fn enter(&mut self, room: RoomId) {
        self.current_room = Some(room);
    }

    /// Clear the room reference, returning the room that was left
    pub fn leave(&mut self) -> Option<RoomId> {
        self.current_room.take()
    }
}

/// Pairing state of a user.
///
/// Never stored: derived from `User::current_room` and search-queue
/// membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserState {
    /// No room, not queued
    Idle,
    /// Queued, no room
    Searching,
    /// Has a room
    Paired(RoomId),
}

impl UserState {
    /// Derive the state of `user` against the current queue.
    ///
    /// A room reference takes precedence over queue membership.
    pub fn derive(user: &User, queue: &SearchQueue) -> Self {
        match user.current_room {
            Some(room) => UserState::Paired(room),
            None if queue.contains(user.id) => UserState::Searching,
            None => UserState::Idle,
        }
    }
}
