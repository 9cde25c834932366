//! Room records

use crate::ids::{RoomId, UserId};
use serde::{Deserialize, Serialize};

/// A conversation room and its ordered member list.
///
/// Invariant: every member's `User::current_room` equals `id` while the
/// record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub members: Vec<UserId>,
}

impl Room {
    pub fn new(id: RoomId, members: Vec<UserId>) -> Self {
        Self { id, members }
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    /// Members other than `user`, in member order
    pub fn others(&self, user: UserId) -> impl Iterator<Item = UserId> + '_ {
        self.members.iter().copied().filter(move |m| *m != user)
    }
}
