//! Room section
//!
//! Room creation and teardown.
//!
//! Membership is stored twice: the room lists its members and each member
//! points back at its room. Both directions are kept in step here.
//!
//! Teardown clears members first and deletes the room record last, so an
//! interrupted teardown leaves a room that a retry can finish. Creation has
//! no such guarantee: if the room record cannot be written after members were
//! assigned, those members point at a missing room. Every path that follows a
//! member's room pointer treats a missing room as "no room".

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use persistence::EntityStore;
use tracing::{debug, info, warn};
use types::ids::{RoomId, UserId};
use types::room::Room;

use super::{enter, SearchSection};
use crate::error::{EngineError, EngineResult};
use crate::registry::UserRegistry;

pub struct RoomSection {
    store: EntityStore,
    registry: Arc<UserRegistry>,
    search: Arc<SearchSection>,
    lock: Mutex<()>,
}

impl RoomSection {
    pub fn new(store: EntityStore, registry: Arc<UserRegistry>, search: Arc<SearchSection>) -> Self {
        Self {
            store,
            registry,
            search,
            lock: Mutex::new(()),
        }
    }

    /// Create a room holding `members`, in the given order.
    ///
    /// Any room a member is already in is torn down first, which may evict
    /// users not listed here. Listed members are dropped from the search
    /// queue.
    pub fn add_room(&self, members: &[UserId]) -> EngineResult<RoomId> {
        validate_members(members)?;

        let _section = enter(&self.lock);
        let room_id = self.store.allocator().next_room_id()?;

        for &member in members {
            let mut user = self.registry.get_or_create(member)?;

            if let Some(previous) = user.current_room {
                match self.teardown(previous) {
                    Ok(evicted) => {
                        debug!(user = %member, room = %previous, evicted = evicted.len(), "Left previous room");
                    }
                    Err(EngineError::RoomNotFound(_)) => {
                        debug!(user = %member, room = %previous, "Ignoring stale room pointer");
                    }
                    Err(e) => return Err(e),
                }
                // Teardown rewrote the record
                user = self.registry.get_or_create(member)?;
            }

            user.enter(room_id);
            self.registry.save(&user)?;
            self.search.unsearch(member)?;
        }

        self.store.put_room(&Room::new(room_id, members.to_vec()))?;
        info!(room = %room_id, members = members.len(), "Room created");
        Ok(room_id)
    }

    /// Tear a room down, returning everyone who was listed in it.
    pub fn del_room(&self, room_id: RoomId) -> EngineResult<Vec<UserId>> {
        let _section = enter(&self.lock);
        self.teardown(room_id)
    }

    pub fn get_room(&self, room_id: RoomId) -> EngineResult<Room> {
        self.store
            .room(room_id)?
            .ok_or(EngineError::RoomNotFound(room_id))
    }

    pub fn is_room_exist(&self, room_id: RoomId) -> EngineResult<bool> {
        match self.get_room(room_id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    // Caller holds the section.
    fn teardown(&self, room_id: RoomId) -> EngineResult<Vec<UserId>> {
        let room = self.get_room(room_id)?;

        for &member in &room.members {
            match self.registry.find(member)? {
                Some(mut user) if user.current_room == Some(room_id) => {
                    user.leave();
                    self.registry.save(&user)?;
                }
                Some(user) => {
                    debug!(user = %member, room = %room_id, now_in = ?user.current_room, "Member already moved on");
                }
                None => {
                    warn!(user = %member, room = %room_id, "Room member has no user record");
                }
            }
        }

        self.store.delete_room(room_id)?;
        info!(room = %room_id, members = room.members.len(), "Room torn down");
        Ok(room.members)
    }
}

fn validate_members(members: &[UserId]) -> EngineResult<()> {
    if members.is_empty() {
        return Err(EngineError::EmptyRoom);
    }
    let mut seen = HashSet::with_capacity(members.len());
    for &member in members {
        if !seen.insert(member) {
            return Err(EngineError::DuplicateMember(member));
        }
    }
    Ok(())
}
