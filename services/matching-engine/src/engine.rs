//! Matching engine core
//!
//! Main coordinator: owns the store, the user registry and the two
//! exclusive sections. Shared between worker threads behind an `Arc`.

use std::sync::Arc;

use persistence::{EntityStore, StoreConfig};
use tracing::info;
use types::ids::{RoomId, UserId};
use types::room::Room;
use types::search::SearchQueue;
use types::user::{User, UserState};

use crate::error::EngineResult;
use crate::registry::UserRegistry;
use crate::sections::{RoomSection, SearchSection};

/// Main matching engine
pub struct MatchingEngine {
    store: EntityStore,
    registry: Arc<UserRegistry>,
    search: Arc<SearchSection>,
    rooms: RoomSection,
}

impl MatchingEngine {
    /// Open (or create) the store described by `config`.
    pub fn open(config: &StoreConfig) -> EngineResult<Self> {
        let store = EntityStore::open(config)?;
        Ok(Self::from_store(store))
    }

    /// Build an engine over an already opened store.
    pub fn from_store(store: EntityStore) -> Self {
        let registry = Arc::new(UserRegistry::new(store.clone()));
        let search = Arc::new(SearchSection::new(store.clone()));
        let rooms = RoomSection::new(store.clone(), Arc::clone(&registry), Arc::clone(&search));
        Self {
            store,
            registry,
            search,
            rooms,
        }
    }

    /// Flush and release the store.
    pub fn close(self) -> EngineResult<()> {
        let counter = self.store.allocator().current()?;
        self.store.close()?;
        info!(room_counter = counter, "Matching engine closed");
        Ok(())
    }

    // ── Users ──

    pub fn get_or_create_user(&self, id: UserId) -> EngineResult<User> {
        self.registry.get_or_create(id)
    }

    /// Same as [`get_or_create_user`](Self::get_or_create_user).
    pub fn get_user(&self, id: UserId) -> EngineResult<User> {
        self.registry.get_or_create(id)
    }

    /// Idle, searching or paired. A pointer to a room that no longer exists
    /// counts as not paired.
    pub fn user_state(&self, id: UserId) -> EngineResult<UserState> {
        let mut user = self.registry.get_or_create(id)?;
        if let Some(room) = user.current_room {
            if !self.rooms.is_room_exist(room)? {
                user.leave();
            }
        }
        let queue = self.search.snapshot()?;
        Ok(UserState::derive(&user, &queue))
    }

    // ── Search ──

    /// Pair `user` with the longest-waiting searcher, or queue it.
    ///
    /// A non-empty result means the caller should now create a room from the
    /// returned users plus `user`.
    pub fn search(&self, user: UserId) -> EngineResult<Vec<UserId>> {
        self.search.search(user)
    }

    pub fn unsearch(&self, user: UserId) -> EngineResult<()> {
        self.search.unsearch(user)?;
        Ok(())
    }

    pub fn is_searching(&self, user: UserId) -> EngineResult<bool> {
        self.search.is_searching(user)
    }

    pub fn search_queue(&self) -> EngineResult<SearchQueue> {
        self.search.snapshot()
    }

    // ── Rooms ──

    pub fn add_room(&self, members: &[UserId]) -> EngineResult<RoomId> {
        self.rooms.add_room(members)
    }

    pub fn del_room(&self, room: RoomId) -> EngineResult<Vec<UserId>> {
        self.rooms.del_room(room)
    }

    pub fn get_room(&self, room: RoomId) -> EngineResult<Room> {
        self.rooms.get_room(room)
    }

    pub fn is_room_exist(&self, room: RoomId) -> EngineResult<bool> {
        self.rooms.is_room_exist(room)
    }

    /// Last allocated room ID, 0 before the first room.
    pub fn room_counter(&self) -> EngineResult<u64> {
        Ok(self.store.allocator().current()?)
    }
}
