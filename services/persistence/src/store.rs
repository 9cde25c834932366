//! Typed entity store
//!
//! Reads and writes `User`, `Room`, and `SearchQueue` records through the
//! codec and a [`KvBackend`]. Every method is a single backend call (plus a
//! flush under `SyncPolicy::EveryWrite`); combining them into consistent
//! multi-step updates is the caller's job.

use std::sync::Arc;

use tracing::{error, info};
use types::ids::{RoomId, UserId};
use types::room::Room;
use types::search::SearchQueue;
use types::user::User;

use crate::allocator::RoomAllocator;
use crate::backend::{self, KvBackend};
use crate::codec::{self, Record};
use crate::config::{StoreConfig, SyncPolicy};
use crate::error::{StoreError, StoreResult};
use crate::keys;

#[derive(Clone)]
pub struct EntityStore {
    backend: Arc<dyn KvBackend>,
    allocator: RoomAllocator,
    sync_policy: SyncPolicy,
}

impl EntityStore {
    /// Open the backend described by `config` and make sure the search
    /// queue record exists.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let backend = backend::open(config)?;
        let store = Self::with_backend(backend, config);
        store.init_search_queue()?;
        info!(engine = ?config.engine, path = %config.path.display(), "Entity store ready");
        Ok(store)
    }

    /// Wrap an already-constructed backend.
    pub fn with_backend(backend: Arc<dyn KvBackend>, config: &StoreConfig) -> Self {
        let allocator =
            RoomAllocator::new(Arc::clone(&backend), config.merge_timeout, config.sync_policy);
        Self {
            backend,
            allocator,
            sync_policy: config.sync_policy,
        }
    }

    /// Flush outstanding writes. Dropping the last clone releases the engine.
    pub fn close(self) -> StoreResult<()> {
        self.backend.flush()?;
        info!("Entity store closed");
        Ok(())
    }

    pub fn allocator(&self) -> &RoomAllocator {
        &self.allocator
    }

    // ── Users ───────────────────────────────────────────────────────

    pub fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.read(&keys::user(id))
    }

    pub fn put_user(&self, user: &User) -> StoreResult<()> {
        self.write(&keys::user(user.id), user)
    }

    // ── Rooms ───────────────────────────────────────────────────────

    pub fn room(&self, id: RoomId) -> StoreResult<Option<Room>> {
        self.read(&keys::room(id))
    }

    pub fn put_room(&self, room: &Room) -> StoreResult<()> {
        self.write(&keys::room(room.id), room)
    }

    /// Returns whether the room record existed.
    pub fn delete_room(&self, id: RoomId) -> StoreResult<bool> {
        let existed = self.backend.delete(&keys::room(id))?;
        self.after_write()?;
        Ok(existed)
    }

    // ── Search queue ────────────────────────────────────────────────

    /// The persisted queue; an absent record reads as empty.
    pub fn search_queue(&self) -> StoreResult<SearchQueue> {
        Ok(self.read(&keys::search())?.unwrap_or_default())
    }

    pub fn put_search_queue(&self, queue: &SearchQueue) -> StoreResult<()> {
        self.write(&keys::search(), queue)
    }

    fn init_search_queue(&self) -> StoreResult<()> {
        if self.backend.get(&keys::search())?.is_none() {
            self.put_search_queue(&SearchQueue::new())?;
        }
        Ok(())
    }

    // ── Internal Helpers ────────────────────────────────────────────

    fn read<T: Record>(&self, key: &[u8]) -> StoreResult<Option<T>> {
        let Some(bytes) = self.backend.get(key)? else {
            return Ok(None);
        };
        match codec::decode(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                error!(key = ?keys::split(key), error = %err, "Corrupt record in store");
                Err(StoreError::Decode(err))
            }
        }
    }

    fn write<T: Record>(&self, key: &[u8], record: &T) -> StoreResult<()> {
        let bytes = codec::encode(record)?;
        self.backend.set(key, &bytes)?;
        self.after_write()
    }

    fn after_write(&self) -> StoreResult<()> {
        if self.sync_policy == SyncPolicy::EveryWrite {
            self.backend.flush()?;
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
