//! Room Allocator
//!
//! Room identifiers come from a single persisted counter advanced with the
//! backend's atomic merge primitive, so concurrent callers never observe the
//! same value and the sequence survives restarts.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use types::ids::RoomId;

use crate::backend::KvBackend;
use crate::codec::decode_counter;
use crate::config::SyncPolicy;
use crate::error::{DecodeError, StoreResult};
use crate::keys;

#[derive(Clone)]
pub struct RoomAllocator {
    backend: Arc<dyn KvBackend>,
    key: Vec<u8>,
    merge_timeout: Duration,
    sync_policy: SyncPolicy,
}

impl RoomAllocator {
    pub fn new(backend: Arc<dyn KvBackend>, merge_timeout: Duration, sync_policy: SyncPolicy) -> Self {
        Self {
            backend,
            key: keys::room_count(),
            merge_timeout,
            sync_policy,
        }
    }

    /// Advance the counter by one and return the post-increment value.
    ///
    /// Never returns the reserved zero. A merge timeout or engine failure is
    /// returned as-is; no identifier is handed out in that case.
    pub fn next_room_id(&self) -> StoreResult<RoomId> {
        let value = self.backend.merge_add(&self.key, 1, self.merge_timeout)?;
        if self.sync_policy == SyncPolicy::EveryWrite {
            self.backend.flush()?;
        }
        debug!(room_id = value, "Allocated room id");
        // merge_add(+1) on an unsigned counter cannot yield zero
        RoomId::new(value)
            .ok_or_else(|| DecodeError::Malformed("room counter produced 0".into()).into())
    }

    /// Current counter value; 0 when nothing was ever allocated.
    pub fn current(&self) -> StoreResult<u64> {
        match self.backend.get(&self.key)? {
            Some(bytes) => Ok(decode_counter(&bytes)?),
            None => Ok(0),
        }
    }
}
