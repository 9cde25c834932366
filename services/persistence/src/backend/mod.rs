//! Key-Value Transaction Layer
//!
//! A small capability interface over an embedded, ordered key-value engine.
//! Each call is individually atomic. Read-modify-write sequences spanning
//! several calls are NOT atomic and must be serialized by the caller; the
//! only primitive safe to race is [`KvBackend::merge_add`].

pub mod memory;
pub mod sled_backend;

pub use self::memory::MemoryBackend;
pub use self::sled_backend::SledBackend;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{EngineKind, StoreConfig};
use crate::error::StoreResult;

/// Capability interface implemented by every storage engine.
pub trait KvBackend: Send + Sync {
    /// Read a value. `None` means the key does not exist.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Insert or overwrite a value.
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Delete a key. Returns whether it existed.
    fn delete(&self, key: &[u8]) -> StoreResult<bool>;

    /// Atomically add `delta` to the big-endian `u64` counter at `key`
    /// (absent counts as 0) and return the new value.
    ///
    /// The delta is applied exactly once even under concurrent callers.
    /// Waiting for the merge to settle is bounded by `timeout`.
    fn merge_add(&self, key: &[u8], delta: u64, timeout: Duration) -> StoreResult<u64>;

    /// Make all committed writes durable.
    fn flush(&self) -> StoreResult<()>;
}

/// Construct the backend selected by `config.engine`.
pub fn open(config: &StoreConfig) -> StoreResult<Arc<dyn KvBackend>> {
    match config.engine {
        EngineKind::Sled => Ok(Arc::new(SledBackend::open(&config.path)?)),
        EngineKind::Memory => Ok(Arc::new(MemoryBackend::new())),
    }
}
