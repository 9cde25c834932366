//! In-memory backend
//!
//! Ordered map behind a `RwLock`. Every call holds the lock for its whole
//! duration, which makes each one atomic; `flush` is a no-op.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::Duration;

use super::KvBackend;
use crate::codec::{decode_counter, encode_counter};
use crate::error::{StorageError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    // The write lock serializes merges, so the deadline never comes into play.
    fn merge_add(&self, key: &[u8], delta: u64, _timeout: Duration) -> StoreResult<u64> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        let current = match entries.get(key) {
            Some(bytes) => decode_counter(bytes)?,
            None => 0,
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StorageError::CounterOverflow { key: key.to_vec() })?;
        entries.insert(key.to_vec(), encode_counter(next).to_vec());
        Ok(next)
    }

    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}
