//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound on how long a merge may wait before reporting a timeout.
pub const DEFAULT_MERGE_TIMEOUT: Duration = Duration::from_millis(200);

/// Which storage engine backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Embedded on-disk sled database
    #[default]
    Sled,
    /// Process-local map; nothing survives the process
    Memory,
}

/// Controls when committed writes are flushed to durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Flush after every mutating operation.
    #[default]
    EveryWrite,
    /// Flush only when the store is closed.
    OnClose,
}

/// Configuration for opening an [`EntityStore`](crate::EntityStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the database files (ignored for `Memory`).
    pub path: PathBuf,
    pub engine: EngineKind,
    /// Bounded wait for the atomic merge primitive.
    pub merge_timeout: Duration,
    pub sync_policy: SyncPolicy,
}

impl StoreConfig {
    /// On-disk store at `path` with sensible defaults.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            engine: EngineKind::Sled,
            merge_timeout: DEFAULT_MERGE_TIMEOUT,
            sync_policy: SyncPolicy::EveryWrite,
        }
    }

    /// Ephemeral store, mainly for tests.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            engine: EngineKind::Memory,
            merge_timeout: DEFAULT_MERGE_TIMEOUT,
            sync_policy: SyncPolicy::OnClose,
        }
    }
}
