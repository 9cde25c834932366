//! Persistence Service
//!
//! Durable state for the pairing engine: a small key-value capability
//! interface with swappable backends, a checksummed entity codec, the
//! room-ID allocator, and a typed entity store on top of them.
//!
//! # Layers
//! - `backend`: `KvBackend` trait with sled and in-memory variants
//! - `keys`: length-prefixed key encoding for the flat keyspace
//! - `codec`: versioned, CRC32C-protected record envelope
//! - `allocator`: monotonic room identifiers via the merge primitive
//! - `store`: typed reads and writes of users, rooms, and the search queue

pub mod allocator;
pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod keys;
pub mod store;

pub use allocator::RoomAllocator;
pub use backend::KvBackend;
pub use config::{EngineKind, StoreConfig, SyncPolicy, DEFAULT_MERGE_TIMEOUT};
pub use error::{DecodeError, StorageError, StoreError, StoreResult};
pub use store::EntityStore;
