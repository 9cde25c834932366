//! sled-backed storage
//!
//! Every call maps onto one atomic sled operation. The merge primitive is a
//! compare-and-swap loop: a lost race re-reads the winner's value from the
//! CAS error and retries until it succeeds or the deadline passes.
//!
//! sled releases its directory lock from a background thread after the last
//! handle is dropped, so an open that follows a close of the same path may
//! briefly find the lock still held. `open` waits for it, bounded by
//! [`OPEN_LOCK_WAIT`].

use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::KvBackend;
use crate::codec::{decode_counter, encode_counter};
use crate::error::{StorageError, StoreResult};

/// Longest `open` waits for a previous holder to release the lock.
pub const OPEN_LOCK_WAIT: Duration = Duration::from_secs(5);

const OPEN_BACKOFF_START: Duration = Duration::from_millis(5);
const OPEN_BACKOFF_MAX: Duration = Duration::from_millis(100);

pub struct SledBackend {
    db: sled::Db,
}

impl SledBackend {
    /// Open (or create) the database under `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_within(path, OPEN_LOCK_WAIT)
    }

    /// Open, retrying while the directory lock is held elsewhere for at
    /// most `wait`.
    pub fn open_within(path: &Path, wait: Duration) -> StoreResult<Self> {
        let started = Instant::now();
        let mut backoff = OPEN_BACKOFF_START;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match sled::open(path) {
                Ok(db) => {
                    info!(
                        path = %path.display(),
                        recovered = db.was_recovered(),
                        attempts,
                        "Opened sled store"
                    );
                    return Ok(Self { db });
                }
                Err(err) if is_lock_contention(&err) && started.elapsed() < wait => {
                    debug!(path = %path.display(), attempts, "sled lock still held, retrying");
                    thread::sleep(backoff);
                    backoff = (backoff * 2).min(OPEN_BACKOFF_MAX);
                }
                Err(err) => {
                    if is_lock_contention(&err) {
                        warn!(path = %path.display(), waited = ?started.elapsed(), "Gave up waiting for sled lock");
                    }
                    return Err(err.into());
                }
            }
        }
    }
}

// sled 0.34 wraps the failed `try_lock_exclusive` in an `Other` io error.
fn is_lock_contention(err: &sled::Error) -> bool {
    match err {
        sled::Error::Io(e) => {
            e.kind() == io::ErrorKind::WouldBlock
                || e.to_string().contains("could not acquire lock")
        }
        _ => false,
    }
}

impl KvBackend for SledBackend {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.db.remove(key)?.is_some())
    }

    fn merge_add(&self, key: &[u8], delta: u64, timeout: Duration) -> StoreResult<u64> {
        let started = Instant::now();
        let mut current = self.db.get(key)?;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let value = match &current {
                Some(bytes) => decode_counter(bytes)?,
                None => 0,
            };
            let next = value
                .checked_add(delta)
                .ok_or_else(|| StorageError::CounterOverflow { key: key.to_vec() })?;
            let proposed = encode_counter(next);

            match self
                .db
                .compare_and_swap(key, current.as_ref(), Some(&proposed[..]))?
            {
                Ok(()) => {
                    if attempts > 1 {
                        debug!(attempts, value = next, "Merge settled after contention");
                    }
                    return Ok(next);
                }
                Err(conflict) => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        return Err(StorageError::MergeTimeout {
                            key: key.to_vec(),
                            waited,
                        }
                        .into());
                    }
                    current = conflict.current;
                    thread::yield_now();
                }
            }
        }
    }

    fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}
