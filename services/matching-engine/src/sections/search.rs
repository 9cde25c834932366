//! Search section
//!
//! The FIFO pairing queue.
//!
//! `search` either pairs the caller with the longest-waiting searcher or
//! parks the caller at the tail. Pairing pops the head and returns it; the
//! caller then forms the room itself.

use std::sync::Mutex;

use persistence::EntityStore;
use tracing::debug;
use types::ids::UserId;
use types::search::SearchQueue;

use super::enter;
use crate::error::{EngineError, EngineResult};

pub struct SearchSection {
    store: EntityStore,
    lock: Mutex<()>,
}

impl SearchSection {
    pub fn new(store: EntityStore) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Pair `user` or enqueue it.
    ///
    /// Returns the matched users (currently at most one, the queue head), or
    /// an empty list when `user` is now waiting. Fails with
    /// `AlreadySearching` without touching the queue if `user` is queued.
    pub fn search(&self, user: UserId) -> EngineResult<Vec<UserId>> {
        let _section = enter(&self.lock);
        let mut queue = self.store.search_queue()?;

        if queue.contains(user) {
            return Err(EngineError::AlreadySearching(user));
        }

        if let Some(head) = queue.pop_front() {
            self.store.put_search_queue(&queue)?;
            debug!(user = %user, matched = %head, waiting = queue.len(), "Search matched");
            return Ok(vec![head]);
        }

        queue.enqueue(user);
        self.store.put_search_queue(&queue)?;
        debug!(user = %user, "Search queued");
        Ok(Vec::new())
    }

    /// Remove `user` from the queue. Returns whether it was queued; absence
    /// is not an error.
    pub fn unsearch(&self, user: UserId) -> EngineResult<bool> {
        let _section = enter(&self.lock);
        let mut queue = self.store.search_queue()?;
        if !queue.remove(user) {
            return Ok(false);
        }
        self.store.put_search_queue(&queue)?;
        debug!(user = %user, waiting = queue.len(), "Search cancelled");
        Ok(true)
    }

    pub fn is_searching(&self, user: UserId) -> EngineResult<bool> {
        let _section = enter(&self.lock);
        Ok(self.store.search_queue()?.contains(user))
    }

    /// Consistent copy of the whole queue
    pub fn snapshot(&self) -> EngineResult<SearchQueue> {
        let _section = enter(&self.lock);
        Ok(self.store.search_queue()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::StoreConfig;

    fn section() -> SearchSection {
        SearchSection::new(EntityStore::open(&StoreConfig::in_memory()).unwrap())
    }

    fn uid(id: i64) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn test_first_searcher_waits() {
        let section = section();
        assert!(section.search(uid(1)).unwrap().is_empty());
        assert!(section.is_searching(uid(1)).unwrap());
    }

    #[test]
    fn test_second_searcher_pops_head_without_enqueueing() {
        let section = section();
        section.search(uid(1)).unwrap();
        assert_eq!(section.search(uid(2)).unwrap(), vec![uid(1)]);
        assert!(section.snapshot().unwrap().is_empty());
        assert!(!section.is_searching(uid(2)).unwrap());
    }

    #[test]
    fn test_duplicate_search_rejected() {
        let section = section();
        section.search(uid(1)).unwrap();
        assert!(matches!(
            section.search(uid(1)),
            Err(EngineError::AlreadySearching(u)) if u == uid(1)
        ));
        assert_eq!(section.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_unsearch_is_idempotent() {
        let section = section();
        section.search(uid(1)).unwrap();
        assert!(section.unsearch(uid(1)).unwrap());
        assert!(!section.unsearch(uid(1)).unwrap());
        assert!(!section.is_searching(uid(1)).unwrap());
    }
}
