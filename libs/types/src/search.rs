//! FIFO search queue
//!
//! A single persisted sequence of users waiting to be paired. The head is
//! the longest-waiting searcher. A user appears at most once.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Stored as a plain sequence. Decoding rejects a sequence that lists a user
/// twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<UserId>", into = "Vec<UserId>")]
pub struct SearchQueue {
    waiting: VecDeque<UserId>,
}

impl SearchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.waiting.contains(&user)
    }

    /// Append `user` to the tail.
    ///
    /// Returns false without modifying the queue when `user` is already
    /// waiting.
    pub fn enqueue(&mut self, user: UserId) -> bool {
        if self.contains(user) {
            return false;
        }
        self.waiting.push_back(user);
        true
    }

    /// Remove and return the longest-waiting user
    pub fn pop_front(&mut self) -> Option<UserId> {
        self.waiting.pop_front()
    }

    /// Remove `user` wherever it sits. Returns whether it was present.
    pub fn remove(&mut self, user: UserId) -> bool {
        match self.waiting.iter().position(|u| *u == user) {
            Some(index) => {
                self.waiting.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.waiting.iter().copied()
    }
}

/// A decoded queue listed the same user more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateSearcher(pub UserId);

impl fmt::Display for DuplicateSearcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {} appears more than once in the search queue", self.0)
    }
}

impl std::error::Error for DuplicateSearcher {}

impl TryFrom<Vec<UserId>> for SearchQueue {
    type Error = DuplicateSearcher;

    fn try_from(users: Vec<UserId>) -> Result<Self, Self::Error> {
        let mut queue = SearchQueue::new();
        for user in users {
            if !queue.enqueue(user) {
                return Err(DuplicateSearcher(user));
            }
        }
        Ok(queue)
    }
}

impl From<SearchQueue> for Vec<UserId> {
    fn from(queue: SearchQueue) -> Self {
        queue.waiting.into()
    }
}

impl FromIterator<UserId> for SearchQueue {
    /// Builds a queue keeping the first occurrence of each user
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        let mut queue = SearchQueue::new();
        for user in iter {
            queue.enqueue(user);
        }
        queue
    }
}
