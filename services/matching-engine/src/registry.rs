//! User Registry
//!
//! Users are registered lazily: the first lookup of an unseen ID writes the
//! initial record. Creation is double-checked under a mutex so an initial
//! record can never land on top of a record another thread already wrote
//! (for example one that was just assigned a room).

use std::sync::{Mutex, PoisonError};

use persistence::EntityStore;
use tracing::debug;
use types::ids::UserId;
use types::user::User;

use crate::error::EngineResult;

pub struct UserRegistry {
    store: EntityStore,
    creation: Mutex<()>,
}

impl UserRegistry {
    pub fn new(store: EntityStore) -> Self {
        Self {
            store,
            creation: Mutex::new(()),
        }
    }

    /// Fetch the record for `id`, creating it with no room when absent.
    pub fn get_or_create(&self, id: UserId) -> EngineResult<User> {
        if let Some(user) = self.store.user(id)? {
            return Ok(user);
        }

        let _guard = self.creation.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(user) = self.store.user(id)? {
            return Ok(user);
        }
        let user = User::new(id);
        self.store.put_user(&user)?;
        debug!(user = %id, "Registered new user");
        Ok(user)
    }

    /// Fetch without creating.
    pub fn find(&self, id: UserId) -> EngineResult<Option<User>> {
        Ok(self.store.user(id)?)
    }

    /// Persist an updated record.
    pub fn save(&self, user: &User) -> EngineResult<()> {
        Ok(self.store.put_user(user)?)
    }
}
