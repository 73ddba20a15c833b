use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use crate::cache::{Cache, CacheState, ContentKey};

use crate::Result;

/// Map-backed cache for tests. Freshness is driven manually through
/// `expire` instead of wall-clock time.
#[derive(Default)]
pub struct InMemoryCache {
    cache: RefCell<HashMap<String, String>>,
    expired: Cell<bool>,
    pub invalidated: RefCell<Vec<String>>,
}

impl InMemoryCache {
    pub fn expire(&self) {
        self.expired.set(true);
    }
}

impl Cache<ContentKey> for InMemoryCache {
    fn get(&self, key: &ContentKey) -> Result<CacheState> {
        if let Some(value) = self.cache.borrow().get(&key.name) {
            if self.expired.get() {
                return Ok(CacheState::Stale(value.clone()));
            }
            return Ok(CacheState::Fresh(value.clone()));
        }
        Ok(CacheState::None)
    }

    fn set(&self, key: &ContentKey, value: &str) -> Result<()> {
        self.cache
            .borrow_mut()
            .insert(key.name.to_string(), value.to_string());
        Ok(())
    }

    fn invalidate(&self, key: &ContentKey) -> Result<()> {
        self.cache.borrow_mut().remove(&key.name);
        self.invalidated.borrow_mut().push(key.name.to_string());
        Ok(())
    }
}
