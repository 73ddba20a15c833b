use std::fmt::{self, Display, Formatter};

pub mod filesystem;
pub mod inmemory;
pub mod nocache;

use crate::flows::ContentTopic;
use crate::Result;
pub use inmemory::InMemoryCache;
pub use nocache::NoCache;

/// Composite identity of a cached payload, e.g. `market_Wheat` under the
/// market trends topic. The topic selects the configured expiration.
#[derive(Clone, Debug)]
pub struct ContentKey {
    pub name: String,
    pub topic: ContentTopic,
}

impl ContentKey {
    pub fn new(name: &str, topic: ContentTopic) -> Self {
        ContentKey {
            name: name.to_string(),
            topic,
        }
    }
}

impl Display for ContentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Cached values are serialized JSON payloads. Writes are whole-entry
/// replacements, deletion is caller driven through `invalidate`.
pub trait Cache<K = ContentKey> {
    fn get(&self, key: &K) -> Result<CacheState>;
    fn set(&self, key: &K, value: &str) -> Result<()>;
    fn invalidate(&self, key: &K) -> Result<()>;
}

pub enum CacheState {
    Stale(String),
    Fresh(String),
    None,
}

impl<K, C: Cache<K>> Cache<K> for &C {
    fn get(&self, key: &K) -> Result<CacheState> {
        (*self).get(key)
    }

    fn set(&self, key: &K, value: &str) -> Result<()> {
        (*self).set(key, value)
    }

    fn invalidate(&self, key: &K) -> Result<()> {
        (*self).invalidate(key)
    }
}
