use crate::cache::{Cache, CacheState, ContentKey};

use crate::Result;

/// Never caches. Every resolve goes to the remote endpoint.
pub struct NoCache;

impl Cache<ContentKey> for NoCache {
    fn get(&self, _key: &ContentKey) -> Result<CacheState> {
        Ok(CacheState::None)
    }
    fn set(&self, _key: &ContentKey, _value: &str) -> Result<()> {
        Ok(())
    }
    fn invalidate(&self, _key: &ContentKey) -> Result<()> {
        Ok(())
    }
}
