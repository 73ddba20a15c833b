//! Stale-while-revalidate policy over the content cache.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::filesystem::FileCache;
use crate::cache::{Cache, CacheState, ContentKey};
use crate::config::Config;
use crate::error::ASError;
use crate::fetcher::RemoteContentFetcher;
use crate::http::Client;
use crate::Error;
use crate::Result;

/// Where a resolved value came from. Recorded for observability and tests,
/// not necessarily surfaced to the end user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Origin {
    FreshCache,
    FreshFetch,
    StaleCache,
    StaticDefault,
}

#[derive(Clone, Debug)]
pub struct ResolvedContent<T> {
    pub value: T,
    pub origin: Origin,
}

pub struct ContentResolver<C> {
    cache: C,
}

impl<C: Cache<ContentKey>> ContentResolver<C> {
    pub fn new(cache: C) -> Self {
        ContentResolver { cache }
    }

    /// Serve fresh cached content without touching the network; otherwise
    /// fetch, store and return. A failed fetch degrades to the stale entry
    /// when one exists, and to the static default as the last resort.
    /// Validation errors are caller bugs and propagate.
    pub fn resolve<T, F>(
        &self,
        key: &ContentKey,
        fetch: F,
        static_default: T,
    ) -> Result<ResolvedContent<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        let mut stale_payload = None;
        match self.cache.get(key)? {
            CacheState::Fresh(payload) => match serde_json::from_str::<T>(&payload) {
                Ok(value) => {
                    debug!("cache hit for {}", key);
                    return Ok(ResolvedContent {
                        value,
                        origin: Origin::FreshCache,
                    });
                }
                Err(err) => {
                    error!("discarding corrupt cache entry for {}: {}", key, err);
                }
            },
            CacheState::Stale(payload) => {
                stale_payload = Some(payload);
            }
            CacheState::None => {}
        }
        match fetch() {
            Ok(value) => {
                self.cache.set(key, &serde_json::to_string(&value)?)?;
                Ok(ResolvedContent {
                    value,
                    origin: Origin::FreshFetch,
                })
            }
            Err(err) => {
                if !is_recoverable(&err) {
                    return Err(err);
                }
                if let Some(payload) = stale_payload {
                    match serde_json::from_str::<T>(&payload) {
                        Ok(value) => {
                            info!("serving stale content for {} after fetch failure: {}", key, err);
                            return Ok(ResolvedContent {
                                value,
                                origin: Origin::StaleCache,
                            });
                        }
                        Err(parse_err) => {
                            error!("stale cache entry for {} is corrupt: {}", key, parse_err);
                        }
                    }
                }
                info!("falling back to static default for {}: {}", key, err);
                Ok(ResolvedContent {
                    value: static_default,
                    origin: Origin::StaticDefault,
                })
            }
        }
    }

    pub fn invalidate(&self, key: &ContentKey) -> Result<()> {
        self.cache.invalidate(key)
    }
}

/// Transient remote conditions are absorbed by the fallback chain. Anything
/// else, validation errors included, indicates a caller bug and propagates.
fn is_recoverable(err: &Error) -> bool {
    matches!(
        err.downcast_ref::<ASError>(),
        Some(ASError::NetworkError(_))
            | Some(ASError::SchemaViolation(_))
            | Some(ASError::RemoteRefusal(_))
    )
}

/// Wires the production stack: HTTP client, filesystem cache, resolver.
pub fn file_backed(
    config: Arc<Config>,
) -> Result<(
    RemoteContentFetcher<Client<Arc<Config>>>,
    ContentResolver<FileCache>,
)> {
    let cache = FileCache::new(config.clone());
    cache.validate_cache_location()?;
    let runner = Arc::new(Client::new(config.clone()));
    let fetcher = RemoteContentFetcher::new(runner, config);
    Ok((fetcher, ContentResolver::new(cache)))
}
