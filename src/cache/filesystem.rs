use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use flate2::bufread::GzDecoder;
use sha2::{Digest, Sha256};

use crate::cache::{Cache, CacheState, ContentKey};
use crate::time::Seconds;

use crate::config::ConfigProperties;

use crate::error::{AddContext, ASError};
use crate::Result;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Persistent cache backend. One gzip-compressed file per key, named after
/// the sha256 of the key. The file mtime is the entry's stored-at timestamp,
/// so freshness survives process restarts.
pub struct FileCache {
    config: Arc<dyn ConfigProperties>,
}

impl FileCache {
    pub fn new(config: Arc<dyn ConfigProperties>) -> Self {
        FileCache { config }
    }

    pub fn validate_cache_location(&self) -> Result<()> {
        let cache_location = self
            .config
            .cache_location()
            .ok_or(ASError::ConfigurationNotFound)?;

        let path = Path::new(cache_location);

        if !path.exists() {
            return Err(ASError::CacheLocationDoesNotExist(format!(
                "Cache directory does not exist: {cache_location}"
            ))
            .into());
        }

        if !path.is_dir() {
            return Err(ASError::CacheLocationIsNotADirectory(format!(
                "Cache location is not a directory: {cache_location}"
            ))
            .into());
        }

        // Check if we can write to the directory
        let test_file_path = path.join(".write_test_cache_file");
        match File::create(&test_file_path) {
            Ok(_) => {
                if let Err(e) = fs::remove_file(&test_file_path) {
                    return Err(ASError::CacheLocationWriteTestFailed(format!(
                        "Failed to remove cache test file {}: {}",
                        test_file_path.to_string_lossy(),
                        e
                    ))
                    .into());
                }
            }
            Err(e) => {
                return Err(ASError::CacheLocationIsNotWriteable(format!(
                    "No write permission for cache directory {cache_location}: {e}"
                ))
                .into());
            }
        }
        Ok(())
    }

    pub fn get_cache_file(&self, key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key);
        let hash = hasher.finalize();
        let cache_location = self.config.cache_location().unwrap();
        let location = cache_location.strip_suffix('/').unwrap_or(cache_location);
        format!("{location}/{hash:x}")
    }

    fn read_entry(&self, mut reader: impl BufRead) -> Result<String> {
        let decompressed_data = GzDecoder::new(&mut reader);
        let mut reader = BufReader::new(decompressed_data);
        let mut payload = String::new();
        reader.read_to_string(&mut payload)?;
        Ok(payload)
    }

    fn write_entry(&self, value: &str, f: BufWriter<File>) -> Result<()> {
        let mut encoder = GzEncoder::new(f, Compression::default());
        encoder.write_all(value.as_bytes())?;
        Ok(())
    }

    fn expired(&self, key: &ContentKey, path: &str) -> Result<bool> {
        let expiration = self
            .config
            .get_content_expiration(&key.topic)
            .try_into()
            .err_context(ASError::ConfigurationError(format!(
                "Cannot retrieve cache expiration time. \
                 Check your configuration file and make sure the key \
                 cache_{}_expiration has a valid time format.",
                &key.topic
            )))?;
        expired(|| get_file_mtime_elapsed(path), expiration)
    }
}

impl Cache<ContentKey> for FileCache {
    fn get(&self, key: &ContentKey) -> Result<CacheState> {
        let path = self.get_cache_file(&key.name);
        if let Ok(f) = File::open(&path) {
            let mut f = BufReader::new(f);
            let payload = self.read_entry(&mut f)?;
            if self.expired(key, &path)? {
                return Ok(CacheState::Stale(payload));
            }
            Ok(CacheState::Fresh(payload))
        } else {
            Ok(CacheState::None)
        }
    }

    fn set(&self, key: &ContentKey, value: &str) -> Result<()> {
        let path = self.get_cache_file(&key.name);
        let f = File::create(path)?;
        let f = BufWriter::new(f);
        self.write_entry(value, f)?;
        Ok(())
    }

    fn invalidate(&self, key: &ContentKey) -> Result<()> {
        let path = self.get_cache_file(&key.name);
        if Path::new(&path).exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// An entry written at t0 with expiration ttl is fresh for elapsed in
/// [0, ttl) and stale from ttl onwards.
fn expired<F: Fn() -> Result<Seconds>>(get_elapsed: F, refresh_every: Seconds) -> Result<bool> {
    let elapsed = get_elapsed()?;
    Ok(elapsed >= refresh_every)
}

fn get_file_mtime_elapsed(path: &str) -> Result<Seconds> {
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata.modified()?.elapsed()?.as_secs();
    Ok(Seconds::new(mtime))
}
