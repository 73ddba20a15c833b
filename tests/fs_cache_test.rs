use saarathi::error::ASError;
use std::path::PathBuf;
use std::{fs, sync::Arc};
use tempfile::TempDir;

use saarathi::{
    cache::{filesystem::FileCache, Cache, CacheState, ContentKey},
    config::ConfigProperties,
    flows::ContentTopic,
};

struct TestConfig {
    cache_dir: PathBuf,
}

impl ConfigProperties for TestConfig {
    fn api_token(&self) -> &str {
        "test_token"
    }

    fn generator_endpoint(&self) -> &str {
        "http://localhost"
    }

    fn cache_location(&self) -> Option<&str> {
        self.cache_dir.to_str()
    }

    fn get_content_expiration(&self, _: &ContentTopic) -> &str {
        "3600s"
    }
}

fn file_cache(temp_dir: &TempDir) -> FileCache {
    let config = TestConfig {
        cache_dir: temp_dir.path().to_path_buf(),
    };
    FileCache::new(Arc::new(config))
}

fn wheat_key() -> ContentKey {
    ContentKey::new("market_Wheat", ContentTopic::MarketTrends)
}

const PAYLOAD: &str = r#"{"analysis":[{"cropName":"Wheat","summary":"steady"}]}"#;

#[test]
fn test_file_cache_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir);
    let key = wheat_key();

    file_cache.set(&key, PAYLOAD).unwrap();

    // Verify the cache file was created
    let cache_file = file_cache.get_cache_file(&key.name);
    assert!(fs::metadata(&cache_file).is_ok());

    match file_cache.get(&key).unwrap() {
        CacheState::Fresh(payload) => assert_eq!(PAYLOAD, payload),
        _ => panic!("Expected a fresh cache state"),
    }
}

#[test]
fn test_file_cache_stale_beyond_expiration() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir);
    let key = wheat_key();

    file_cache.set(&key, PAYLOAD).unwrap();

    // Simulate passage of time beyond the configured expiration
    let cache_file_path = PathBuf::from(file_cache.get_cache_file(&key.name));
    let metadata = fs::metadata(&cache_file_path).unwrap();
    let mtime = metadata.modified().unwrap() - std::time::Duration::from_secs(4000);
    filetime::set_file_mtime(&cache_file_path, filetime::FileTime::from(mtime)).unwrap();

    match file_cache.get(&key).unwrap() {
        CacheState::Stale(payload) => assert_eq!(PAYLOAD, payload),
        _ => panic!("Expected a stale cache state"),
    }
}

#[test]
fn test_file_cache_miss_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir);
    assert!(matches!(
        file_cache.get(&wheat_key()).unwrap(),
        CacheState::None
    ));
}

#[test]
fn test_file_cache_set_overwrites_previous_entry() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir);
    let key = wheat_key();

    file_cache.set(&key, "first").unwrap();
    file_cache.set(&key, "second").unwrap();

    match file_cache.get(&key).unwrap() {
        CacheState::Fresh(payload) => assert_eq!("second", payload),
        _ => panic!("Expected a fresh cache state"),
    }
}

#[test]
fn test_file_cache_invalidate_removes_entry() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir);
    let key = wheat_key();

    file_cache.set(&key, PAYLOAD).unwrap();
    file_cache.invalidate(&key).unwrap();

    assert!(matches!(file_cache.get(&key).unwrap(), CacheState::None));
    // Invalidating a missing entry is not an error.
    file_cache.invalidate(&key).unwrap();
}

#[test]
fn test_keys_do_not_collide() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir);
    let wheat = wheat_key();
    let rice = ContentKey::new("market_Rice", ContentTopic::MarketTrends);

    file_cache.set(&wheat, "wheat payload").unwrap();
    file_cache.set(&rice, "rice payload").unwrap();

    match file_cache.get(&wheat).unwrap() {
        CacheState::Fresh(payload) => assert_eq!("wheat payload", payload),
        _ => panic!("Expected a fresh cache state"),
    }
    match file_cache.get(&rice).unwrap() {
        CacheState::Fresh(payload) => assert_eq!("rice payload", payload),
        _ => panic!("Expected a fresh cache state"),
    }
}

#[test]
fn test_validate_cache_location_success() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir);
    assert!(file_cache.validate_cache_location().is_ok());
}

#[test]
fn test_validate_cache_location_not_found() {
    let config = TestConfig {
        cache_dir: PathBuf::from("/non/existent/directory"),
    };

    let file_cache = FileCache::new(Arc::new(config));
    let err = file_cache.validate_cache_location().unwrap_err();
    match err.downcast_ref::<ASError>() {
        Some(ASError::CacheLocationDoesNotExist(msg)) => {
            assert!(msg.contains("/non/existent/directory"));
        }
        _ => panic!("Expected CacheLocationDoesNotExist error"),
    }
}

#[test]
fn test_validate_cache_location_not_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let temp_file = temp_dir.path().join("not_a_directory");
    fs::write(&temp_file, "").unwrap();

    let config = TestConfig {
        cache_dir: temp_file.clone(),
    };

    let file_cache = FileCache::new(Arc::new(config));
    let err = file_cache.validate_cache_location().unwrap_err();
    match err.downcast_ref::<ASError>() {
        Some(ASError::CacheLocationIsNotADirectory(msg)) => {
            assert!(msg.contains(temp_file.to_string_lossy().as_ref()));
        }
        _ => panic!("Expected CacheLocationIsNotADirectory error"),
    }
}

#[test]
fn test_validate_cache_location_config_not_found() {
    struct NoCacheLocation;

    impl ConfigProperties for NoCacheLocation {
        fn api_token(&self) -> &str {
            "test_token"
        }

        fn generator_endpoint(&self) -> &str {
            "http://localhost"
        }
    }

    let file_cache = FileCache::new(Arc::new(NoCacheLocation));
    let err = file_cache.validate_cache_location().unwrap_err();
    match err.downcast_ref::<ASError>() {
        Some(ASError::ConfigurationNotFound) => {}
        _ => panic!("Expected ConfigurationNotFound error"),
    }
}
