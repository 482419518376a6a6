//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores values under deterministic paths derived
//! from a `CacheKey`. How a value is turned into bytes is decided by a
//! `CacheCodec`: JSON for the list and detail records, raw bytes for sprites.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::PathBuf;
use thiserror::Error;

/// File name of the cached Pokémon list inside the cache directory
const LIST_FILE: &str = "pokemon_list.json";

/// Subdirectory of the cache directory holding one detail record per file
const DETAILS_DIR: &str = "pokemon_details";

/// Errors that can occur when reading or writing the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// No entry exists at the derived path
    #[error("No cache entry at {}", path.display())]
    Miss { path: PathBuf },

    /// An entry exists but cannot be decoded
    #[error("Corrupt cache entry at {} (re-run with --force-refresh to replace it): {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the entry failed
    #[error("Cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Identifies a cache entry
///
/// Each key space maps to its own location: the list lives at a fixed file name,
/// details and sprites are keyed by the sanitized Pokémon name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The full Pokémon list
    PokemonList,
    /// A detail record for the named Pokémon
    Detail(String),
    /// A sprite image for the named Pokémon with the given file extension
    Sprite { name: String, extension: String },
}

impl CacheKey {
    /// Creates a detail key for a Pokémon name
    pub fn detail(name: impl Into<String>) -> Self {
        CacheKey::Detail(name.into())
    }

    /// Creates a sprite key for a Pokémon name and image extension
    pub fn sprite(name: impl Into<String>, extension: impl Into<String>) -> Self {
        CacheKey::Sprite {
            name: name.into(),
            extension: extension.into(),
        }
    }
}

/// Turns cached values into bytes and back
pub trait CacheCodec {
    /// The value stored under a key
    type Value;

    /// Serializes a value for writing to disk
    fn encode(value: &Self::Value) -> Result<Vec<u8>, serde_json::Error>;

    /// Deserializes a value read from disk
    fn decode(bytes: &[u8]) -> Result<Self::Value, serde_json::Error>;
}

/// Stores any serde type as pretty-printed JSON
#[derive(Debug)]
pub struct JsonCodec<T>(PhantomData<T>);

impl<T: Serialize + DeserializeOwned> CacheCodec for JsonCodec<T> {
    type Value = T;

    fn encode(value: &T) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(value)
    }

    fn decode(bytes: &[u8]) -> Result<T, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Stores raw bytes unchanged
#[derive(Debug)]
pub struct BinaryCodec;

impl CacheCodec for BinaryCodec {
    type Value = Vec<u8>;

    fn encode(value: &Vec<u8>) -> Result<Vec<u8>, serde_json::Error> {
        Ok(value.clone())
    }

    fn decode(bytes: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
        Ok(bytes.to_vec())
    }
}

/// Manages reading and writing cached data to disk
///
/// JSON records are stored under `cache_dir` (`pokemon_list.json` and
/// `pokemon_details/<name>.json`), sprite images under `sprites_dir`
/// (`<name>.<ext>`). The sprite directory doubles as the user-facing image
/// output, so a cached sprite path is also the path written to the report.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory for JSON records
    cache_dir: PathBuf,
    /// Directory for sprite images
    sprites_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager rooted at the given directories
    ///
    /// Directories are created lazily on first write.
    pub fn new(cache_dir: impl Into<PathBuf>, sprites_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            sprites_dir: sprites_dir.into(),
        }
    }

    /// Returns the path of the file backing the given key
    pub fn path(&self, key: &CacheKey) -> PathBuf {
        match key {
            CacheKey::PokemonList => self.cache_dir.join(LIST_FILE),
            CacheKey::Detail(name) => self
                .cache_dir
                .join(DETAILS_DIR)
                .join(format!("{}.json", sanitize(name))),
            CacheKey::Sprite { name, extension } => self
                .sprites_dir
                .join(format!("{}.{}", sanitize(name), sanitize(extension))),
        }
    }

    /// Returns true if a file exists for the given key
    pub fn has(&self, key: &CacheKey) -> bool {
        self.path(key).is_file()
    }

    /// Reads and decodes the entry for `key`
    ///
    /// # Returns
    /// * `Ok(value)` if the file exists and decodes
    /// * `Err(CacheError::Miss)` if there is no file
    /// * `Err(CacheError::Corrupt)` if the file cannot be decoded
    pub fn read<C: CacheCodec>(&self, key: &CacheKey) -> Result<C::Value, CacheError> {
        let path = self.path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CacheError::Miss { path });
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        C::decode(&bytes).map_err(|source| CacheError::Corrupt { path, source })
    }

    /// Encodes and writes `value` under `key`, replacing any existing entry
    ///
    /// Parent directories are created as needed. Returns the path written.
    pub fn write<C: CacheCodec>(&self, key: &CacheKey, value: &C::Value) -> Result<PathBuf, CacheError> {
        let path = self.path(key);
        let bytes = C::encode(value).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, bytes).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

/// Makes a name safe to use as a file stem
///
/// Anything other than ASCII letters, digits, `-` and `_` becomes `_`, which also
/// rules out path separators and `..`.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::new(temp_dir.path().join("cache"), temp_dir.path().join("sprites"));
        (cache, temp_dir)
    }

    #[test]
    fn test_paths_follow_layout() {
        let cache = CacheManager::new("cache", "sprites");

        assert_eq!(cache.path(&CacheKey::PokemonList), PathBuf::from("cache/pokemon_list.json"));
        assert_eq!(
            cache.path(&CacheKey::detail("bulbasaur")),
            PathBuf::from("cache/pokemon_details/bulbasaur.json")
        );
        assert_eq!(
            cache.path(&CacheKey::sprite("bulbasaur", "png")),
            PathBuf::from("sprites/bulbasaur.png")
        );
    }

    #[test]
    fn test_names_are_sanitized() {
        let cache = CacheManager::new("cache", "sprites");

        let path = cache.path(&CacheKey::detail("../etc/passwd"));
        assert_eq!(path, PathBuf::from("cache/pokemon_details/___etc_passwd.json"));

        let path = cache.path(&CacheKey::detail("mr-mime"));
        assert_eq!(path, PathBuf::from("cache/pokemon_details/mr-mime.json"));

        assert_eq!(sanitize(""), "_");
    }

    #[test]
    fn test_write_creates_file_and_parent_directories() {
        let (cache, temp_dir) = create_test_cache();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        let path = cache
            .write::<JsonCodec<TestData>>(&CacheKey::detail("pikachu"), &data)
            .expect("Write should succeed");

        let expected = temp_dir.path().join("cache/pokemon_details/pikachu.json");
        assert_eq!(path, expected);
        assert!(expected.exists(), "Cache file should exist");

        let content = fs::read_to_string(&expected).expect("Should read file");
        assert!(content.contains("\"name\""));
        assert!(content.contains("42"));
    }

    #[test]
    fn test_has_reflects_presence() {
        let (cache, _temp_dir) = create_test_cache();
        let key = CacheKey::PokemonList;

        assert!(!cache.has(&key));
        cache
            .write::<JsonCodec<Vec<u32>>>(&key, &vec![1, 2, 3])
            .expect("Write should succeed");
        assert!(cache.has(&key));
    }

    #[test]
    fn test_read_missing_key_is_miss() {
        let (cache, _temp_dir) = create_test_cache();

        let result = cache.read::<JsonCodec<TestData>>(&CacheKey::detail("missingno"));

        assert!(matches!(result, Err(CacheError::Miss { .. })));
    }

    #[test]
    fn test_read_unparsable_entry_is_corrupt() {
        let (cache, _temp_dir) = create_test_cache();
        let key = CacheKey::detail("broken");
        let path = cache.path(&key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let result = cache.read::<JsonCodec<TestData>>(&key);

        match result {
            Err(CacheError::Corrupt { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected Corrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_overwrite_existing_entry() {
        let (cache, _temp_dir) = create_test_cache();
        let key = CacheKey::detail("ditto");
        let first = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let second = TestData {
            name: "second".to_string(),
            value: 2,
        };

        cache.write::<JsonCodec<TestData>>(&key, &first).unwrap();
        cache.write::<JsonCodec<TestData>>(&key, &second).unwrap();

        let result = cache.read::<JsonCodec<TestData>>(&key).expect("Should read cache");
        assert_eq!(result, second, "Cache should contain latest data");
    }

    #[test]
    fn test_binary_entries_are_stored_verbatim() {
        let (cache, temp_dir) = create_test_cache();
        let key = CacheKey::sprite("eevee", "png");
        let bytes = vec![0x89, b'P', b'N', b'G', 0, 255];

        let path = cache.write::<BinaryCodec>(&key, &bytes).unwrap();

        assert_eq!(path, temp_dir.path().join("sprites/eevee.png"));
        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert_eq!(cache.read::<BinaryCodec>(&key).unwrap(), bytes);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_into_file_path_fails_with_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let cache = CacheManager::new(&blocker, &blocker);

        let result = cache.write::<BinaryCodec>(&CacheKey::detail("x"), &vec![1]);

        assert!(matches!(result, Err(CacheError::Io { .. })));
    }
}
