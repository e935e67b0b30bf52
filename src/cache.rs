//! Cache storage module
//!
//! Persistent JSON cache in the system's standard cache directory. Every
//! entry remembers when it was stored; entries older than the storage's
//! time-to-live are treated as missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to determine cache directory location
    #[error("Failed to determine cache directory location")]
    CacheDirectoryNotFound,

    /// Failed to create or access cache directory
    #[error("Failed to create cache directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read cache file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write cache file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to deserialize cache file {path}: {source}")]
    DeserializationFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize data: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// On-disk envelope around a cached value
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    stored_at: DateTime<Utc>,
    data: T,
}

/// A cache of serializable values with a fixed time-to-live
pub(crate) struct CacheStorage<T> {
    cache_dir: PathBuf,
    ttl: Duration,
    _phantom: PhantomData<T>,
}

impl<T> CacheStorage<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    /// Opens or creates the cache named `name` below the application's cache
    /// directory
    ///
    /// The name is sanitized (lowercased, non-alphanumeric characters
    /// replaced with underscores).
    ///
    /// ```ignore
    /// let pages: CacheStorage<CachedPage> = CacheStorage::open("pages", ttl)?;
    /// ```
    pub fn open(name: &str, ttl: Duration) -> Result<Self, CacheError> {
        let proj_dirs = directories::ProjectDirs::from("org", "tvdbscraper", "tvdbscraper")
            .ok_or(CacheError::CacheDirectoryNotFound)?;
        Self::open_in(&proj_dirs.cache_dir().join(sanitize_name(name)), ttl)
    }

    /// Opens or creates a cache rooted at `dir`
    pub fn open_in(dir: &Path, ttl: Duration) -> Result<Self, CacheError> {
        fs::create_dir_all(dir).map_err(|e| CacheError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            cache_dir: dir.to_path_buf(),
            ttl,
            _phantom: PhantomData,
        })
    }

    fn entry_path(&self, identifier: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.json", sanitize_name(identifier)))
    }

    /// Loads the value stored for `identifier`
    ///
    /// Returns `None` if nothing is stored or the entry has expired. An entry
    /// that exists but cannot be read or decoded is an error.
    pub fn load(&self, identifier: &str) -> Result<Option<T>, CacheError> {
        let file_path = self.entry_path(identifier);
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&file_path).map_err(|e| CacheError::ReadFailed {
            path: file_path.clone(),
            source: e,
        })?;

        let entry: CacheEntry<T> =
            serde_json::from_str(&content).map_err(|e| CacheError::DeserializationFailed {
                path: file_path.clone(),
                source: e,
            })?;

        let age = Utc::now()
            .signed_duration_since(entry.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if age > self.ttl {
            debug!(path = %file_path.display(), age_secs = age.as_secs(), "cache entry expired");
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    /// Stores `data` under `identifier`, replacing any previous entry
    pub fn store(&self, identifier: &str, data: &T) -> Result<(), CacheError> {
        self.store_at(identifier, data, Utc::now())
    }

    fn store_at(&self, identifier: &str, data: &T, stored_at: DateTime<Utc>) -> Result<(), CacheError> {
        let file_path = self.entry_path(identifier);
        let content = serde_json::to_string_pretty(&CacheEntry { stored_at, data })?;

        fs::write(&file_path, content).map_err(|e| CacheError::WriteFailed {
            path: file_path,
            source: e,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

/// Sanitizes a name for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Simple"), "simple");
        assert_eq!(sanitize_name("With Spaces"), "with_spaces");
        assert_eq!(sanitize_name("With-Hyphens"), "with-hyphens");
        assert_eq!(sanitize_name("Special!@#$%"), "special_____");
        assert_eq!(
            sanitize_name("https://thetvdb.com/api/series/1.xml"),
            "https___thetvdb_com_api_series_1_xml"
        );
    }

    #[test]
    fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache: CacheStorage<Vec<String>> =
            CacheStorage::open_in(dir.path(), Duration::from_secs(60)).unwrap();

        assert!(cache.load("series").unwrap().is_none());

        let value = vec!["Psych".to_string(), "Monk".to_string()];
        cache.store("series", &value).unwrap();
        assert_eq!(cache.load("series").unwrap(), Some(value));
    }

    #[test]
    fn test_expired_entry_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache: CacheStorage<u32> =
            CacheStorage::open_in(dir.path(), Duration::from_secs(3600)).unwrap();

        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
        cache.store_at("old", &1, two_hours_ago).unwrap();
        cache.store("fresh", &2).unwrap();

        assert_eq!(cache.load("old").unwrap(), None);
        assert_eq!(cache.load("fresh").unwrap(), Some(2));
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache: CacheStorage<u32> =
            CacheStorage::open_in(dir.path(), Duration::from_secs(60)).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        assert!(matches!(
            cache.load("broken"),
            Err(CacheError::DeserializationFailed { .. })
        ));
    }
}
