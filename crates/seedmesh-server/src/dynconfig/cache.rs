//! Dynconfig Cache File
//!
//! Persists the last successfully fetched payload with its fetch timestamp so
//! a restarted node can warm start without reaching the manager.

use super::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::trace;

/// A payload read back from the cache file
#[derive(Debug, Clone, Deserialize)]
pub struct CacheEntry<T> {
    pub fetched_at: DateTime<Utc>,
    pub data: T,
}

impl<T> CacheEntry<T> {
    /// Age of the entry. Entries stamped in the future count as infinitely old.
    pub fn age(&self) -> Option<Duration> {
        (Utc::now() - self.fetched_at).to_std().ok()
    }

    pub fn is_expired(&self, expire_time: Duration) -> bool {
        match self.age() {
            Some(age) => age >= expire_time,
            None => true,
        }
    }
}

#[derive(Serialize)]
struct CacheEnvelope<'a, T> {
    fetched_at: DateTime<Utc>,
    data: &'a T,
}

/// Cache file at `<cache_dir>/<file_name>`
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(cache_dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self {
            path: cache_dir.as_ref().join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the cache file. Returns `Ok(None)` when no cache exists.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<CacheEntry<T>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::cache_io(&self.path, e)),
        };

        let entry = serde_json::from_slice(&bytes)?;
        Ok(Some(entry))
    }

    /// Replace the cache file with a new payload.
    ///
    /// Writes a sibling temp file and renames it over the cache so readers
    /// never observe a truncated file.
    pub async fn store<T: Serialize>(&self, fetched_at: DateTime<Utc>, data: &T) -> Result<()> {
        let bytes = serde_json::to_vec(&CacheEnvelope { fetched_at, data })?;

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::cache_io(dir, e))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &bytes)
            .await
            .map_err(|e| Error::cache_io(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::cache_io(&self.path, e))?;

        trace!(path = %self.path.display(), bytes = bytes.len(), "Dynconfig cache written");
        Ok(())
    }

    /// Delete the cache file. A missing file is not an error.
    pub async fn remove(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::cache_io(&self.path, e)),
        }
    }
}
