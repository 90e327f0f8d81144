//! Content-addressed page cache.
//!
//! One file per URL, named by the MD5 hex digest of the URL bytes, directly
//! under the cache root. The file's mtime is the only freshness record:
//! - `read` treats anything older than the validity window as a miss
//!   (without deleting it);
//! - `sweep` deletes anything older than the retention window.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use md5::{Digest, Md5};

use crate::error::{Result, WeatherError};

/// Derive the cache key for a URL.
pub fn key_for(url: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    validity: Duration,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>, validity: Duration) -> Self {
        Self { root: root.into(), validity }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(key_for(url))
    }

    /// Stored bytes for `url`, if present and younger than the validity window.
    pub fn read(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(url);

        let modified = match path.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(url, "cache miss");
                return Ok(None);
            }
            Err(err) => return Err(WeatherError::cache_io(path, err)),
        };

        if age(modified) >= self.validity {
            tracing::debug!(url, "cache entry expired");
            return Ok(None);
        }

        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!(url, bytes = bytes.len(), "cache hit");
                Ok(Some(bytes))
            }
            // Swept between the stat and the read.
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(WeatherError::cache_io(path, err)),
        }
    }

    /// Store `bytes` under `url`'s key, replacing any previous entry.
    pub fn write(&self, url: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .map_err(|err| WeatherError::cache_io(&self.root, err))?;

        let path = self.path_for(url);
        write_atomic(&path, bytes).map_err(|err| WeatherError::cache_io(&path, err))?;

        tracing::debug!(url, path = %path.display(), "cached page");
        Ok(())
    }

    /// Delete every entry older than `max_age`. Returns how many were removed.
    pub fn sweep(&self, max_age: Duration) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(WeatherError::cache_io(&self.root, err)),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|err| WeatherError::cache_io(&self.root, err))?;
            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(WeatherError::cache_io(path, err)),
            };
            if !metadata.is_file() {
                continue;
            }

            let modified =
                metadata.modified().map_err(|err| WeatherError::cache_io(&path, err))?;
            if age(modified) <= max_age {
                continue;
            }

            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(WeatherError::cache_io(path, err)),
            }
        }

        if removed > 0 {
            tracing::info!(removed, root = %self.root.display(), "swept old cache entries");
        }
        Ok(removed)
    }

    /// Remove the whole cache directory.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => {
                tracing::info!(root = %self.root.display(), "cache cleared");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(WeatherError::CacheMissing { path: self.root.clone() })
            }
            Err(err) => Err(WeatherError::cache_io(&self.root, err)),
        }
    }
}

fn age(modified: SystemTime) -> Duration {
    // mtimes in the future count as brand new.
    SystemTime::now().duration_since(modified).unwrap_or(Duration::ZERO)
}

/// Temp file + rename in the same directory so a reader never sees a
/// half-written page.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("entry"),
        std::process::id()
    ));

    let written = std::fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    let result = written.and_then(|()| std::fs::rename(&temp_path, path));

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}
