//! Persisted analysis cache.
//!
//! One JSON file per key under a cache directory. Keys embed
//! `CACHE_VERSION`, so bumping it orphans every earlier entry at once;
//! there is no per-entry expiry. Writes are whole-file overwrites of a
//! deterministic key and a single process drives the cache, so there is no
//! locking.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::CACHE_VERSION;
use crate::analysis::model::AnalysisResult;
use crate::error::CacheError;
use crate::weather::LiveWeather;

/// A cached report payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub analysis: AnalysisResult,
    pub live: LiveWeather,
    #[serde(rename = "cachedAt")]
    pub cached_at: String,
}

/// Storage key for a site: `dc_analysis_<version>_<siteId>`.
pub fn cache_key(site_id: &str) -> String {
    format!("dc_analysis_{CACHE_VERSION}_{site_id}")
}

#[derive(Debug, Clone)]
pub struct AnalysisCache {
    dir: PathBuf,
}

impl AnalysisCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing the entry for `site_id`.
    ///
    /// The id is hex-encoded, so distinct ids never share a file and no id
    /// can name a path outside the cache directory.
    pub fn entry_path(&self, site_id: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.json",
            cache_key(&hex::encode(site_id.as_bytes()))
        ))
    }

    /// Returns the cached entry for `site_id`.
    ///
    /// A missing entry is a miss. An entry that cannot be read or decoded is
    /// deleted and also reported as a miss.
    pub fn get(&self, site_id: &str) -> Option<CacheEntry> {
        let path = self.entry_path(site_id);
        match read_entry(&path) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(site_id, error = %err, "discarding corrupt cache entry");
                if let Err(err) = fs::remove_file(&path) {
                    debug!(site_id, error = %err, "failed to remove corrupt cache entry");
                }
                None
            }
        }
    }

    /// Stores an entry. Failures are logged and otherwise ignored.
    pub fn put(&self, site_id: &str, entry: &CacheEntry) {
        if let Err(err) = self.try_put(site_id, entry) {
            warn!(site_id, error = %err, "cache write failed");
        }
    }

    fn try_put(&self, site_id: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let body = serde_json::to_vec(entry)?;
        fs::write(self.entry_path(site_id), body)?;
        Ok(())
    }
}

fn read_entry(path: &Path) -> Result<Option<CacheEntry>, CacheError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}
