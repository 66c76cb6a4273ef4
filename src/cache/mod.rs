//! On-disk cache for extraction results
//!
//! Results are stored as `<key>.json` under a directory, where the key is a
//! SHA-256 over the input (text, segments, metadata) and whatever else shaped
//! the result (extraction config, interest profile). The core pipeline never
//! touches the cache; the CLI consults it around a run.
//!
//! # Example
//!
//! ```rust,ignore
//! use transcite::cache::{CacheConfig, CitationCache};
//!
//! let cache = CitationCache::new(&CacheConfig::new("/tmp/transcite"))?;
//! let key = CitationCache::key(&input, &config.extraction)?;
//! if let Some(hit) = cache.get(&key).await? {
//!     return Ok(hit.citations);
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{Citation, ExtractionInput};

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding cache entries
    pub dir: PathBuf,

    /// Entries older than this are ignored (seconds); `None` keeps them forever
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl_secs: None,
        }
    }

    pub fn with_ttl(mut self, secs: u64) -> Self {
        self.ttl_secs = Some(secs);
        self
    }
}

/// Cached extraction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCitations {
    pub key: String,
    pub citations: Vec<Citation>,
    /// Timestamp when cached
    pub cached_at: i64,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Directory-backed citation cache
#[derive(Debug)]
pub struct CitationCache {
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CitationCache {
    /// Open a cache, creating its directory if needed
    pub fn new(config: &CacheConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.dir).with_context(|| {
            format!("Failed to create cache directory {}", config.dir.display())
        })?;
        tracing::debug!(dir = %config.dir.display(), "Opened citation cache");
        Ok(Self {
            config: config.clone(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Open a cache, returning None if the directory is unusable
    pub fn try_new(config: &CacheConfig) -> Option<Self> {
        match Self::new(config) {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Citation cache unavailable, continuing without cache");
                None
            }
        }
    }

    /// Cache key for an input and the settings that shaped its result
    pub fn key<S: Serialize>(input: &ExtractionInput, settings: &S) -> Result<String> {
        let settings = serde_json::to_vec(settings).context("Failed to serialize cache settings")?;
        let mut hasher = Sha256::new();
        hasher.update(input.content_hash().as_bytes());
        hasher.update(&settings);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// SHA-256 of a file's contents, for keys that depend on side inputs
    pub async fn file_digest(path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.config.dir.join(format!("{key}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Cached citations for `key`, if present and fresh
    pub async fn get(&self, key: &str) -> Result<Option<CachedCitations>> {
        let path = self.entry_path(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
            Err(e) => {
                let context = format!("Failed to read {}", path.display());
                return Err(anyhow::Error::new(e).context(context));
            }
        };

        let entry: CachedCitations = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt cache entry {}", path.display()))?;

        if self.is_expired(&entry) {
            tracing::debug!(key, "Cache entry expired");
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        tracing::debug!(key, citations = entry.citations.len(), "Citation cache hit");
        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(entry))
    }

    /// Store citations under `key`
    pub async fn put(&self, key: &str, citations: &[Citation]) -> Result<()> {
        let entry = CachedCitations {
            key: key.to_string(),
            citations: citations.to_vec(),
            cached_at: chrono::Utc::now().timestamp(),
        };
        let json = serde_json::to_string_pretty(&entry)?;
        let path = self.entry_path(key);
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Remove every entry, returning how many were deleted
    pub async fn clear(&self) -> Result<u64> {
        let mut removed = 0;
        let mut dir = tokio::fs::read_dir(&self.config.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn is_expired(&self, entry: &CachedCitations) -> bool {
        match self.config.ttl_secs {
            Some(ttl) => chrono::Utc::now().timestamp() - entry.cached_at > ttl as i64,
            None => false,
        }
    }
}
