//! Application configuration for the transcite CLI
//!
//! Configuration is loaded from a TOML file, from environment variables, or
//! both (file first, then `TRANSCITE_*` overrides).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::citation::config::ExtractionConfig;
use crate::enrich::{EnrichOptions, DEFAULT_ENRICH_CONCURRENCY};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Extraction pipeline configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Result cache configuration
    #[serde(default)]
    pub cache: CacheSettings,

    /// Enrichment limits
    #[serde(default)]
    pub enrich: EnrichSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Result cache settings; caching is off without a directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    pub dir: Option<PathBuf>,
    pub ttl_secs: Option<u64>,
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> Option<CacheConfig> {
        self.dir.as_ref().map(|dir| CacheConfig {
            dir: dir.clone(),
            ttl_secs: self.ttl_secs,
        })
    }
}

/// Enrichment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichSettings {
    /// Concurrent enrichment lookups
    pub concurrency: usize,

    /// Per-citation timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_ENRICH_CONCURRENCY,
            timeout_secs: 5,
        }
    }
}

impl EnrichSettings {
    pub fn options(&self) -> EnrichOptions {
        EnrichOptions {
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load an optional file, then apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay `TRANSCITE_*` environment variables; unparsable values are ignored
    pub fn apply_env(&mut self) {
        if let Some(v) = env_parse::<f32>("TRANSCITE_MIN_CONFIDENCE") {
            self.extraction.min_confidence = v;
        }
        if let Some(v) = env_parse::<usize>("TRANSCITE_MAX_RESULTS") {
            self.extraction.max_results = Some(v);
        }
        if let Some(v) = env_parse::<usize>("TRANSCITE_CHUNK_SIZE") {
            self.extraction.chunk_size = v;
        }
        if let Ok(v) = std::env::var("TRANSCITE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("TRANSCITE_LOG_FORMAT") {
            self.logging.format = v;
        }
        if let Ok(v) = std::env::var("TRANSCITE_CACHE_DIR") {
            self.cache.dir = Some(PathBuf::from(v));
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.extraction.validate()?;

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json', got '{}'", self.logging.format);
        }

        if self.enrich.concurrency == 0 {
            anyhow::bail!("enrich.concurrency must be greater than 0");
        }

        if self.enrich.timeout_secs == 0 {
            anyhow::bail!("enrich.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}
