//! Extraction configuration

use serde::{Deserialize, Serialize};

use super::extractor::DEFAULT_CONTEXT_WINDOW;
use super::patterns::RuleDefinition;
use crate::error::{Error, Result};

pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.3;
pub const DEFAULT_CHUNK_SIZE: usize = 8000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 400;
pub const DEFAULT_MAX_PARALLEL_CHUNKS: usize = 4;

fn default_min_confidence() -> f32 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

fn default_context_window() -> usize {
    DEFAULT_CONTEXT_WINDOW
}

fn default_max_parallel_chunks() -> usize {
    DEFAULT_MAX_PARALLEL_CHUNKS
}

/// Extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Candidates scoring below this are dropped before deduplication
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// Cap applied after ranking
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Chunk length in chars for large inputs
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chars shared by consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Context kept on each side of a match, in chars
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Concurrent chunks in parallel extraction
    #[serde(default = "default_max_parallel_chunks")]
    pub max_parallel_chunks: usize,

    /// Rules appended to the built-in library
    #[serde(default)]
    pub custom_rules: Vec<RuleDefinition>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_results: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            context_window: DEFAULT_CONTEXT_WINDOW,
            max_parallel_chunks: DEFAULT_MAX_PARALLEL_CHUNKS,
            custom_rules: Vec::new(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for ExtractionConfig
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::invalid_config(
                "min_confidence",
                self.min_confidence,
                "Must be between 0.0 and 1.0",
            ));
        }
        if self.chunk_size == 0 {
            return Err(Error::invalid_config("chunk_size", 0, "Must be at least 1"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::invalid_config(
                "chunk_overlap",
                self.chunk_overlap,
                format!("Must be smaller than chunk_size ({})", self.chunk_size),
            ));
        }
        if self.max_parallel_chunks == 0 {
            return Err(Error::invalid_config(
                "max_parallel_chunks",
                0,
                "Must be at least 1",
            ));
        }
        if self.max_results == Some(0) {
            return Err(Error::invalid_config(
                "max_results",
                0,
                "Must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

/// Builder for ExtractionConfig with fluent API
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    min_confidence: Option<f32>,
    max_results: Option<usize>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    context_window: Option<usize>,
    max_parallel_chunks: Option<usize>,
    custom_rules: Vec<RuleDefinition>,
}

impl ExtractionConfigBuilder {
    /// Set minimum confidence
    pub fn min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence = Some(threshold);
        self
    }

    /// Set maximum number of results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Set chunk size in chars
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Set chunk overlap in chars
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = Some(overlap);
        self
    }

    pub fn context_window(mut self, chars: usize) -> Self {
        self.context_window = Some(chars);
        self
    }

    pub fn max_parallel_chunks(mut self, max: usize) -> Self {
        self.max_parallel_chunks = Some(max);
        self
    }

    /// Append a custom rule
    pub fn rule(mut self, rule: RuleDefinition) -> Self {
        self.custom_rules.push(rule);
        self
    }

    /// Build the config with validation
    pub fn build(self) -> Result<ExtractionConfig> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation (for testing)
    pub fn build_unchecked(self) -> ExtractionConfig {
        ExtractionConfig {
            min_confidence: self.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
            max_results: self.max_results,
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: self.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP),
            context_window: self.context_window.unwrap_or(DEFAULT_CONTEXT_WINDOW),
            max_parallel_chunks: self
                .max_parallel_chunks
                .unwrap_or(DEFAULT_MAX_PARALLEL_CHUNKS),
            custom_rules: self.custom_rules,
        }
    }
}
