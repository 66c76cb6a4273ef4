//! transcite - citation extraction for video transcripts
//!
//! Finds references to books, papers, people, places, companies, events,
//! quotes, statistics, theories and more in transcript text, scores each one
//! with an explainable confidence, maps it back to a timestamp and returns a
//! deduplicated, ranked list.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`citation`] - Pattern library, filtering, scoring, timestamps, ranking
//! - [`models`] - Input, candidate and citation data structures
//! - [`sources`] - Alternate candidate sources (analyzer output)
//! - [`enrich`] - Best-effort verification and enrichment
//! - [`cache`] - On-disk result cache used by the CLI
//! - [`config`] - Application configuration (TOML + environment)
//! - [`metrics`] - Prometheus metrics
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```no_run
//! use transcite::citation::extract_citations;
//! use transcite::models::ExtractionInput;
//!
//! let input = ExtractionInput::from_text(r#"The book "Atomic Habits" by James Clear changed my life."#);
//! for citation in extract_citations(&input, None) {
//!     println!("{} ({}) {:.2}", citation.title, citation.category, citation.confidence);
//! }
//! ```

pub mod cache;
pub mod citation;
pub mod config;
pub mod enrich;
pub mod error;
pub mod metrics;
pub mod models;
pub mod sources;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::citation::{
        extract_citations, Category, CitationEngine, ExtractionConfig, ExtractionOutcome,
        ExtractionStats, PatternLibrary, RuleDefinition,
    };
    pub use crate::config::Config;
    pub use crate::enrich::{enrich_citations, EnrichOptions, Enricher, KnowledgeBaseEnricher};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{
        Citation, ExtractionInput, SourceMetadata, TranscriptSegment, UserInterestProfile,
    };
    pub use crate::sources::{CandidateSource, JsonCandidateSource};
}

// Direct re-exports for convenience
pub use citation::{extract_citations, Category, CitationEngine};
pub use models::{Citation, ExtractionInput, TranscriptSegment};
