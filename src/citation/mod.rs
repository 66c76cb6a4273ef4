//! Citation extraction and ranking
//!
//! This module turns transcript text into a ranked, deduplicated list of
//! typed citations (books, papers, people, places, events, quotes,
//! statistics, theories and more).
//!
//! # Pipeline
//!
//! ```text
//! text + segments
//!   → Extractor (pattern library)
//!   → ValidityFilter
//!   → ConfidenceScorer
//!   → TimestampLocator
//!   → dedupe
//!   → rank (optional UserInterestProfile)
//!   → Vec<Citation>
//! ```
//!
//! Rules are data ([`patterns::RuleDefinition`]) and every scoring weight
//! lives in [`weights`].

pub mod category;
pub mod config;
pub mod dedup;
pub mod extractor;
pub mod filter;
pub mod patterns;
pub mod pipeline;
pub mod ranker;
pub mod scoring;
pub mod stats;
pub mod timestamp;
pub mod weights;

pub use category::Category;
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use dedup::{dedupe, normalize_title};
pub use extractor::{Extractor, RawMatch};
pub use filter::{is_valid, Rejection, ValidityFilter};
pub use patterns::{CaptureRole, PatternLibrary, PatternRule, RuleDefinition};
pub use pipeline::{chunk_ranges, extract_citations, CitationEngine, ExtractionOutcome};
pub use ranker::{personalized_score, rank};
pub use scoring::{ConfidenceScorer, ScoreBreakdown};
pub use stats::ExtractionStats;
pub use timestamp::{locate, TimestampLocator};
