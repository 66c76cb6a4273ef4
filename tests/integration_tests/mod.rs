//! Integration tests module
//!
//! End-to-end tests for the transcite engine:
//! - Complete extract → filter → score → locate → dedupe → rank pipeline
//! - Alternate candidate sources
//! - Best-effort enrichment
//! - Result cache

pub mod cache_test;
pub mod enrich_test;
pub mod pipeline_test;
pub mod sources_test;
