//! Prometheus metrics for citation extraction
//!
//! This module provides metrics tracking for:
//! - Candidates: accepted, rejected by the filter, or below min confidence
//! - Citations emitted per category and extraction latency
//! - Failures of external candidate sources and enrichment lookups
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, or it is never called, metrics operations
//! become no-ops.

use prometheus::{
    register_counter_vec, register_histogram, CounterVec, Encoder, Histogram, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all extraction metrics
struct ExtractionMetrics {
    candidates: CounterVec,
    citations: CounterVec,
    rules_skipped: CounterVec,
    source_failures: CounterVec,
    enrichment: CounterVec,
    duration: Histogram,
}

/// Global storage for extraction metrics
static EXTRACTION_METRICS: OnceLock<ExtractionMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers anything.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = transcite::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = ExtractionMetrics {
        candidates: register_counter_vec!(
            "transcite_candidates_total",
            "Candidates seen by outcome (accepted, rejected, low_confidence)",
            &["outcome"]
        )?,
        citations: register_counter_vec!(
            "transcite_citations_total",
            "Citations emitted by category",
            &["category"]
        )?,
        rules_skipped: register_counter_vec!(
            "transcite_rules_skipped_total",
            "Pattern rules skipped because they failed to compile",
            &["category"]
        )?,
        source_failures: register_counter_vec!(
            "transcite_source_failures_total",
            "External candidate sources that returned an error",
            &["source"]
        )?,
        enrichment: register_counter_vec!(
            "transcite_enrichment_total",
            "Enrichment lookups by outcome (verified, unmatched, failed, timeout)",
            &["outcome"]
        )?,
        duration: register_histogram!(
            "transcite_extraction_duration_seconds",
            "Time spent extracting citations from one input",
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
        )?,
    };

    EXTRACTION_METRICS
        .set(metrics)
        .map_err(|_| "Extraction metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    EXTRACTION_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record the fate of one candidate
pub fn record_candidate(outcome: &str) {
    if let Some(m) = EXTRACTION_METRICS.get() {
        m.candidates.with_label_values(&[outcome]).inc();
    }
}

/// Record one emitted citation
pub fn record_citation(category: &str) {
    if let Some(m) = EXTRACTION_METRICS.get() {
        m.citations.with_label_values(&[category]).inc();
    }
}

/// Record a rule that failed to compile
pub fn record_rule_skipped(category: &str) {
    if let Some(m) = EXTRACTION_METRICS.get() {
        m.rules_skipped.with_label_values(&[category]).inc();
    }
}

/// Record a failing candidate source
pub fn record_source_failure(source: &str) {
    if let Some(m) = EXTRACTION_METRICS.get() {
        m.source_failures.with_label_values(&[source]).inc();
    }
}

/// Record the outcome of one enrichment lookup
pub fn record_enrichment(outcome: &str) {
    if let Some(m) = EXTRACTION_METRICS.get() {
        m.enrichment.with_label_values(&[outcome]).inc();
    }
}

/// Observe the duration of one extraction run
pub fn observe_extraction(seconds: f64) {
    if let Some(m) = EXTRACTION_METRICS.get() {
        m.duration.observe(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_before_init_are_noops() {
        // Must not panic regardless of init state
        record_candidate("accepted");
        record_citation("book");
        record_rule_skipped("paper");
        record_source_failure("analyzer");
        record_enrichment("verified");
        observe_extraction(0.01);
    }

    #[test]
    fn test_init_and_encode() {
        init_metrics().unwrap();
        assert!(metrics_initialized());
        // Second call is a no-op
        init_metrics().unwrap();

        record_candidate("accepted");
        record_citation("book");
        observe_extraction(0.02);

        let text = encode_metrics().unwrap();
        assert!(text.contains("transcite_candidates_total"));
        assert!(text.contains("transcite_extraction_duration_seconds"));
    }
}
