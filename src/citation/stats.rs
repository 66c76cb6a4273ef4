//! Per-run extraction statistics
//!
//! Counters collected while one input flows through the pipeline. They are
//! returned alongside the citations and never influence the result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use super::category::Category;
use super::filter::Rejection;

/// Statistics for a single extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Source text length (characters)
    pub source_length: usize,

    /// Number of chunks the text was split into
    pub chunk_count: usize,

    /// Regex matches produced by the extractor
    pub raw_matches: usize,

    /// Candidates received from external sources
    pub external_candidates: usize,

    /// Candidates rejected by the validity filter, by reason
    pub rejected: BTreeMap<String, usize>,

    /// Candidates dropped for scoring below the minimum confidence
    pub low_confidence: usize,

    /// Candidates removed by deduplication
    pub duplicates_removed: usize,

    /// Citations returned
    pub citations: usize,

    /// Citations with a located timestamp
    pub timestamps_located: usize,

    /// Citation counts by category
    pub by_category: BTreeMap<String, usize>,

    /// Average confidence of returned citations
    pub avg_confidence: f32,

    /// Extraction duration in milliseconds
    pub duration_ms: u64,
}

impl ExtractionStats {
    pub fn new(source_length: usize) -> Self {
        Self {
            source_length,
            ..Default::default()
        }
    }

    /// Record a validity-filter rejection
    pub fn record_rejection(&mut self, reason: Rejection) {
        *self.rejected.entry(reason.as_str().to_string()).or_insert(0) += 1;
    }

    /// Record a returned citation
    pub fn record_citation(&mut self, category: Category, confidence: f32, located: bool) {
        self.citations += 1;
        if located {
            self.timestamps_located += 1;
        }
        *self.by_category.entry(category.as_str().to_string()).or_insert(0) += 1;

        let total = self.avg_confidence * (self.citations - 1) as f32 + confidence;
        self.avg_confidence = total / self.citations as f32;
    }

    /// Fold the pre-dedup counters of another (chunk) run into this one
    pub fn absorb(&mut self, other: &ExtractionStats) {
        self.raw_matches += other.raw_matches;
        self.external_candidates += other.external_candidates;
        self.low_confidence += other.low_confidence;
        for (reason, count) in &other.rejected {
            *self.rejected.entry(reason.clone()).or_insert(0) += count;
        }
    }

    /// Total candidates rejected by the filter
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Set duration from Instant
    pub fn set_duration(&mut self, start: Instant) {
        self.duration_ms = start.elapsed().as_millis() as u64;
    }

    /// Share of candidates that survived filtering, as a percentage
    pub fn acceptance_rate(&self) -> f64 {
        let seen = self.raw_matches + self.external_candidates;
        if seen == 0 {
            0.0
        } else {
            ((seen - self.total_rejected().min(seen)) as f64 / seen as f64) * 100.0
        }
    }

    /// Get summary as formatted string
    pub fn summary(&self) -> String {
        format!(
            "Chars: {} | Matches: {} | Rejected: {} | Low confidence: {} | Duplicates: {} | Citations: {} ({} timed) | Time: {}ms",
            self.source_length,
            self.raw_matches + self.external_candidates,
            self.total_rejected(),
            self.low_confidence,
            self.duplicates_removed,
            self.citations,
            self.timestamps_located,
            self.duration_ms
        )
    }

    /// Get detailed report
    pub fn detailed_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Citation Extraction Report ===\n\n");
        report.push_str(&format!("Source length: {} chars", self.source_length));
        if self.chunk_count > 1 {
            report.push_str(&format!(" in {} chunks", self.chunk_count));
        }
        report.push('\n');

        report.push_str(&format!("Pattern matches: {}\n", self.raw_matches));
        if self.external_candidates > 0 {
            report.push_str(&format!("External candidates: {}\n", self.external_candidates));
        }
        report.push_str(&format!(
            "Rejected by filter: {} ({:.1}% accepted)\n",
            self.total_rejected(),
            self.acceptance_rate()
        ));
        for (reason, count) in &self.rejected {
            report.push_str(&format!("  - {}: {}\n", reason, count));
        }
        report.push_str(&format!("Below min confidence: {}\n", self.low_confidence));
        report.push_str(&format!("Duplicates removed: {}\n", self.duplicates_removed));

        report.push_str(&format!(
            "\nCitations: {} (avg confidence {:.2})\n",
            self.citations, self.avg_confidence
        ));
        for (category, count) in &self.by_category {
            report.push_str(&format!("  - {}: {}\n", category, count));
        }
        report.push_str(&format!("Timestamps located: {}\n", self.timestamps_located));
        report.push_str(&format!("\nTime: {}ms\n", self.duration_ms));

        report
    }
}
