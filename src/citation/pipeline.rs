//! Citation engine
//!
//! The full pipeline as an explicit value: text (and optional segments) go
//! through extraction, validity filtering, scoring, timestamp lookup,
//! deduplication and ranking. Nothing is kept between calls; every run is a
//! pure function of its input, the optional profile and the engine's
//! immutable configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use transcite::citation::{CitationEngine, ExtractionConfig};
//! use transcite::models::ExtractionInput;
//!
//! let engine = CitationEngine::new(ExtractionConfig::default())?;
//! let input = ExtractionInput::from_text(r#"The book "Atomic Habits" by James Clear"#);
//! for citation in engine.extract(&input, None) {
//!     println!("{} ({:.2})", citation.title, citation.confidence);
//! }
//! ```

use futures::stream::{self, StreamExt};
use std::ops::Range;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use super::category::Category;
use super::config::ExtractionConfig;
use super::dedup::dedupe;
use super::extractor::{clean_title, context_window, Extractor};
use super::filter::ValidityFilter;
use super::patterns::PatternLibrary;
use super::ranker::rank;
use super::scoring::ConfidenceScorer;
use super::stats::ExtractionStats;
use super::timestamp::TimestampLocator;
use super::weights::EXTERNAL_DEFAULT_STRENGTH;
use crate::error::Result;
use crate::metrics;
use crate::models::{
    Candidate, CandidateOrigin, Citation, ExternalCandidate, ExtractionInput, SourceMetadata,
    UserInterestProfile,
};
use crate::sources::CandidateSource;

/// Citations plus the statistics of the run that produced them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionOutcome {
    pub citations: Vec<Citation>,
    pub stats: ExtractionStats,
}

/// Configured extraction pipeline
#[derive(Debug, Clone)]
pub struct CitationEngine {
    extractor: Extractor,
    filter: ValidityFilter,
    scorer: ConfidenceScorer,
    locator: TimestampLocator,
    config: ExtractionConfig,
}

impl Default for CitationEngine {
    fn default() -> Self {
        Self::from_parts(ExtractionConfig::default(), PatternLibrary::shared())
    }
}

impl CitationEngine {
    /// Built-in rules plus the config's custom rules
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let library = PatternLibrary::shared_with(&config.custom_rules);
        Ok(Self::from_parts(config, library))
    }

    /// Use a caller-supplied library instead of the built-in one
    pub fn with_library(config: ExtractionConfig, library: PatternLibrary) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, Arc::new(library)))
    }

    fn from_parts(config: ExtractionConfig, library: Arc<PatternLibrary>) -> Self {
        let extractor = Extractor::new(library).with_context_window(config.context_window);
        Self {
            extractor,
            filter: ValidityFilter::default(),
            scorer: ConfidenceScorer::new(),
            locator: TimestampLocator::new(),
            config,
        }
    }

    /// Replace the validity filter
    pub fn with_filter(mut self, filter: ValidityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn library(&self) -> &PatternLibrary {
        self.extractor.library()
    }

    /// Ranked citations for one input
    pub fn extract(
        &self,
        input: &ExtractionInput,
        profile: Option<&UserInterestProfile>,
    ) -> Vec<Citation> {
        self.extract_with_stats(input, profile).citations
    }

    /// Ranked citations plus run statistics
    pub fn extract_with_stats(
        &self,
        input: &ExtractionInput,
        profile: Option<&UserInterestProfile>,
    ) -> ExtractionOutcome {
        let start = Instant::now();
        let mut stats = ExtractionStats::new(input.text.chars().count());

        let candidates = self.pattern_candidates(input, &mut stats);
        self.finish(candidates, input, profile, stats, start)
    }

    /// Like [`extract_with_stats`](Self::extract_with_stats), with chunks
    /// processed on the blocking thread pool.
    ///
    /// At most `max_parallel_chunks` chunks run at once. Results are put back
    /// in chunk order before deduplication, so the output matches the
    /// sequential path.
    pub async fn extract_parallel(
        self: Arc<Self>,
        input: &ExtractionInput,
        profile: Option<&UserInterestProfile>,
    ) -> ExtractionOutcome {
        let start = Instant::now();
        let mut stats = ExtractionStats::new(input.text.chars().count());

        let plan = self.chunk_plan(&input.text);
        stats.chunk_count = plan.len();

        let shared = Arc::new(input.clone());
        let mut results: Vec<(usize, Vec<Candidate>, ExtractionStats)> =
            stream::iter(plan.into_iter().enumerate())
                .map(|(index, (range, owned))| {
                    let engine = Arc::clone(&self);
                    let input = Arc::clone(&shared);
                    async move {
                        let task = tokio::task::spawn_blocking(move || {
                            let mut chunk_stats = ExtractionStats::default();
                            let candidates = engine.chunk_candidates(
                                &input.text[range],
                                owned,
                                input.metadata.as_ref(),
                                &mut chunk_stats,
                            );
                            (candidates, chunk_stats)
                        });
                        match task.await {
                            Ok((candidates, chunk_stats)) => Some((index, candidates, chunk_stats)),
                            Err(e) => {
                                tracing::warn!(chunk = index, error = %e, "Chunk extraction task failed");
                                None
                            }
                        }
                    }
                })
                .buffer_unordered(self.config.max_parallel_chunks)
                .filter_map(|result| async move { result })
                .collect()
                .await;

        results.sort_by_key(|(index, _, _)| *index);

        let mut candidates = Vec::new();
        for (_, chunk_candidates, chunk_stats) in results {
            stats.absorb(&chunk_stats);
            candidates.extend(chunk_candidates);
        }

        self.finish(candidates, input, profile, stats, start)
    }

    /// Pattern extraction merged with candidates from alternate sources.
    ///
    /// A source that fails is logged and skipped; the rest of the run is
    /// unaffected.
    pub async fn extract_with_sources(
        &self,
        input: &ExtractionInput,
        profile: Option<&UserInterestProfile>,
        sources: &[Box<dyn CandidateSource>],
    ) -> ExtractionOutcome {
        let start = Instant::now();
        let mut stats = ExtractionStats::new(input.text.chars().count());

        let mut candidates = self.pattern_candidates(input, &mut stats);

        let fetched = futures::future::join_all(
            sources
                .iter()
                .map(|source| async move { (source.name().to_string(), source.candidates(input).await) }),
        )
        .await;

        let mut external = Vec::new();
        for (name, result) in fetched {
            match result {
                Ok(list) => {
                    tracing::debug!(source = %name, count = list.len(), "Received external candidates");
                    external.extend(list.into_iter().map(|c| (name.clone(), c)));
                }
                Err(e) => {
                    tracing::warn!(source = %name, error = %e, "Candidate source failed, continuing without it");
                    metrics::record_source_failure(&name);
                }
            }
        }

        let first_order = candidates.len();
        candidates.extend(self.score_external(external, input, first_order, &mut stats));

        self.finish(candidates, input, profile, stats, start)
    }

    /// Normalize, filter and score externally supplied candidates.
    ///
    /// These go through the cross-validation path of the scorer.
    pub fn score_external(
        &self,
        external: Vec<(String, ExternalCandidate)>,
        input: &ExtractionInput,
        first_order: usize,
        stats: &mut ExtractionStats,
    ) -> Vec<Candidate> {
        let mut out = Vec::new();
        let text_lower = input.text.to_lowercase();

        for (offset, (source, ext)) in external.into_iter().enumerate() {
            stats.external_candidates += 1;

            let Some(category) = Category::parse(&ext.category) else {
                tracing::debug!(source = %source, category = %ext.category, "Unknown external category");
                *stats.rejected.entry("unknown_category".to_string()).or_insert(0) += 1;
                metrics::record_candidate("rejected");
                continue;
            };

            let title = clean_title(&ext.title, category);
            if let Err(reason) = self.filter.check(&title, category) {
                tracing::debug!(title = %title, category = %category, reason = %reason, "Rejected external candidate");
                stats.record_rejection(reason);
                metrics::record_candidate("rejected");
                continue;
            }

            let raw_context = find_context(&input.text, &text_lower, &title, self.config.context_window);
            let mut candidate = Candidate {
                title,
                author: ext.author.filter(|a| !a.trim().is_empty()),
                category,
                confidence: 0.0,
                source_rule_id: format!("external.{source}"),
                raw_context,
                origin: CandidateOrigin::External { source },
                timestamp: None,
                strength: ext
                    .confidence
                    .filter(|c| c.is_finite())
                    .map(|c| c.clamp(0.0, 1.0))
                    .unwrap_or(EXTERNAL_DEFAULT_STRENGTH),
                order: first_order + offset,
            };

            candidate.confidence =
                self.scorer
                    .score(&candidate, &input.text, input.metadata.as_ref());
            if candidate.confidence < self.config.min_confidence {
                stats.low_confidence += 1;
                metrics::record_candidate("low_confidence");
                continue;
            }

            metrics::record_candidate("accepted");
            out.push(candidate);
        }

        out
    }

    /// Sequential pattern path over every chunk
    fn pattern_candidates(
        &self,
        input: &ExtractionInput,
        stats: &mut ExtractionStats,
    ) -> Vec<Candidate> {
        let plan = self.chunk_plan(&input.text);
        stats.chunk_count = plan.len();

        let mut candidates = Vec::new();
        for (range, owned) in plan {
            let chunk = &input.text[range];
            candidates.extend(self.chunk_candidates(chunk, owned, input.metadata.as_ref(), stats));
        }
        candidates
    }

    /// Extract, filter and score the candidates of one chunk.
    ///
    /// Only matches whose end offset falls in `owned` are kept.
    fn chunk_candidates(
        &self,
        chunk: &str,
        owned: Range<usize>,
        metadata: Option<&SourceMetadata>,
        stats: &mut ExtractionStats,
    ) -> Vec<Candidate> {
        let mut out = Vec::new();

        let matches = self
            .extractor
            .matches(chunk)
            .filter(|raw| owned.contains(&(raw.offset + raw.full_match.len())));

        for (order, raw) in matches.enumerate() {
            stats.raw_matches += 1;

            if let Err(reason) = self.filter.check(raw.title(), raw.category) {
                tracing::debug!(
                    title = %raw.title(),
                    rule_id = %raw.rule_id,
                    reason = %reason,
                    "Rejected candidate"
                );
                stats.record_rejection(reason);
                metrics::record_candidate("rejected");
                continue;
            }

            let mut candidate = raw.into_candidate(order);
            candidate.confidence = self.scorer.score(&candidate, chunk, metadata);
            if candidate.confidence < self.config.min_confidence {
                stats.low_confidence += 1;
                metrics::record_candidate("low_confidence");
                continue;
            }

            metrics::record_candidate("accepted");
            out.push(candidate);
        }

        out
    }

    /// Locate, deduplicate, rank and freeze into citations
    fn finish(
        &self,
        mut candidates: Vec<Candidate>,
        input: &ExtractionInput,
        profile: Option<&UserInterestProfile>,
        mut stats: ExtractionStats,
        start: Instant,
    ) -> ExtractionOutcome {
        for (order, candidate) in candidates.iter_mut().enumerate() {
            candidate.order = order;
            if candidate.timestamp.is_none() && !input.segments.is_empty() {
                candidate.timestamp = self.locator.locate(&candidate.title, &input.segments);
            }
        }

        let before = candidates.len();
        let unique = dedupe(candidates);
        stats.duplicates_removed = before - unique.len();

        let citations: Vec<Citation> = rank(unique, profile, self.config.max_results)
            .into_iter()
            .map(Citation::from_candidate)
            .collect();

        for citation in &citations {
            stats.record_citation(
                citation.category,
                citation.confidence,
                citation.timestamp.is_some(),
            );
            metrics::record_citation(citation.category.as_str());
        }

        stats.set_duration(start);
        metrics::observe_extraction(start.elapsed().as_secs_f64());

        tracing::info!(
            chars = stats.source_length,
            chunks = stats.chunk_count,
            matches = stats.raw_matches,
            rejected = stats.total_rejected(),
            duplicates = stats.duplicates_removed,
            citations = stats.citations,
            duration_ms = stats.duration_ms,
            "Citation extraction complete"
        );

        ExtractionOutcome { citations, stats }
    }

    fn chunk_plan(&self, text: &str) -> Vec<(Range<usize>, Range<usize>)> {
        chunk_plan(chunk_ranges(
            text,
            self.config.chunk_size,
            self.config.chunk_overlap,
        ))
    }
}

/// Byte ranges of overlapping chunks, cut on char boundaries.
///
/// Empty or whitespace-only text yields no chunks. A `chunk_size` of zero or
/// an overlap that is not smaller than the chunk size falls back to a single
/// chunk.
pub fn chunk_ranges(text: &str, chunk_size: usize, overlap: usize) -> Vec<Range<usize>> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let total = starts.len();
    if chunk_size == 0 || overlap >= chunk_size || total <= chunk_size {
        return vec![0..text.len()];
    }

    let byte_at = |char_index: usize| starts.get(char_index).copied().unwrap_or(text.len());
    let step = chunk_size - overlap;

    let mut ranges = Vec::new();
    let mut from = 0;
    loop {
        let to = (from + chunk_size).min(total);
        ranges.push(byte_at(from)..byte_at(to));
        if to == total {
            break;
        }
        from += step;
    }
    ranges
}

/// Pairs each chunk with the local byte span of match ends it owns.
///
/// A match belongs to the chunk it ends in. Every chunk but the last gives up
/// matches that run into its own end, since they may be cut off there; the
/// next chunk owns ends from that point on and re-scans the overlap, so a
/// match shorter than the overlap is always seen whole exactly once.
fn chunk_plan(ranges: Vec<Range<usize>>) -> Vec<(Range<usize>, Range<usize>)> {
    let last = ranges.len().saturating_sub(1);
    let mut previous_end = None;
    ranges
        .into_iter()
        .enumerate()
        .map(|(i, range)| {
            let len = range.end - range.start;
            let from = previous_end.map_or(0, |end: usize| end.saturating_sub(range.start));
            let to = if i == last { len + 1 } else { len };
            previous_end = Some(range.end);
            (range, from..to)
        })
        .collect()
}

/// Context around the first case-insensitive occurrence of `title`
fn find_context(text: &str, text_lower: &str, title: &str, window: usize) -> String {
    let needle = title.to_lowercase();
    if needle.is_empty() || text_lower.len() != text.len() {
        // offsets only line up when lower-casing kept byte lengths
        return String::new();
    }
    match text_lower.find(&needle) {
        Some(start) if text.is_char_boundary(start) && text.is_char_boundary(start + needle.len()) => {
            context_window(text, start, start + needle.len(), window).to_string()
        }
        _ => String::new(),
    }
}

/// Extract with the default engine
pub fn extract_citations(
    input: &ExtractionInput,
    profile: Option<&UserInterestProfile>,
) -> Vec<Citation> {
    static ENGINE: LazyLock<CitationEngine> = LazyLock::new(CitationEngine::default);
    ENGINE.extract(input, profile)
}
