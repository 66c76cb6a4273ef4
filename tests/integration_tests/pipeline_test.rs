//! End-to-end extraction tests
//!
//! Tests the complete workflow:
//! 1. Pattern extraction
//! 2. Validity filtering and scoring
//! 3. Timestamp lookup
//! 4. Deduplication and ranking

use std::sync::Arc;

use transcite::citation::{
    extract_citations, rank, Category, CitationEngine, ExtractionConfig, RuleDefinition,
    ValidityFilter,
};
use transcite::models::{Candidate, ExtractionInput, UserInterestProfile};

use crate::common::{
    long_transcript, of_category, sample_transcript, ATOMIC_HABITS, CHATTER, NATURE_PAPER,
};

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_quoted_book_with_author() {
    let citations = extract_citations(&ExtractionInput::from_text(ATOMIC_HABITS), None);
    let books = of_category(&citations, Category::Book);

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Atomic Habits");
    assert_eq!(books[0].author.as_deref(), Some("James Clear"));
    assert!(books[0].confidence >= 0.7);
    assert_eq!(books[0].metadata.source, "transcript");
    assert!(books[0].metadata.detection_method.starts_with("pattern:book."));
}

#[test]
fn test_paper_venue() {
    let citations = extract_citations(&ExtractionInput::from_text(NATURE_PAPER), None);
    let papers = of_category(&citations, Category::Paper);
    assert!(!papers.is_empty(), "{citations:?}");
    assert!(papers.iter().any(|p| p.title.contains("Nature")));
}

#[test]
fn test_generic_chatter_yields_nothing() {
    assert!(extract_citations(&ExtractionInput::from_text(CHATTER), None).is_empty());
}

#[test]
fn test_empty_text_yields_empty_list() {
    assert!(extract_citations(&ExtractionInput::from_text(""), None).is_empty());
    assert!(extract_citations(&ExtractionInput::from_text("   \n\t"), None).is_empty());
}

// ============================================================================
// Pipeline Properties
// ============================================================================

#[test]
fn test_extraction_is_deterministic() {
    let input = sample_transcript();
    let engine = CitationEngine::default();
    let first = engine.extract(&input, None);
    let second = engine.extract(&input, None);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_timestamps_from_segments() {
    let citations = CitationEngine::default().extract(&sample_transcript(), None);

    let atomic = citations.iter().find(|c| c.title == "Atomic Habits").unwrap();
    assert_eq!(atomic.timestamp, Some(42));
    assert_eq!(atomic.timestamp_label().as_deref(), Some("0:42"));

    let deep_work = citations.iter().find(|c| c.title == "Deep Work").unwrap();
    assert_eq!(deep_work.timestamp, Some(95));
}

#[test]
fn test_no_segments_means_no_timestamps() {
    let input = ExtractionInput::from_text(sample_transcript().text);
    let citations = CitationEngine::default().extract(&input, None);
    assert!(!citations.is_empty());
    assert!(citations.iter().all(|c| c.timestamp.is_none()));
}

#[test]
fn test_confidences_are_sorted_and_bounded() {
    let citations = CitationEngine::default().extract(&long_transcript(), None);
    assert!(!citations.is_empty());
    for pair in citations.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    assert!(citations
        .iter()
        .all(|c| (0.0..=1.0).contains(&c.confidence)));
}

#[test]
fn test_ids_are_unique_and_stable() {
    let citations = CitationEngine::default().extract(&long_transcript(), None);
    let mut ids: Vec<_> = citations.iter().map(|c| c.id.clone()).collect();
    let before = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), before);

    let atomic = citations.iter().find(|c| c.title == "Atomic Habits").unwrap();
    assert!(atomic.id.starts_with("book-"));
    assert_eq!(atomic.id.len(), "book-".len() + 12);
}

#[test]
fn test_repeated_mentions_collapse() {
    let citations = CitationEngine::default().extract(&long_transcript(), None);
    let atomic: Vec<_> = citations
        .iter()
        .filter(|c| c.category == Category::Book && c.title == "Atomic Habits")
        .collect();
    assert_eq!(atomic.len(), 1);
}

// ============================================================================
// Chunking
// ============================================================================

fn chunked_engine() -> CitationEngine {
    let config = ExtractionConfig::builder()
        .chunk_size(240)
        .chunk_overlap(60)
        .max_parallel_chunks(3)
        .build()
        .unwrap();
    CitationEngine::new(config).unwrap()
}

#[test]
fn test_chunked_stats() {
    let input = long_transcript();
    let outcome = chunked_engine().extract_with_stats(&input, None);
    assert!(outcome.stats.chunk_count > 1);
    assert!(outcome.stats.duplicates_removed > 0);
    assert_eq!(outcome.stats.citations, outcome.citations.len());
    assert!(outcome
        .citations
        .iter()
        .any(|c| c.title == "Atomic Habits" && c.author.as_deref() == Some("James Clear")));
}

#[tokio::test]
async fn test_parallel_matches_sequential() {
    let input = long_transcript();
    let engine = Arc::new(chunked_engine());

    let sequential = engine.extract_with_stats(&input, None);
    let parallel = Arc::clone(&engine).extract_parallel(&input, None).await;

    assert_eq!(parallel.citations, sequential.citations);
    assert_eq!(parallel.stats.chunk_count, sequential.stats.chunk_count);
    assert_eq!(parallel.stats.raw_matches, sequential.stats.raw_matches);
}

#[test]
fn test_custom_length_bounds_through_filter() {
    let input = ExtractionInput::from_text(ATOMIC_HABITS);
    let engine = CitationEngine::new(ExtractionConfig::default())
        .unwrap()
        .with_filter(ValidityFilter::new().with_length_bounds(Category::Book, 1, 5));

    let citations = engine.extract(&input, None);
    assert!(of_category(&citations, Category::Book).is_empty());
    assert!(!of_category(&extract_citations(&input, None), Category::Book).is_empty());
}

/// Default-sized transcript with `sentence` starting `before` chars ahead of
/// the first chunk boundary
fn straddling_transcript(sentence: &str, before: usize) -> ExtractionInput {
    let boundary = ExtractionConfig::default().chunk_size;
    let mut text = String::new();
    while text.len() < boundary {
        text.push_str("and we kept talking for a while ");
    }
    text.truncate(boundary - before - 1);
    text.push(' ');
    text.push_str(sentence);
    for _ in 0..20 {
        text.push_str(" and we kept talking for a while");
    }
    ExtractionInput::from_text(text)
}

#[tokio::test]
async fn test_name_across_chunk_boundary_is_whole() {
    // "the physicist Albert Ein" ends exactly on the boundary
    let input = straddling_transcript("the physicist Albert Einstein changed everything.", 24);
    let engine = Arc::new(CitationEngine::default());

    let outcome = engine.extract_with_stats(&input, None);
    assert_eq!(outcome.stats.chunk_count, 2);

    let people: Vec<&str> = of_category(&outcome.citations, Category::Person)
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(people, vec!["Albert Einstein"]);

    let parallel = Arc::clone(&engine).extract_parallel(&input, None).await;
    assert_eq!(parallel.citations, outcome.citations);
}

#[test]
fn test_match_inside_overlap_is_counted_once() {
    // well inside the 400-char overlap, seen by both chunks
    let input = straddling_transcript("the physicist Albert Einstein changed everything.", 200);
    let outcome = CitationEngine::default().extract_with_stats(&input, None);
    assert_eq!(outcome.stats.chunk_count, 2);
    assert_eq!(outcome.stats.duplicates_removed, 0);
    assert_eq!(of_category(&outcome.citations, Category::Person).len(), 1);
}

#[tokio::test]
async fn test_parallel_empty_input() {
    let engine = Arc::new(CitationEngine::default());
    let outcome = engine.extract_parallel(&ExtractionInput::default(), None).await;
    assert!(outcome.citations.is_empty());
}

// ============================================================================
// Personalization and Configuration
// ============================================================================

#[test]
fn test_profile_boost_orders_equal_candidates() {
    let profile: UserInterestProfile =
        serde_json::from_str(r#"{"topicWeights": {"book": 1.0, "paper": 0.0}}"#).unwrap();

    let ranked = rank(
        vec![
            Candidate::new("Climate Findings", Category::Paper, 0.6),
            Candidate::new("Sapiens", Category::Book, 0.6),
        ],
        Some(&profile),
        None,
    );
    assert_eq!(ranked[0].category, Category::Book);
    assert_eq!(ranked[1].category, Category::Paper);
}

#[test]
fn test_profile_is_not_modified() {
    let profile: UserInterestProfile =
        serde_json::from_str(r#"{"topicWeights": {"event": 1.0}, "authorWeights": {"James Clear": 0.9}}"#)
            .unwrap();
    let snapshot = profile.clone();
    let _ = CitationEngine::default().extract(&sample_transcript(), Some(&profile));
    assert_eq!(profile, snapshot);
}

#[test]
fn test_max_results() {
    let config = ExtractionConfig::builder().max_results(2).build().unwrap();
    let citations = CitationEngine::new(config)
        .unwrap()
        .extract(&long_transcript(), None);
    assert_eq!(citations.len(), 2);
}

#[test]
fn test_custom_rule_table_extends_extraction() {
    let config = ExtractionConfig::builder()
        .rule(
            RuleDefinition::new(
                "event.grand_prix",
                Category::Event,
                r"\b((?:[A-Z][a-z]+\s+)Grand Prix)\b",
            )
            .with_strength(0.9),
        )
        .rule(RuleDefinition::new("event.broken", Category::Event, r"([A-Z"))
        .build()
        .unwrap();
    let engine = CitationEngine::new(config).unwrap();

    let citations = engine.extract(
        &ExtractionInput::from_text("Verstappen won the Monaco Grand Prix again."),
        None,
    );
    assert!(citations
        .iter()
        .any(|c| c.category == Category::Event && c.title == "Monaco Grand Prix"));
    assert_eq!(engine.library().skipped_rules(), &["event.broken".to_string()]);
}

#[test]
fn test_json_output_shape() {
    let citations = extract_citations(&ExtractionInput::from_text(ATOMIC_HABITS), None);
    let book = of_category(&citations, Category::Book)[0];
    let json = serde_json::to_value(book).unwrap();

    assert_eq!(json["type"], "book");
    assert_eq!(json["verified"], false);
    assert!(json["metadata"]["detectionMethod"].is_string());
    assert!(json["metadata"]["source"].is_string());
    assert!(json["metadata"]["context"].is_string());
    assert!(json["timestamp"].is_null());
}
