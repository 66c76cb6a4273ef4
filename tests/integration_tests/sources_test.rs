//! Alternate candidate source tests

use async_trait::async_trait;

use transcite::citation::{Category, CitationEngine};
use transcite::models::{ExternalCandidate, ExtractionInput};
use transcite::sources::{CandidateSource, JsonCandidateSource};

use crate::common::{write_file, ATOMIC_HABITS};

/// Source that always fails
struct BrokenSource;

#[async_trait]
impl CandidateSource for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    async fn candidates(&self, _input: &ExtractionInput) -> anyhow::Result<Vec<ExternalCandidate>> {
        anyhow::bail!("analyzer unreachable")
    }
}

const ANALYZER_OUTPUT: &str = r#"```json
{"citations": [
    {"title": "Deep Work", "author": "Cal Newport", "type": "book", "confidence": 0.8},
    {"title": "Quantum Gravity", "type": "book"},
    {"title": "Something", "type": "podcast"}
]}
```"#;

#[tokio::test]
async fn test_external_candidates_are_merged() {
    let engine = CitationEngine::default();
    let input = ExtractionInput::from_text("today we talk about deep work and focus");
    let sources: Vec<Box<dyn CandidateSource>> =
        vec![Box::new(JsonCandidateSource::from_json("analyzer", ANALYZER_OUTPUT))];

    let outcome = engine.extract_with_sources(&input, None, &sources).await;

    let deep_work = outcome
        .citations
        .iter()
        .find(|c| c.title == "Deep Work")
        .unwrap();
    assert_eq!(deep_work.category, Category::Book);
    assert_eq!(deep_work.author.as_deref(), Some("Cal Newport"));
    assert_eq!(deep_work.metadata.source, "analyzer");
    assert_eq!(deep_work.metadata.detection_method, "external:analyzer");
    assert!(!deep_work.verified);

    // Unsupported by the text, or of an unknown category
    assert!(outcome.citations.iter().all(|c| c.title != "Quantum Gravity"));
    assert!(outcome.citations.iter().all(|c| c.title != "Something"));
    assert_eq!(outcome.stats.external_candidates, 3);
}

#[tokio::test]
async fn test_failing_source_does_not_abort_extraction() {
    let engine = CitationEngine::default();
    let input = ExtractionInput::from_text(ATOMIC_HABITS);
    let sources: Vec<Box<dyn CandidateSource>> = vec![
        Box::new(BrokenSource),
        Box::new(JsonCandidateSource::from_json("garbage", "not json at all")),
    ];

    let outcome = engine.extract_with_sources(&input, None, &sources).await;
    let plain = engine.extract(&input, None);
    assert_eq!(outcome.citations, plain);
    assert_eq!(outcome.stats.external_candidates, 0);
}

#[tokio::test]
async fn test_external_duplicate_of_pattern_match_keeps_one() {
    let engine = CitationEngine::default();
    let input = ExtractionInput::from_text(ATOMIC_HABITS);
    let sources: Vec<Box<dyn CandidateSource>> = vec![Box::new(JsonCandidateSource::from_json(
        "analyzer",
        r#"[{"title": "atomic habits", "type": "book", "confidence": 0.5}]"#,
    ))];

    let outcome = engine.extract_with_sources(&input, None, &sources).await;
    let books: Vec<_> = outcome
        .citations
        .iter()
        .filter(|c| c.category == Category::Book)
        .collect();
    assert_eq!(books.len(), 1);
    assert!(outcome.stats.duplicates_removed >= 1);
}

#[tokio::test]
async fn test_file_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "candidates.json",
        r#"[{"title": "Deep Work", "type": "book", "confidence": 0.9}]"#,
    );

    let source = JsonCandidateSource::from_path("file", &path);
    let input = ExtractionInput::from_text("deep work is the topic");
    let list = source.candidates(&input).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].category, "book");
}
