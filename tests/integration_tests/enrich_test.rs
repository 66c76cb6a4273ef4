//! Enrichment tests
//!
//! Enrichment is best-effort: failures and timeouts must leave the citation
//! list intact and unverified.

use async_trait::async_trait;
use std::time::Duration;

use transcite::citation::{extract_citations, Category};
use transcite::enrich::{enrich_citations, EnrichOptions, Enricher, Enrichment, KnowledgeBaseEnricher};
use transcite::models::{Citation, ExtractionInput};

use crate::common::{sample_transcript, write_file, ATOMIC_HABITS, KNOWLEDGE_BASE};

/// Enricher that errors on every call
struct FailingEnricher;

#[async_trait]
impl Enricher for FailingEnricher {
    fn name(&self) -> &str {
        "failing"
    }

    async fn enrich(&self, _citation: &Citation) -> anyhow::Result<Option<Enrichment>> {
        anyhow::bail!("service unavailable")
    }
}

/// Enricher slower than any reasonable timeout
struct SlowEnricher;

#[async_trait]
impl Enricher for SlowEnricher {
    fn name(&self) -> &str {
        "slow"
    }

    async fn enrich(&self, _citation: &Citation) -> anyhow::Result<Option<Enrichment>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Some(Enrichment {
            verified: true,
            ..Default::default()
        }))
    }
}

fn short_timeout() -> EnrichOptions {
    EnrichOptions {
        concurrency: 2,
        timeout: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn test_knowledge_base_verifies_known_titles() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "kb.json", KNOWLEDGE_BASE);
    let enricher = KnowledgeBaseEnricher::from_file(&path).unwrap();

    let citations = extract_citations(&sample_transcript(), None);
    let before = citations.clone();
    let enriched = enrich_citations(citations, &enricher, EnrichOptions::default()).await;

    assert_eq!(enriched.len(), before.len());
    for (after, original) in enriched.iter().zip(&before) {
        assert_eq!(after.id, original.id);
        assert_eq!(after.confidence, original.confidence);
    }

    let atomic = enriched
        .iter()
        .find(|c| c.category == Category::Book && c.title == "Atomic Habits")
        .unwrap();
    assert!(atomic.verified);
    assert_eq!(
        atomic.metadata.extra.get("description").map(String::as_str),
        Some("A book about building good habits")
    );

    let deep_work = enriched.iter().find(|c| c.title == "Deep Work").unwrap();
    assert!(!deep_work.verified);
}

#[tokio::test]
async fn test_enriched_fields_serialize_flat() {
    let mut enricher = KnowledgeBaseEnricher::new();
    enricher.import_json(KNOWLEDGE_BASE).unwrap();

    let citations = extract_citations(&ExtractionInput::from_text(ATOMIC_HABITS), None);
    let enriched = enrich_citations(citations, &enricher, EnrichOptions::default()).await;
    let book = enriched.iter().find(|c| c.category == Category::Book).unwrap();

    let json = serde_json::to_value(book).unwrap();
    assert_eq!(json["verified"], true);
    assert_eq!(json["metadata"]["url"], "https://jamesclear.com/atomic-habits");
    assert!(json["metadata"]["detectionMethod"].is_string());
}

#[tokio::test]
async fn test_failing_enricher_keeps_citations() {
    let citations = extract_citations(&sample_transcript(), None);
    let enriched = enrich_citations(citations.clone(), &FailingEnricher, short_timeout()).await;
    assert_eq!(enriched, citations);
}

#[tokio::test]
async fn test_slow_enricher_times_out() {
    let citations = extract_citations(&ExtractionInput::from_text(ATOMIC_HABITS), None);
    let enriched = enrich_citations(citations.clone(), &SlowEnricher, short_timeout()).await;
    assert_eq!(enriched, citations);
    assert!(enriched.iter().all(|c| !c.verified));
}

#[tokio::test]
async fn test_empty_list() {
    let enriched = enrich_citations(Vec::new(), &FailingEnricher, EnrichOptions::default()).await;
    assert!(enriched.is_empty());
}
