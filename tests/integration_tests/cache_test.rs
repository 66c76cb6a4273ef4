//! Result cache tests

use tempfile::TempDir;

use transcite::cache::{CacheConfig, CitationCache};
use transcite::citation::{CitationEngine, ExtractionConfig};
use transcite::models::{SourceMetadata, TranscriptSegment};

use crate::common::{sample_transcript, write_file};

#[tokio::test]
async fn test_cached_citations_round_trip_through_disk() {
    let temp_dir = TempDir::new().unwrap();
    let cache = CitationCache::new(&CacheConfig::new(temp_dir.path().join("cache"))).unwrap();

    let input = sample_transcript();
    let config = ExtractionConfig::default();
    let key = CitationCache::key(&input, &config).unwrap();

    assert!(cache.get(&key).await.unwrap().is_none());

    let citations = CitationEngine::new(config).unwrap().extract(&input, None);
    cache.put(&key, &citations).await.unwrap();

    let hit = cache.get(&key).await.unwrap().unwrap();
    assert_eq!(hit.citations, citations);
    assert_eq!(hit.key, key);
    assert!(temp_dir.path().join("cache").join(format!("{key}.json")).exists());
}

#[test]
fn test_key_covers_segments_metadata_and_settings() {
    let config = ExtractionConfig::default();
    let base = sample_transcript();
    let base_key = CitationCache::key(&base, &config).unwrap();

    let mut moved = base.clone();
    moved.segments.push(TranscriptSegment::new("outro", 300.0));
    assert_ne!(CitationCache::key(&moved, &config).unwrap(), base_key);

    let described = base.clone().with_metadata(SourceMetadata {
        title: Some("Books that changed my life".to_string()),
        ..Default::default()
    });
    assert_ne!(CitationCache::key(&described, &config).unwrap(), base_key);

    let stricter = ExtractionConfig::builder().min_confidence(0.9).build().unwrap();
    assert_ne!(CitationCache::key(&base, &stricter).unwrap(), base_key);
}

#[tokio::test]
async fn test_expired_entries_are_misses() {
    let temp_dir = TempDir::new().unwrap();
    let cache = CitationCache::new(&CacheConfig::new(temp_dir.path()).with_ttl(60)).unwrap();

    // Entry written two minutes ago
    let stale = serde_json::json!({
        "key": "stale",
        "citations": [],
        "cached_at": chrono::Utc::now().timestamp() - 120,
    });
    std::fs::write(temp_dir.path().join("stale.json"), stale.to_string()).unwrap();

    assert!(cache.get("stale").await.unwrap().is_none());
    assert_eq!(cache.stats().misses, 1);
}

#[tokio::test]
async fn test_editing_candidates_file_misses_cache() {
    let temp_dir = TempDir::new().unwrap();
    let cache = CitationCache::new(&CacheConfig::new(temp_dir.path().join("cache"))).unwrap();
    let analyzer = write_file(
        temp_dir.path(),
        "analyzer.json",
        r#"[{"title": "Deep Work", "type": "book"}]"#,
    );

    let input = sample_transcript();
    let config = ExtractionConfig::default();
    let key_for = |digest: String| {
        CitationCache::key(
            &input,
            &serde_json::json!({ "extraction": &config, "candidates": digest }),
        )
        .unwrap()
    };

    let first = key_for(CitationCache::file_digest(&analyzer).await.unwrap());
    cache.put(&first, &[]).await.unwrap();
    assert!(cache.get(&first).await.unwrap().is_some());

    std::fs::write(&analyzer, r#"[{"title": "Sapiens", "type": "book"}]"#).unwrap();
    let second = key_for(CitationCache::file_digest(&analyzer).await.unwrap());
    assert_ne!(first, second);
    assert!(cache.get(&second).await.unwrap().is_none());
}
