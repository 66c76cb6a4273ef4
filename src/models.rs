// Core data structures for transcite

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::citation::category::Category;
use crate::citation::dedup::normalize_title;

/// One time-aligned piece of a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    #[serde(rename = "start", alias = "startSeconds", alias = "start_seconds")]
    pub start_seconds: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
        }
    }
}

/// Descriptive metadata of the video the transcript belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
}

impl SourceMetadata {
    /// Whether the lower-cased title or description contains `needle_lower`
    pub fn mentions(&self, needle_lower: &str) -> bool {
        if needle_lower.is_empty() {
            return false;
        }
        [&self.title, &self.description]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

/// Everything the engine consumes for one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionInput {
    #[serde(default)]
    pub text: String,

    /// Ordered by start time; may be empty
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,

    #[serde(default)]
    pub metadata: Option<SourceMetadata>,
}

impl ExtractionInput {
    /// Input with plain text only
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_segments(mut self, segments: Vec<TranscriptSegment>) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// SHA-256 over text, segments and metadata, hex encoded
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        for segment in &self.segments {
            hasher.update([0u8]);
            hasher.update(segment.start_seconds.to_le_bytes());
            hasher.update(segment.text.as_bytes());
        }
        if let Some(meta) = &self.metadata {
            for field in [&meta.title, &meta.description, &meta.channel] {
                hasher.update([1u8]);
                hasher.update(field.as_deref().unwrap_or_default().as_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Where a candidate came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CandidateOrigin {
    /// Direct regex match on the source text
    Pattern,
    /// Supplied by an alternate extraction source
    External { source: String },
}

impl CandidateOrigin {
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External { .. })
    }
}

/// Extracted entity awaiting scoring and ranking
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Non-empty, trimmed, without surrounding quotes
    pub title: String,
    pub author: Option<String>,
    pub category: Category,
    pub confidence: f32,
    pub source_rule_id: String,
    pub raw_context: String,
    pub origin: CandidateOrigin,
    pub timestamp: Option<u32>,
    /// Rule reliability, or the external prior
    pub strength: f32,
    /// Extraction order, used for stable tie-breaking
    pub order: usize,
}

impl Candidate {
    /// Minimal pattern-origin candidate (mostly for tests and custom sources)
    pub fn new(title: impl Into<String>, category: Category, confidence: f32) -> Self {
        Self {
            title: title.into(),
            author: None,
            category,
            confidence,
            source_rule_id: String::new(),
            raw_context: String::new(),
            origin: CandidateOrigin::Pattern,
            timestamp: None,
            strength: confidence,
            order: 0,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }
}

/// Candidate as reported by an alternate extraction source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCandidate {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(rename = "type", alias = "category")]
    pub category: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Provenance attached to every citation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationMetadata {
    pub source: String,
    pub detection_method: String,
    pub context: String,

    /// Additive fields set by enrichers (description, url, ...)
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Final output unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    #[serde(rename = "type")]
    pub category: Category,
    pub confidence: f32,
    pub timestamp: Option<u32>,
    pub verified: bool,
    pub metadata: CitationMetadata,
}

impl Citation {
    /// Deterministic id: `<category>-<first 12 hex chars of sha256(normalized title)>`
    pub fn make_id(category: Category, title: &str) -> String {
        let digest = Sha256::digest(normalize_title(title).as_bytes());
        let hex = format!("{digest:x}");
        format!("{}-{}", category, &hex[..12])
    }

    /// Freeze a scored candidate into a citation
    pub fn from_candidate(candidate: Candidate) -> Self {
        let (source, detection_method) = match &candidate.origin {
            CandidateOrigin::Pattern => (
                "transcript".to_string(),
                format!("pattern:{}", candidate.source_rule_id),
            ),
            CandidateOrigin::External { source } => {
                (source.clone(), format!("external:{source}"))
            }
        };

        Self {
            id: Self::make_id(candidate.category, &candidate.title),
            title: candidate.title,
            author: candidate.author,
            category: candidate.category,
            confidence: candidate.confidence,
            timestamp: candidate.timestamp,
            verified: false,
            metadata: CitationMetadata {
                source,
                detection_method,
                context: candidate.raw_context,
                extra: BTreeMap::new(),
            },
        }
    }

    /// `mm:ss` (or `h:mm:ss`) rendering of the timestamp
    pub fn timestamp_label(&self) -> Option<String> {
        self.timestamp.map(|t| {
            let (h, m, s) = (t / 3600, (t % 3600) / 60, t % 60);
            if h > 0 {
                format!("{h}:{m:02}:{s:02}")
            } else {
                format!("{m}:{s:02}")
            }
        })
    }
}

/// Personalization weights supplied by an external store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInterestProfile {
    #[serde(default)]
    pub topic_weights: BTreeMap<Category, f32>,
    #[serde(default)]
    pub author_weights: BTreeMap<String, f32>,
}

impl UserInterestProfile {
    pub fn topic_weight(&self, category: Category) -> f32 {
        self.topic_weights.get(&category).copied().unwrap_or(0.0)
    }

    /// Author weight, matched case-insensitively
    pub fn author_weight(&self, author: &str) -> Option<f32> {
        let author = author.trim();
        self.author_weights
            .get(author)
            .or_else(|| {
                self.author_weights
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(author))
                    .map(|(_, weight)| weight)
            })
            .copied()
    }

    /// Nudge weights after a user interacted with a citation.
    ///
    /// `delta` may be negative. Resulting weights are clamped to [0, 1].
    pub fn record_interaction(&mut self, citation: &Citation, delta: f32) {
        let topic = self.topic_weights.entry(citation.category).or_insert(0.0);
        *topic = (*topic + delta).clamp(0.0, 1.0);

        if let Some(author) = citation.author.as_deref().map(str::trim) {
            if !author.is_empty() {
                let key = self
                    .author_weights
                    .keys()
                    .find(|name| name.eq_ignore_ascii_case(author))
                    .cloned()
                    .unwrap_or_else(|| author.to_string());
                let weight = self.author_weights.entry(key).or_insert(0.0);
                *weight = (*weight + delta).clamp(0.0, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_id_is_deterministic() {
        let a = Citation::make_id(Category::Book, "Atomic Habits");
        let b = Citation::make_id(Category::Book, "atomic  habits!");
        assert_eq!(a, b);
        assert!(a.starts_with("book-"));
        assert_eq!(a.len(), "book-".len() + 12);
        assert_ne!(a, Citation::make_id(Category::Video, "Atomic Habits"));
    }

    #[test]
    fn test_citation_serializes_wire_shape() {
        let candidate = Candidate::new("Sapiens", Category::Book, 0.8).with_author("Yuval Harari");
        let citation = Citation::from_candidate(candidate);
        let json = serde_json::to_value(&citation).unwrap();

        assert_eq!(json["type"], "book");
        assert_eq!(json["verified"], false);
        assert!(json["timestamp"].is_null());
        assert_eq!(json["metadata"]["source"], "transcript");
        assert!(json["metadata"]["detectionMethod"]
            .as_str()
            .unwrap()
            .starts_with("pattern:"));
    }

    #[test]
    fn test_external_origin_detection_method() {
        let mut candidate = Candidate::new("Deep Work", Category::Book, 0.7);
        candidate.origin = CandidateOrigin::External {
            source: "analyzer".to_string(),
        };
        let citation = Citation::from_candidate(candidate);
        assert_eq!(citation.metadata.source, "analyzer");
        assert_eq!(citation.metadata.detection_method, "external:analyzer");
    }

    #[test]
    fn test_input_accepts_start_field() {
        let input: ExtractionInput = serde_json::from_str(
            r#"{"text": "hello", "segments": [{"text": "hello", "start": 4.5}]}"#,
        )
        .unwrap();
        assert_eq!(input.segments[0].start_seconds, 4.5);
        assert!(input.metadata.is_none());
    }

    #[test]
    fn test_content_hash_covers_segments() {
        let plain = ExtractionInput::from_text("same text");
        let segmented = ExtractionInput::from_text("same text")
            .with_segments(vec![TranscriptSegment::new("same text", 0.0)]);
        assert_ne!(plain.content_hash(), segmented.content_hash());
        assert_eq!(plain.content_hash(), ExtractionInput::from_text("same text").content_hash());
    }

    #[test]
    fn test_timestamp_label() {
        let mut citation = Citation::from_candidate(Candidate::new("Cosmos", Category::Video, 0.5));
        citation.timestamp = Some(65);
        assert_eq!(citation.timestamp_label().as_deref(), Some("1:05"));
        citation.timestamp = Some(3725);
        assert_eq!(citation.timestamp_label().as_deref(), Some("1:02:05"));
    }

    #[test]
    fn test_profile_author_lookup_ignores_case() {
        let mut profile = UserInterestProfile::default();
        profile.author_weights.insert("James Clear".to_string(), 0.8);
        assert_eq!(profile.author_weight("james clear"), Some(0.8));
        assert_eq!(profile.author_weight("Cal Newport"), None);
    }

    #[test]
    fn test_record_interaction_clamps() {
        let mut profile = UserInterestProfile::default();
        let citation = Citation::from_candidate(
            Candidate::new("Atomic Habits", Category::Book, 0.9).with_author("James Clear"),
        );
        profile.record_interaction(&citation, 0.7);
        profile.record_interaction(&citation, 0.7);
        assert_eq!(profile.topic_weight(Category::Book), 1.0);
        assert_eq!(profile.author_weight("JAMES CLEAR"), Some(1.0));

        profile.record_interaction(&citation, -5.0);
        assert_eq!(profile.topic_weight(Category::Book), 0.0);
        assert_eq!(profile.author_weights.len(), 1);
    }

    #[test]
    fn test_profile_deserializes_category_keys() {
        let profile: UserInterestProfile = serde_json::from_str(
            r#"{"topicWeights": {"book": 1.0, "paper": 0.0}, "authorWeights": {}}"#,
        )
        .unwrap();
        assert_eq!(profile.topic_weight(Category::Book), 1.0);
        assert_eq!(profile.topic_weight(Category::Quote), 0.0);
    }
}
