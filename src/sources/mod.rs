//! Alternate candidate sources
//!
//! A [`CandidateSource`] supplies candidates found by something other than
//! the pattern library, typically an analyzer that read the same transcript.
//! The engine normalizes whatever it returns and scores it through the
//! cross-validation path, so a source only has to produce the
//! [`ExternalCandidate`] shape.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::models::{ExternalCandidate, ExtractionInput};

/// Trait for alternate candidate sources
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Source name, recorded in citation metadata
    fn name(&self) -> &str;

    /// Candidates for this input
    async fn candidates(&self, input: &ExtractionInput) -> anyhow::Result<Vec<ExternalCandidate>>;
}

/// Accepted analyzer payload shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandidatePayload {
    List(Vec<ExternalCandidate>),
    Wrapped {
        #[serde(alias = "candidates")]
        citations: Vec<ExternalCandidate>,
    },
}

#[derive(Debug, Clone)]
enum Payload {
    Inline(String),
    File(PathBuf),
}

/// Candidates read from a JSON document produced by an analyzer.
///
/// The document may be a bare array, an object with a `citations` (or
/// `candidates`) array, and may be wrapped in a markdown code fence.
#[derive(Debug, Clone)]
pub struct JsonCandidateSource {
    name: String,
    payload: Payload,
}

impl JsonCandidateSource {
    /// Source over an in-memory document
    pub fn from_json(name: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Payload::Inline(json.into()),
        }
    }

    /// Source over a file read on each call
    pub fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            payload: Payload::File(path.as_ref().to_path_buf()),
        }
    }
}

#[async_trait]
impl CandidateSource for JsonCandidateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn candidates(&self, _input: &ExtractionInput) -> anyhow::Result<Vec<ExternalCandidate>> {
        let raw = match &self.payload {
            Payload::Inline(json) => json.clone(),
            Payload::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| Error::candidate_source(&self.name, format!("{}: {e}", path.display())))?,
        };

        let candidates =
            parse_candidates(&raw).map_err(|e| Error::candidate_source(&self.name, e))?;
        tracing::debug!(source = %self.name, count = candidates.len(), "Parsed analyzer candidates");
        Ok(candidates)
    }
}

/// Parse analyzer output into candidates
pub fn parse_candidates(response: &str) -> Result<Vec<ExternalCandidate>, serde_json::Error> {
    let json = extract_json_payload(response);
    let payload: CandidatePayload = serde_json::from_str(json)?;
    Ok(match payload {
        CandidatePayload::List(list) => list,
        CandidatePayload::Wrapped { citations } => citations,
    })
}

/// Locate the JSON document inside a possibly fenced response
fn extract_json_payload(response: &str) -> &str {
    let trimmed = response.trim();

    // Try to find JSON in code blocks
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Try to find JSON in generic code blocks
    if let Some(start) = trimmed.find("```") {
        let block_start = start + 3;
        let json_start = trimmed[block_start..]
            .find('\n')
            .map(|n| block_start + n + 1)
            .unwrap_or(block_start);
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Raw array or object, whichever opens first
    let open = trimmed.find(['[', '{']);
    if let Some(start) = open {
        let close = if trimmed[start..].starts_with('[') { ']' } else { '}' };
        if let Some(end) = trimmed.rfind(close) {
            if end > start {
                return &trimmed[start..=end];
            }
        }
    }

    trimmed
}
