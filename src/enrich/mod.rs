//! Best-effort citation enrichment
//!
//! Enrichment runs after ranking and is purely additive: it may mark a
//! citation verified, fill a missing author and add descriptive metadata
//! fields. It never removes a citation or changes its title, category,
//! confidence or position. A failing or slow enricher leaves the citation
//! exactly as extracted.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use crate::citation::category::Category;
use crate::citation::dedup::normalize_title;
use crate::error::{Error, Result};
use crate::metrics;
use crate::models::Citation;

pub const DEFAULT_ENRICH_CONCURRENCY: usize = 4;
pub const DEFAULT_ENRICH_TIMEOUT: Duration = Duration::from_secs(5);

/// Additions an enricher proposes for one citation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub verified: bool,
    pub author: Option<String>,
    /// Extra metadata fields (description, url, ...)
    pub fields: BTreeMap<String, String>,
}

/// Trait for verification/enrichment collaborators
#[async_trait]
pub trait Enricher: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the enricher knows nothing about the citation
    async fn enrich(&self, citation: &Citation) -> anyhow::Result<Option<Enrichment>>;
}

/// Limits for [`enrich_citations`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichOptions {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_ENRICH_CONCURRENCY,
            timeout: DEFAULT_ENRICH_TIMEOUT,
        }
    }
}

/// Run `enricher` over every citation, keeping order.
///
/// Errors and timeouts are logged and leave the citation unverified.
pub async fn enrich_citations(
    citations: Vec<Citation>,
    enricher: &dyn Enricher,
    options: EnrichOptions,
) -> Vec<Citation> {
    let mut results: Vec<(usize, Citation)> = stream::iter(citations.into_iter().enumerate())
        .map(|(index, citation)| async move {
            let outcome = tokio::time::timeout(options.timeout, enricher.enrich(&citation)).await;
            (index, apply_outcome(citation, enricher.name(), outcome))
        })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, citation)| citation).collect()
}

fn apply_outcome(
    mut citation: Citation,
    enricher: &str,
    outcome: std::result::Result<anyhow::Result<Option<Enrichment>>, tokio::time::error::Elapsed>,
) -> Citation {
    match outcome {
        Ok(Ok(Some(enrichment))) => {
            citation.verified |= enrichment.verified;
            if citation.author.is_none() {
                citation.author = enrichment.author;
            }
            for (key, value) in enrichment.fields {
                citation.metadata.extra.entry(key).or_insert(value);
            }
            metrics::record_enrichment(if enrichment.verified { "verified" } else { "enriched" });
        }
        Ok(Ok(None)) => {
            metrics::record_enrichment("unmatched");
        }
        Ok(Err(e)) => {
            tracing::warn!(enricher, citation = %citation.id, error = %e, "Enrichment failed, keeping citation unverified");
            metrics::record_enrichment("failed");
        }
        Err(_) => {
            tracing::warn!(enricher, citation = %citation.id, "Enrichment timed out, keeping citation unverified");
            metrics::record_enrichment("timeout");
        }
    }
    citation
}

const KNOWLEDGE_BASE: &str = "knowledge_base";

/// Knowledge base entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseEntry {
    /// Canonical title
    pub title: String,

    /// Restricts matches to one category when set
    #[serde(default, rename = "type", alias = "category")]
    pub category: Option<Category>,

    #[serde(default)]
    pub author: Option<String>,

    /// Known aliases
    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub url: Option<String>,
}

/// Enricher backed by a local JSON knowledge base
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBaseEnricher {
    entries: Vec<KnowledgeBaseEntry>,

    /// Normalized title or alias -> entry indices
    alias_map: HashMap<String, Vec<usize>>,
}

impl KnowledgeBaseEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; its title and aliases all resolve to it
    pub fn add_entry(&mut self, entry: KnowledgeBaseEntry) {
        let index = self.entries.len();
        for name in std::iter::once(&entry.title).chain(&entry.aliases) {
            let key = normalize_title(name);
            if key.is_empty() {
                continue;
            }
            let slots = self.alias_map.entry(key).or_default();
            if !slots.contains(&index) {
                slots.push(index);
            }
        }
        self.entries.push(entry);
    }

    /// Import knowledge base from JSON (an array of entries)
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let entries: Vec<KnowledgeBaseEntry> = serde_json::from_str(json)?;
        let count = entries.len();
        for entry in entries {
            self.add_entry(entry);
        }
        Ok(count)
    }

    /// Load a knowledge base file.
    ///
    /// Read and parse failures are reported as [`Error::Enrichment`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::enrichment(KNOWLEDGE_BASE, format!("{}: {e}", path.display()))
        })?;
        let mut enricher = Self::new();
        let count = enricher.import_json(&json).map_err(|e| {
            Error::enrichment(KNOWLEDGE_BASE, format!("{}: {e}", path.display()))
        })?;
        tracing::debug!(entries = count, path = %path.display(), "Loaded knowledge base");
        Ok(enricher)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry matching the title whose category agrees
    pub fn lookup(&self, title: &str, category: Category) -> Option<&KnowledgeBaseEntry> {
        self.alias_map
            .get(&normalize_title(title))?
            .iter()
            .map(|&i| &self.entries[i])
            .find(|entry| entry.category.map_or(true, |c| c == category))
    }
}

#[async_trait]
impl Enricher for KnowledgeBaseEnricher {
    fn name(&self) -> &str {
        KNOWLEDGE_BASE
    }

    async fn enrich(&self, citation: &Citation) -> anyhow::Result<Option<Enrichment>> {
        let Some(entry) = self.lookup(&citation.title, citation.category) else {
            return Ok(None);
        };

        let mut fields = BTreeMap::new();
        if let Some(description) = &entry.description {
            fields.insert("description".to_string(), description.clone());
        }
        if let Some(url) = &entry.url {
            fields.insert("url".to_string(), url.clone());
        }
        if entry.title != citation.title {
            fields.insert("canonicalTitle".to_string(), entry.title.clone());
        }

        Ok(Some(Enrichment {
            verified: true,
            author: entry.author.clone(),
            fields,
        }))
    }
}
