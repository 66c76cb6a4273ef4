use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use transcite::cache::CitationCache;
use transcite::citation::CitationEngine;
use transcite::config::Config;
use transcite::enrich::{enrich_citations, KnowledgeBaseEnricher};
use transcite::models::{Citation, ExtractionInput, TranscriptSegment, UserInterestProfile};
use transcite::sources::{CandidateSource, JsonCandidateSource};

/// Options of the `extract` command
pub struct ExtractParams {
    pub input: PathBuf,
    pub segments: Option<PathBuf>,
    pub profile: Option<PathBuf>,
    pub candidates: Option<PathBuf>,
    pub knowledge_base: Option<PathBuf>,
    pub max_results: Option<usize>,
    pub format: String,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub metrics: bool,
}

/// Extract citations from a transcript file
pub async fn extract(params: ExtractParams) -> Result<()> {
    let ExtractParams {
        input,
        segments,
        profile,
        candidates,
        knowledge_base,
        max_results,
        format,
        output,
        config,
        cache_dir,
        metrics,
    } = params;

    if !matches!(format.as_str(), "json" | "text") {
        anyhow::bail!("Unsupported output format: {format} (expected json or text)");
    }

    let mut config = Config::load(config.as_deref())?;
    if max_results.is_some() {
        config.extraction.max_results = max_results;
    }
    if cache_dir.is_some() {
        config.cache.dir = cache_dir;
    }
    config.validate()?;

    if metrics {
        if let Err(e) = transcite::metrics::init_metrics() {
            tracing::warn!(error = %e, "Metrics initialization failed, continuing without metrics");
        }
    }

    let mut transcript = load_input(&input)?;
    if let Some(path) = &segments {
        transcript.segments = read_json::<Vec<TranscriptSegment>>(path)?;
    }
    let profile = profile
        .as_deref()
        .map(read_json::<UserInterestProfile>)
        .transpose()?;

    let cache = match config.cache.to_cache_config() {
        Some(cache_config) => cache_key(
            &transcript,
            &config,
            profile.as_ref(),
            candidates.as_deref(),
            knowledge_base.as_deref(),
        )
        .await?
        .and_then(|key| CitationCache::try_new(&cache_config).map(|cache| (cache, key))),
        None => None,
    };

    let cached = match &cache {
        Some((cache, key)) => match cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable cache entry");
                None
            }
        },
        None => None,
    };

    let citations = match cached {
        Some(hit) => {
            tracing::info!(citations = hit.citations.len(), "Using cached citations");
            hit.citations
        }
        None => {
            let engine = CitationEngine::new(config.extraction.clone())?;
            let outcome = match &candidates {
                Some(path) => {
                    let sources: Vec<Box<dyn CandidateSource>> =
                        vec![Box::new(JsonCandidateSource::from_path("analyzer", path))];
                    engine
                        .extract_with_sources(&transcript, profile.as_ref(), &sources)
                        .await
                }
                None => {
                    Arc::new(engine)
                        .extract_parallel(&transcript, profile.as_ref())
                        .await
                }
            };
            tracing::info!("{}", outcome.stats.summary());

            let mut citations = outcome.citations;
            if let Some(path) = &knowledge_base {
                match KnowledgeBaseEnricher::from_file(path) {
                    Ok(enricher) => {
                        citations =
                            enrich_citations(citations, &enricher, config.enrich.options()).await;
                    }
                    Err(e) if e.is_recoverable() => {
                        tracing::warn!(error = %e, "Knowledge base unavailable, skipping enrichment");
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            if let Some((cache, key)) = &cache {
                if let Err(e) = cache.put(key, &citations).await {
                    tracing::warn!(error = %e, "Failed to cache citations");
                }
            }
            citations
        }
    };

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&citations)?,
        _ => render_text(&citations),
    };

    match &output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!("Wrote {} citations to {}", citations.len(), path.display());
        }
        None => println!("{rendered}"),
    }

    if metrics {
        match transcite::metrics::encode_metrics() {
            Ok(text) => eprintln!("{text}"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
        }
    }

    Ok(())
}

/// Cache key over the transcript, the settings and the contents of side files.
///
/// `None` when a side file cannot be read; the run then goes uncached.
async fn cache_key(
    transcript: &ExtractionInput,
    config: &Config,
    profile: Option<&UserInterestProfile>,
    candidates: Option<&Path>,
    knowledge_base: Option<&Path>,
) -> Result<Option<String>> {
    let mut digests = Vec::new();
    for path in [candidates, knowledge_base] {
        let digest = match path {
            Some(path) => match CitationCache::file_digest(path).await {
                Ok(digest) => Some(digest),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping cache for this run");
                    return Ok(None);
                }
            },
            None => None,
        };
        digests.push(digest);
    }

    let key = CitationCache::key(
        transcript,
        &serde_json::json!({
            "extraction": &config.extraction,
            "profile": profile,
            "candidates": &digests[0],
            "knowledgeBase": &digests[1],
        }),
    )?;
    Ok(Some(key))
}

/// `.json` files are full inputs; anything else is plain transcript text
fn load_input(path: &Path) -> Result<ExtractionInput> {
    if path.extension().is_some_and(|ext| ext == "json") {
        read_json(path)
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        Ok(ExtractionInput::from_text(text))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file: {}", path.display()))
}

fn render_text(citations: &[Citation]) -> String {
    if citations.is_empty() {
        return "No citations found.".to_string();
    }

    let mut out = String::new();
    for (i, citation) in citations.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. [{}] {}",
            i + 1,
            citation.category,
            citation.title
        ));
        if let Some(author) = &citation.author {
            out.push_str(&format!(" by {author}"));
        }
        out.push_str(&format!(" ({:.2})", citation.confidence));
        if let Some(label) = citation.timestamp_label() {
            out.push_str(&format!(" @ {label}"));
        }
        if citation.verified {
            out.push_str(" [verified]");
        }
        out.push('\n');
    }
    out
}
