//! Pattern extractor
//!
//! Runs every rule of a [`PatternLibrary`] over a text and yields one
//! [`RawMatch`] per non-overlapping regex match per rule. Different rules may
//! match the same span; the deduplicator reconciles them later.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::category::Category;
use super::patterns::{CaptureRole, PatternLibrary, PatternRule};
use crate::models::{Candidate, CandidateOrigin};

/// Default context captured on each side of a match, in chars
pub const DEFAULT_CONTEXT_WINDOW: usize = 80;

/// Words dropped from the end of a captured title
const TRAILING_CONNECTORS: &[&str] = &[
    "of", "the", "and", "for", "in", "to", "a", "an", "&", "on", "with", "by", "or",
];

/// Capitalized sentence openers dropped from the start of a captured title
const LEADING_OPENERS: &[&str] = &[
    "In", "At", "On", "During", "After", "Before", "When", "And", "But", "So", "Then", "Like",
    "Because", "If", "Since", "Also", "Well", "Yeah", "Now",
];

const QUOTE_CHARS: &[char] = &['"', '“', '”', '\'', '‘', '’', '«', '»'];

/// One regex match with its captures mapped to roles
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub rule_id: String,
    pub category: Category,
    pub rule_rank: usize,
    pub base_strength: f32,
    /// Cleaned capture text by role; always contains a title
    pub captured: BTreeMap<CaptureRole, String>,
    pub full_match: String,
    /// Byte offset of the match in the scanned text
    pub offset: usize,
    /// Match plus surrounding text
    pub context: String,
}

impl RawMatch {
    pub fn title(&self) -> &str {
        self.captured
            .get(&CaptureRole::Title)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn author(&self) -> Option<&str> {
        self.captured.get(&CaptureRole::Author).map(String::as_str)
    }

    /// Unscored candidate carrying this match's provenance
    pub fn into_candidate(mut self, order: usize) -> Candidate {
        let title = self.captured.remove(&CaptureRole::Title).unwrap_or_default();
        let author = self.captured.remove(&CaptureRole::Author);
        Candidate {
            title,
            author,
            category: self.category,
            confidence: 0.0,
            source_rule_id: self.rule_id,
            raw_context: self.context,
            origin: CandidateOrigin::Pattern,
            timestamp: None,
            strength: self.base_strength,
            order,
        }
    }
}

/// Applies a pattern library to text
#[derive(Debug, Clone)]
pub struct Extractor {
    library: Arc<PatternLibrary>,
    context_window: usize,
}

impl Extractor {
    pub fn new(library: Arc<PatternLibrary>) -> Self {
        Self {
            library,
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }

    /// Extractor over the built-in rules
    pub fn builtin() -> Self {
        Self::new(PatternLibrary::shared())
    }

    pub fn with_context_window(mut self, chars: usize) -> Self {
        self.context_window = chars;
        self
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Lazily yield every match of every rule, rule by rule
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = RawMatch> + 'a {
        let window = self.context_window;
        self.library.iter().flat_map(move |rule| {
            rule.regex
                .captures_iter(text)
                .filter_map(move |caps| build_match(rule, &caps, text, window))
        })
    }
}

fn build_match(
    rule: &PatternRule,
    caps: &regex::Captures<'_>,
    text: &str,
    window: usize,
) -> Option<RawMatch> {
    let whole = caps.get(0)?;

    let mut captured = BTreeMap::new();
    for (i, role) in rule.capture_roles.iter().enumerate() {
        let Some(group) = caps.get(i + 1) else {
            continue;
        };
        let cleaned = match role {
            CaptureRole::Title => clean_title(group.as_str(), rule.category),
            CaptureRole::Author => clean_author(group.as_str()),
            CaptureRole::Context => group.as_str().trim().to_string(),
        };
        if !cleaned.is_empty() {
            captured.insert(*role, cleaned);
        }
    }

    if !captured.contains_key(&CaptureRole::Title) {
        return None;
    }

    Some(RawMatch {
        rule_id: rule.id.clone(),
        category: rule.category,
        rule_rank: rule.rank,
        base_strength: rule.base_strength,
        captured,
        full_match: whole.as_str().to_string(),
        offset: whole.start(),
        context: context_window(text, whole.start(), whole.end(), window).to_string(),
    })
}

/// Slice of `text` covering `[start, end)` plus up to `window` chars on each side
pub fn context_window(text: &str, start: usize, end: usize, window: usize) -> &str {
    let from = if window == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .take(window)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(start)
    };
    let to = text[end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim, unquote and tidy a captured title
pub fn clean_title(raw: &str, category: Category) -> String {
    let mut title = collapse_whitespace(raw);

    loop {
        let before = title.len();
        title = title
            .trim_matches(|c: char| QUOTE_CHARS.contains(&c) || c.is_whitespace())
            .trim_end_matches([',', ';', ':'])
            .to_string();
        if category != Category::Quote {
            title = title.trim_end_matches(['.', '!', '?']).to_string();
        }
        if title.len() == before {
            break;
        }
    }

    if matches!(category, Category::Quote | Category::Statistic) {
        return title;
    }

    let mut words: Vec<&str> = title.split(' ').filter(|w| !w.is_empty()).collect();
    while words.len() > 1 && LEADING_OPENERS.contains(&words[0]) {
        words.remove(0);
    }
    while words.len() > 1
        && words
            .last()
            .is_some_and(|w| TRAILING_CONNECTORS.contains(&w.to_lowercase().as_str()))
    {
        words.pop();
    }
    words.join(" ")
}

/// Trim an author capture
pub fn clean_author(raw: &str) -> String {
    collapse_whitespace(raw)
        .trim_matches(|c: char| QUOTE_CHARS.contains(&c))
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
        .trim()
        .to_string()
}
