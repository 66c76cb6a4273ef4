//! Confidence scorer
//!
//! Combines five factors into a single score clamped to [0, 1]:
//! rule strength, contextual indicator words, text-quality heuristics,
//! a category-context bonus and, for externally supplied candidates only,
//! cross-validation against the source text. Source metadata adds a small
//! bonus when the title is also mentioned by the video itself.

use std::collections::HashSet;

use super::category::Category;
use super::filter::is_generic_term;
use super::weights::*;
use crate::models::{Candidate, SourceMetadata};

/// Places that make an "event" title a bare location rather than an event
const BARE_PLACE_NAMES: &[&str] = &[
    "america", "united states", "usa", "china", "russia", "india", "japan", "germany",
    "france", "england", "britain", "europe", "africa", "asia", "london", "paris", "tokyo",
    "new york", "california", "texas", "rome", "berlin", "egypt", "greece", "mexico", "canada",
];

const ACADEMIC_TERMS: &[&str] = &[
    "science", "theory", "learning", "intelligence", "economics", "psychology", "biology",
    "physics", "mechanics", "computing", "chemistry", "philosophy", "mathematics",
    "linguistics", "engineering", "genetics", "neuroscience", "epigenetics", "cryptography",
];

const JOURNAL_VENUE_TERMS: &[&str] = &[
    "journal", "proceedings", "annals", "review", "nature", "science", "cell", "lancet",
    "arxiv", "plos",
];

const NAMED_THEORY_SUFFIXES: &[&str] = &[
    "Theory", "Law", "Principle", "Hypothesis", "Paradox", "Effect", "Theorem", "Fallacy",
    "Bias", "Dilemma",
];

fn indicator_words(category: Category) -> &'static [&'static str] {
    match category {
        Category::Book => &[
            "book", "novel", "author", "wrote", "written", "read", "reading", "chapter",
            "bestseller", "memoir", "published",
        ],
        Category::Paper => &[
            "paper", "study", "published", "journal", "researchers", "research", "findings",
            "peer", "authors", "arxiv", "doi",
        ],
        Category::Topic => &[
            "concept", "field", "theory", "science", "research", "study", "studies", "discipline",
        ],
        Category::Person => &[
            "dr", "professor", "scientist", "researcher", "author", "founder", "ceo", "argues",
            "discovered", "according",
        ],
        Category::Place => &[
            "visited", "located", "traveled", "travelled", "city", "country", "region", "trip",
        ],
        Category::Company => &[
            "company", "startup", "founded", "ceo", "inc", "corporation", "acquired", "brand",
        ],
        Category::Technology => &[
            "technology", "invented", "developed", "platform", "device", "algorithm", "system",
        ],
        Category::Event => &[
            "happened", "during", "war", "battle", "revolution", "crisis", "anniversary", "history",
        ],
        Category::Quote => &["said", "says", "quote", "wrote", "famously", "once", "words"],
        Category::Statistic => &[
            "percent", "study", "survey", "data", "statistics", "average", "million", "billion",
        ],
        Category::Theory => &[
            "theory", "law", "principle", "hypothesis", "proposed", "proved", "effect",
        ],
        Category::Course => &[
            "course", "class", "lecture", "professor", "university", "enroll", "coursera",
            "syllabus",
        ],
        Category::Software => &[
            "app", "software", "install", "download", "using", "tool", "version", "plugin",
        ],
        Category::Video => &[
            "documentary", "video", "film", "watch", "watched", "episode", "channel", "youtube",
        ],
    }
}

/// Lower-cased alphanumeric tokens of a text
pub(crate) fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Individual factor contributions (before clamping)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub strength: f32,
    pub indicators: f32,
    pub quality: f32,
    pub cross_validation: f32,
    pub category_bonus: f32,
    pub metadata_bonus: f32,
}

impl ScoreBreakdown {
    /// Sum of all factors, clamped to [0, 1]
    pub fn total(&self) -> f32 {
        let sum = self.strength
            + self.indicators
            + self.quality
            + self.cross_validation
            + self.category_bonus
            + self.metadata_bonus;
        if sum.is_finite() {
            sum.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Stateless, deterministic confidence scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(
        &self,
        candidate: &Candidate,
        source_text: &str,
        metadata: Option<&SourceMetadata>,
    ) -> f32 {
        self.breakdown(candidate, source_text, metadata).total()
    }

    pub fn breakdown(
        &self,
        candidate: &Candidate,
        source_text: &str,
        metadata: Option<&SourceMetadata>,
    ) -> ScoreBreakdown {
        let title_lower = candidate.title.trim().to_lowercase();

        ScoreBreakdown {
            strength: RULE_STRENGTH_WEIGHT * candidate.strength.clamp(0.0, 1.0),
            indicators: indicator_bonus(candidate.category, &candidate.raw_context),
            quality: quality_score(candidate, &title_lower),
            cross_validation: if candidate.origin.is_external() {
                cross_validation(&candidate.title, source_text)
            } else {
                0.0
            },
            category_bonus: category_bonus(candidate),
            metadata_bonus: match metadata {
                Some(meta) if meta.mentions(&title_lower) => METADATA_MENTION_BONUS,
                _ => 0.0,
            },
        }
    }
}

fn indicator_bonus(category: Category, context: &str) -> f32 {
    let present: HashSet<String> = tokens(context).collect();
    let hits = indicator_words(category)
        .iter()
        .filter(|w| present.contains(**w))
        .count();

    match hits {
        0 => 0.0,
        n => (FIRST_INDICATOR_BONUS + EXTRA_INDICATOR_BONUS * (n - 1) as f32)
            .min(MAX_INDICATOR_BONUS),
    }
}

fn quality_score(candidate: &Candidate, title_lower: &str) -> f32 {
    let title = candidate.title.trim();
    let mut score = 0.0;

    if title
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_uppercase)
    {
        score += CAPITALIZATION_BONUS;
    }

    let len = title.chars().count();
    if len > LONG_TITLE_CHARS {
        score += LONG_TITLE_BONUS;
    } else if len < SHORT_TITLE_CHARS {
        score -= SHORT_TITLE_PENALTY;
    }

    if candidate
        .author
        .as_deref()
        .is_some_and(|a| !a.trim().is_empty())
    {
        score += AUTHOR_BONUS;
    }

    if is_generic_term(title_lower) {
        score -= GENERIC_TERM_PENALTY;
    }

    score
}

/// Support for an external candidate in the source text.
///
/// Titles with no comparable words contribute nothing.
pub fn cross_validation(title: &str, source_text: &str) -> f32 {
    let words: Vec<String> = tokens(title)
        .filter(|w| w.chars().count() > CROSS_VALIDATION_MIN_WORD_CHARS)
        .collect();
    if words.is_empty() {
        return 0.0;
    }

    let source_words: HashSet<String> = tokens(source_text).collect();
    let matched = words.iter().filter(|w| source_words.contains(*w)).count();
    let ratio = matched as f32 / words.len() as f32;

    let mut score = ratio * CROSS_VALIDATION_WEIGHT;
    let title_lower = title.trim().to_lowercase();
    if source_text.to_lowercase().contains(&title_lower) {
        score += EXACT_PHRASE_BONUS;
    }
    if ratio < LOW_OVERLAP_RATIO {
        score -= LOW_OVERLAP_PENALTY;
    }
    score
}

fn category_bonus(candidate: &Candidate) -> f32 {
    let title = candidate.title.trim();
    let lower = title.to_lowercase();
    let words: Vec<&str> = title.split_whitespace().collect();
    let lower_tokens: HashSet<String> = tokens(title).collect();
    let has_author = candidate.author.is_some();

    let bonus = match candidate.category {
        Category::Event => {
            let mut bonus = 0.0;
            if words.len() > 1 && !BARE_PLACE_NAMES.contains(&lower.as_str()) {
                bonus += EVENT_STRUCTURE_BONUS;
            }
            if words.iter().any(|w| w.len() == 4 && w.chars().all(|c| c.is_ascii_digit())) {
                bonus += EVENT_YEAR_BONUS;
            }
            bonus
        }
        Category::Topic => {
            if ACADEMIC_TERMS.iter().any(|t| lower_tokens.contains(*t)) {
                ACADEMIC_TOPIC_BONUS
            } else {
                0.0
            }
        }
        Category::Book | Category::Video | Category::Course if has_author => ATTRIBUTED_WORK_BONUS,
        Category::Paper => {
            if JOURNAL_VENUE_TERMS.iter().any(|t| lower_tokens.contains(*t))
                || lower.starts_with("10.")
            {
                JOURNAL_VENUE_BONUS
            } else {
                0.0
            }
        }
        Category::Person => {
            if words.len() >= 2
                && words
                    .iter()
                    .all(|w| w.chars().next().is_some_and(char::is_uppercase))
            {
                FULL_NAME_BONUS
            } else {
                0.0
            }
        }
        Category::Quote => {
            let mut bonus = 0.0;
            if has_author {
                bonus += ATTRIBUTED_WORK_BONUS;
            }
            if title.chars().count() >= 40 {
                bonus += LONG_QUOTE_BONUS;
            }
            bonus
        }
        Category::Theory => {
            if words
                .last()
                .is_some_and(|w| NAMED_THEORY_SUFFIXES.contains(w))
            {
                NAMED_THEORY_BONUS
            } else {
                0.0
            }
        }
        Category::Statistic => {
            if title.contains('%') || lower_tokens.contains("percent") {
                PROPORTION_STAT_BONUS
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    bonus.min(MAX_CATEGORY_BONUS)
}
