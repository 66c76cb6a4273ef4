//! Timestamp locator
//!
//! Maps a citation title back to the segment of a time-aligned transcript
//! where it was most likely mentioned. Lookup order: exact phrase, weighted
//! word overlap, then a single key-term fallback.

use std::collections::HashSet;

use super::scoring::tokens;
use super::weights::{
    GOOD_OVERLAP_BONUS, GOOD_OVERLAP_RATIO, KEY_TERM_MIN_CHARS, MATCHED_WORD_LENGTH_WEIGHT,
    MIN_OVERLAP_RATIO, OVERLAP_RATIO_WEIGHT, STRONG_OVERLAP_BONUS, STRONG_OVERLAP_RATIO,
    TIMESTAMP_MIN_WORD_CHARS,
};
use crate::models::TranscriptSegment;

/// Short words still treated as key terms
const KEY_ACRONYMS: &[&str] = &[
    "ai", "ml", "dna", "rna", "nasa", "cern", "gpt", "mit", "who", "cia", "fbi", "nba", "nfl",
    "f1", "ufc", "mri",
];

fn seconds(segment: &TranscriptSegment) -> u32 {
    if segment.start_seconds.is_finite() && segment.start_seconds > 0.0 {
        segment.start_seconds.floor() as u32
    } else {
        0
    }
}

/// Finds the best-matching segment start for a title
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampLocator;

impl TimestampLocator {
    pub fn new() -> Self {
        Self
    }

    /// Start second of the segment that best matches `title`
    pub fn locate(&self, title: &str, segments: &[TranscriptSegment]) -> Option<u32> {
        let title_lower = title.trim().to_lowercase();
        if title_lower.is_empty() || segments.is_empty() {
            return None;
        }

        let lowered: Vec<String> = segments.iter().map(|s| s.text.to_lowercase()).collect();

        if let Some(i) = lowered.iter().position(|text| text.contains(&title_lower)) {
            return Some(seconds(&segments[i]));
        }

        let segment_words: Vec<HashSet<String>> =
            segments.iter().map(|s| tokens(&s.text).collect()).collect();

        if let Some(i) = best_overlap(&title_lower, &segment_words) {
            return Some(seconds(&segments[i]));
        }

        key_term_hit(&title_lower, &segment_words).map(|i| seconds(&segments[i]))
    }
}

/// Index of the highest-scoring segment whose overlap ratio clears the threshold.
///
/// The ratio is taken over significant words (longer than
/// [`TIMESTAMP_MIN_WORD_CHARS`]) only.
fn best_overlap(title_lower: &str, segment_words: &[HashSet<String>]) -> Option<usize> {
    let words: Vec<String> = tokens(title_lower)
        .filter(|w| w.chars().count() > TIMESTAMP_MIN_WORD_CHARS)
        .collect();
    if words.is_empty() {
        return None;
    }

    let mut best: Option<(usize, f32)> = None;
    for (i, present) in segment_words.iter().enumerate() {
        let matched: Vec<&String> = words.iter().filter(|w| present.contains(*w)).collect();
        let ratio = matched.len() as f32 / words.len() as f32;
        if ratio < MIN_OVERLAP_RATIO {
            continue;
        }

        let length_weight: f32 = matched
            .iter()
            .map(|w| w.chars().count() as f32 * MATCHED_WORD_LENGTH_WEIGHT)
            .sum();
        let bonus = if ratio >= STRONG_OVERLAP_RATIO {
            STRONG_OVERLAP_BONUS
        } else if ratio >= GOOD_OVERLAP_RATIO {
            GOOD_OVERLAP_BONUS
        } else {
            0.0
        };
        let score = ratio * OVERLAP_RATIO_WEIGHT + length_weight + bonus;

        // strict comparison keeps the earliest segment on ties
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }

    best.map(|(i, _)| i)
}

fn key_term_hit(title_lower: &str, segment_words: &[HashSet<String>]) -> Option<usize> {
    let key_terms: Vec<String> = tokens(title_lower)
        .filter(|w| w.chars().count() > KEY_TERM_MIN_CHARS || KEY_ACRONYMS.contains(&w.as_str()))
        .collect();
    if key_terms.is_empty() {
        return None;
    }

    segment_words
        .iter()
        .position(|present| key_terms.iter().any(|t| present.contains(t)))
}

/// [`TimestampLocator::locate`] as a free function
pub fn locate(title: &str, segments: &[TranscriptSegment]) -> Option<u32> {
    TimestampLocator.locate(title, segments)
}
