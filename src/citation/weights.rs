//! Tunable weights for scoring, ranking and timestamp lookup
//!
//! Every numeric knob of the engine lives here so the matching logic can be
//! tested independently of the exact values. None of these thresholds is
//! load-bearing; they are starting points.

// ============================================================================
// Rule strength
// ============================================================================

/// Lowest static reliability a rule may carry
pub const MIN_RULE_STRENGTH: f32 = 0.5;

/// Highest static reliability a rule may carry
pub const MAX_RULE_STRENGTH: f32 = 0.95;

/// Strength of the first rule in a category when none is declared
pub const DEFAULT_TOP_RULE_STRENGTH: f32 = 0.8;

/// Strength lost per rank position when none is declared
pub const RULE_RANK_DECAY: f32 = 0.05;

/// Share of the final score contributed by rule strength
pub const RULE_STRENGTH_WEIGHT: f32 = 0.6;

/// Prior strength for external candidates that did not report a confidence
pub const EXTERNAL_DEFAULT_STRENGTH: f32 = 0.6;

// ============================================================================
// Contextual indicators
// ============================================================================

/// Bonus for the first indicator word found near a match
pub const FIRST_INDICATOR_BONUS: f32 = 0.1;

/// Bonus for every further indicator word
pub const EXTRA_INDICATOR_BONUS: f32 = 0.05;

/// Cap on the cumulative indicator bonus
pub const MAX_INDICATOR_BONUS: f32 = 0.25;

// ============================================================================
// Text quality
// ============================================================================

pub const CAPITALIZATION_BONUS: f32 = 0.1;

/// Titles longer than this (in chars) get [`LONG_TITLE_BONUS`]
pub const LONG_TITLE_CHARS: usize = 15;
pub const LONG_TITLE_BONUS: f32 = 0.15;

/// Titles shorter than this (in chars) get [`SHORT_TITLE_PENALTY`]
pub const SHORT_TITLE_CHARS: usize = 5;
pub const SHORT_TITLE_PENALTY: f32 = 0.1;

pub const AUTHOR_BONUS: f32 = 0.1;
pub const GENERIC_TERM_PENALTY: f32 = 0.2;

/// Bonus when the title also appears in the video title or description
pub const METADATA_MENTION_BONUS: f32 = 0.05;

// ============================================================================
// Cross-validation (external candidates only)
// ============================================================================

/// Words shorter than or equal to this are ignored when comparing with the source
pub const CROSS_VALIDATION_MIN_WORD_CHARS: usize = 2;
pub const CROSS_VALIDATION_WEIGHT: f32 = 0.2;
pub const EXACT_PHRASE_BONUS: f32 = 0.15;
pub const LOW_OVERLAP_RATIO: f32 = 0.3;
pub const LOW_OVERLAP_PENALTY: f32 = 0.3;

// ============================================================================
// Category context
// ============================================================================

pub const MAX_CATEGORY_BONUS: f32 = 0.3;
pub const EVENT_STRUCTURE_BONUS: f32 = 0.15;
pub const EVENT_YEAR_BONUS: f32 = 0.1;
pub const ACADEMIC_TOPIC_BONUS: f32 = 0.15;
pub const ATTRIBUTED_WORK_BONUS: f32 = 0.1;
pub const JOURNAL_VENUE_BONUS: f32 = 0.1;
pub const FULL_NAME_BONUS: f32 = 0.1;
pub const LONG_QUOTE_BONUS: f32 = 0.05;
pub const NAMED_THEORY_BONUS: f32 = 0.1;
pub const PROPORTION_STAT_BONUS: f32 = 0.05;

// ============================================================================
// Timestamp lookup
// ============================================================================

/// Title words at or below this length are ignored for overlap scoring
pub const TIMESTAMP_MIN_WORD_CHARS: usize = 2;
pub const OVERLAP_RATIO_WEIGHT: f32 = 10.0;
/// Score per character of every matched word
pub const MATCHED_WORD_LENGTH_WEIGHT: f32 = 0.2;
pub const STRONG_OVERLAP_RATIO: f32 = 0.8;
pub const STRONG_OVERLAP_BONUS: f32 = 10.0;
pub const GOOD_OVERLAP_RATIO: f32 = 0.6;
pub const GOOD_OVERLAP_BONUS: f32 = 5.0;
/// Segments below this overlap ratio are never chosen by overlap scoring
pub const MIN_OVERLAP_RATIO: f32 = 0.3;
/// Key-term fallback only considers words longer than this
pub const KEY_TERM_MIN_CHARS: usize = 4;

// ============================================================================
// Ranking
// ============================================================================

/// Multiplier on the profile's category interest weight
pub const TOPIC_INTEREST_WEIGHT: f32 = 0.2;

/// Flat boost when the profile has a positive weight for the citation's author
pub const AUTHOR_INTEREST_BOOST: f32 = 0.15;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_strength_bounds_are_ordered() {
        assert!(MIN_RULE_STRENGTH < DEFAULT_TOP_RULE_STRENGTH);
        assert!(DEFAULT_TOP_RULE_STRENGTH <= MAX_RULE_STRENGTH);
    }

    #[test]
    fn test_overlap_thresholds_are_ordered() {
        assert!(MIN_OVERLAP_RATIO < GOOD_OVERLAP_RATIO);
        assert!(GOOD_OVERLAP_RATIO < STRONG_OVERLAP_RATIO);
    }
}
