//! Ranking with optional personalization

use super::weights::{AUTHOR_INTEREST_BOOST, TOPIC_INTEREST_WEIGHT};
use crate::models::{Candidate, UserInterestProfile};

/// Confidence plus the profile's interest boost
pub fn personalized_score(candidate: &Candidate, profile: Option<&UserInterestProfile>) -> f32 {
    let Some(profile) = profile else {
        return candidate.confidence;
    };

    let topic = profile.topic_weight(candidate.category) * TOPIC_INTEREST_WEIGHT;
    let author = candidate
        .author
        .as_deref()
        .and_then(|a| profile.author_weight(a))
        .filter(|w| *w > 0.0)
        .map_or(0.0, |_| AUTHOR_INTEREST_BOOST);

    candidate.confidence + topic + author
}

/// Order candidates best first, then cap the list.
///
/// The sort is stable, so equal scores keep their incoming order. The profile
/// is only read.
pub fn rank(
    candidates: Vec<Candidate>,
    profile: Option<&UserInterestProfile>,
    max_results: Option<usize>,
) -> Vec<Candidate> {
    let mut scored: Vec<(f32, Candidate)> = candidates
        .into_iter()
        .map(|c| (personalized_score(&c, profile), c))
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score
            .total_cmp(a_score)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });

    let mut ranked: Vec<Candidate> = scored.into_iter().map(|(_, c)| c).collect();
    if let Some(max) = max_results {
        ranked.truncate(max);
    }
    ranked
}
