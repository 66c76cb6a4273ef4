//! Candidate deduplication
//!
//! Candidates collapse on `(category, normalize(title))`. The survivor is the
//! one with the highest confidence; on ties the earliest extracted candidate
//! stays. A survivor keeps the slot of the first occurrence so the output
//! order stays stable.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::category::Category;
use crate::models::Candidate;

/// Lower-case and strip everything that is not alphanumeric
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Identity of a candidate for deduplication
pub fn dedup_key(candidate: &Candidate) -> (Category, String) {
    (candidate.category, normalize_title(&candidate.title))
}

/// Single-pass, stable deduplication
pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut slots: HashMap<(Category, String), usize> = HashMap::with_capacity(candidates.len());
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match slots.entry(dedup_key(&candidate)) {
            Entry::Vacant(entry) => {
                entry.insert(out.len());
                out.push(candidate);
            }
            Entry::Occupied(entry) => {
                let existing = &mut out[*entry.get()];
                if candidate.confidence > existing.confidence {
                    let discarded = std::mem::replace(existing, candidate);
                    merge_missing(existing, discarded);
                } else {
                    merge_missing(existing, candidate);
                }
            }
        }
    }

    out
}

/// Fill author and timestamp gaps on the survivor
fn merge_missing(survivor: &mut Candidate, other: Candidate) {
    if survivor.author.is_none() {
        survivor.author = other.author;
    }
    if survivor.timestamp.is_none() {
        survivor.timestamp = other.timestamp;
    }
}
