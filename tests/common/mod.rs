//! Common test utilities

use std::path::{Path, PathBuf};

use transcite::citation::Category;
use transcite::models::{Citation, ExtractionInput, TranscriptSegment};

/// Scenario A sentence
pub const ATOMIC_HABITS: &str = r#"The book "Atomic Habits" by James Clear changed my life."#;

/// Scenario B sentence
#[allow(dead_code)]
pub const NATURE_PAPER: &str =
    "The research paper published in Nature shows surprising climate results.";

/// Scenario C sentence
#[allow(dead_code)]
pub const CHATTER: &str = "This is great. That was nice. Thanks.";

/// A short timed transcript mentioning a few works
pub fn sample_transcript() -> ExtractionInput {
    let segments = vec![
        TranscriptSegment::new("welcome back to the channel", 0.0),
        TranscriptSegment::new(ATOMIC_HABITS, 42.0),
        TranscriptSegment::new(r#"I also loved Cal Newport's book "Deep Work" this year."#, 95.5),
        TranscriptSegment::new("He served in World War II as a pilot.", 130.0),
    ];
    let text = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    ExtractionInput::from_text(text).with_segments(segments)
}

/// A transcript long enough to be split into several small chunks
#[allow(dead_code)]
pub fn long_transcript() -> ExtractionInput {
    let sentences = [
        r#"The book "Atomic Habits" by James Clear changed my life."#,
        "Honestly the weather was fine and we talked for a while.",
        r#"Later I read the book "Sapiens" by Yuval Noah Harari."#,
        "He served in World War II as a pilot.",
        "That is the Dunning-Kruger Effect in action.",
        r#"I loved Cal Newport's book "Deep Work" this year."#,
        "A paper published in Nature showed the effect.",
        r#"Watch the documentary "Free Solo" tonight."#,
    ];
    let text = sentences.iter().cycle().take(24).copied().collect::<Vec<_>>().join(" ");
    ExtractionInput::from_text(text)
}

/// Citations of one category
#[allow(dead_code)]
pub fn of_category(citations: &[Citation], category: Category) -> Vec<&Citation> {
    citations.iter().filter(|c| c.category == category).collect()
}

/// Write `content` to `dir/name` and return the path
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Knowledge base JSON with one known book
#[allow(dead_code)]
pub const KNOWLEDGE_BASE: &str = r#"[
    {
        "title": "Atomic Habits",
        "type": "book",
        "author": "James Clear",
        "aliases": ["Atomic Habits: An Easy & Proven Way"],
        "description": "A book about building good habits",
        "url": "https://jamesclear.com/atomic-habits"
    }
]"#;
