//! Citation categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity category of a citation.
///
/// The set is closed at compile time; adding a category means adding a
/// variant plus rules for it in the pattern library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Book,
    Paper,
    Topic,
    Person,
    Place,
    Company,
    Technology,
    Event,
    Quote,
    Statistic,
    Theory,
    Course,
    Software,
    Video,
}

impl Category {
    /// All categories, in extraction order
    pub const ALL: [Category; 14] = [
        Category::Book,
        Category::Paper,
        Category::Topic,
        Category::Person,
        Category::Place,
        Category::Company,
        Category::Technology,
        Category::Event,
        Category::Quote,
        Category::Statistic,
        Category::Theory,
        Category::Course,
        Category::Software,
        Category::Video,
    ];

    /// Get all categories
    pub fn all() -> impl Iterator<Item = Category> {
        Self::ALL.into_iter()
    }

    /// Wire name (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Book => "book",
            Category::Paper => "paper",
            Category::Topic => "topic",
            Category::Person => "person",
            Category::Place => "place",
            Category::Company => "company",
            Category::Technology => "technology",
            Category::Event => "event",
            Category::Quote => "quote",
            Category::Statistic => "statistic",
            Category::Theory => "theory",
            Category::Course => "course",
            Category::Software => "software",
            Category::Video => "video",
        }
    }

    /// Parse a category from a string (case-insensitive, accepts common aliases)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "book" | "books" | "novel" => Some(Category::Book),
            "paper" | "papers" | "study" | "article" | "research" => Some(Category::Paper),
            "topic" | "concept" | "subject" => Some(Category::Topic),
            "person" | "people" | "per" => Some(Category::Person),
            "place" | "location" | "loc" | "gpe" => Some(Category::Place),
            "company" | "organization" | "org" => Some(Category::Company),
            "technology" | "tech" => Some(Category::Technology),
            "event" => Some(Category::Event),
            "quote" | "quotation" => Some(Category::Quote),
            "statistic" | "stat" | "statistics" => Some(Category::Statistic),
            "theory" | "law" | "principle" => Some(Category::Theory),
            "course" | "class" => Some(Category::Course),
            "software" | "app" | "tool" => Some(Category::Software),
            "video" | "film" | "documentary" => Some(Category::Video),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
