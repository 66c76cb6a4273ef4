//! Validity filter
//!
//! Conservative per-category predicate over candidate titles. A false
//! rejection is cheaper than showing a generic token to a user, so every check
//! here errs on the side of rejecting.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use super::category::Category;

/// Default inclusive title length bounds, in chars
pub const DEFAULT_MIN_LEN: usize = 4;
pub const DEFAULT_MAX_LEN: usize = 120;

/// Category-agnostic stop list (compared against the lower-cased title)
const STOP_LIST: &[&str] = &[
    // pronouns and demonstratives
    "i", "me", "you", "he", "she", "it", "we", "they", "him", "her", "us", "them", "this",
    "that", "these", "those", "this one", "that one", "something", "anything", "everything",
    "nothing", "someone", "anyone", "everyone", "everybody", "somebody", "here", "there",
    // conversational filler
    "thanks", "thank you", "hello", "hey", "okay", "yeah", "yes", "well", "right", "today",
    "tomorrow", "yesterday", "you guys", "guys", "folks", "thing", "things", "stuff",
    "the thing", "the same", "the other", "the first", "the last", "the end", "part one",
    "part two", "let's go", "you know", "i mean", "kind of", "sort of",
    // channel and UI tokens
    "subscribe", "like", "comment", "comments", "click", "link", "the link", "description",
    "the description", "this video", "the video", "my channel", "the channel", "patreon",
    "notification bell", "sponsor", "today's sponsor",
];

/// Single words too generic to cite in any category
const COMMON_GENERIC_NOUNS: &[&str] = &[
    "science", "research", "theory", "study", "studies", "book", "books", "paper", "papers",
    "article", "topic", "person", "people", "place", "company", "technology", "event",
    "quote", "statistic", "course", "software", "video", "videos", "idea", "ideas", "concept",
    "history", "data", "information", "knowledge", "world", "life", "time", "money", "work",
    "business", "internet", "music", "art", "education", "health", "psychology",
    "philosophy", "economics", "physics", "biology", "math", "mathematics", "engineering",
    "design", "culture", "society", "being", "doing", "thinking", "learning", "something",
];

/// Multi-word phrases that are structurally fine but say nothing specific
const GENERIC_PHRASES: &[&str] = &[
    "the internet", "social media", "the economy", "human nature", "the world", "the universe",
    "the future", "the past", "modern science", "new research", "the research", "the study",
    "the book", "the paper", "the theory", "the government", "the media", "the news",
    "the science", "the data", "a study", "a book", "a paper", "recent studies",
];

fn category_generic_nouns(category: Category) -> &'static [&'static str] {
    match category {
        Category::Book => &["novel", "memoir", "chapter", "volume", "bestseller", "story"],
        Category::Paper => &[
            "journal", "review", "findings", "results", "report", "proceedings", "abstract",
        ],
        Category::Topic => &[
            "subject", "field", "area", "issue", "problem", "question", "matter", "aspect",
        ],
        Category::Person => &[
            "man", "woman", "guy", "friend", "author", "scientist", "doctor", "professor",
        ],
        Category::Place => &[
            "city", "country", "town", "state", "area", "region", "home", "house",
        ],
        Category::Company => &["startup", "firm", "brand", "corporation", "group", "labs"],
        Category::Technology => &[
            "tech", "device", "platform", "tool", "system", "app", "machine", "computer", "phone",
        ],
        Category::Event => &[
            "war", "revolution", "crisis", "summit", "election", "meeting", "party",
        ],
        Category::Theory => &["law", "principle", "hypothesis", "effect", "bias", "model"],
        Category::Course => &["class", "lecture", "lesson", "program", "tutorial"],
        Category::Software => &["app", "program", "tool", "code", "application"],
        Category::Video => &["film", "movie", "documentary", "episode", "clip", "series", "show"],
        Category::Quote | Category::Statistic => &[],
    }
}

/// Words that never appear in a person's name
const PERSON_FORBIDDEN_WORDS: &[&str] = &[
    // verbs
    "said", "says", "think", "thinks", "know", "knows", "like", "want", "went", "going", "get",
    "got", "make", "made", "see", "saw", "look", "told", "tell", "asked", "wrote", "is", "was",
    "are", "were", "have", "has", "had", "did", "does",
    // pronouns
    "i", "me", "you", "he", "she", "it", "we", "they", "him", "her", "them", "his", "hers",
    "their", "our", "your", "my", "this", "that", "these", "those",
    // greetings
    "hello", "hi", "hey", "welcome", "bye", "goodbye", "thanks", "guys", "everyone", "folks",
    "subscribe",
];

static ARTICLE_PHRASE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(the|a|an)\s+\w{1,4}$").unwrap());

/// Reason a title was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    Length,
    StopWord,
    ArticlePhrase,
    Numeric,
    NoAlphabetic,
    GenericNoun,
    PersonAcronym,
    PersonDigits,
    PersonForbiddenWord,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::StopWord => "stop_word",
            Self::ArticlePhrase => "article_phrase",
            Self::Numeric => "numeric",
            Self::NoAlphabetic => "no_alphabetic",
            Self::GenericNoun => "generic_noun",
            Self::PersonAcronym => "person_acronym",
            Self::PersonDigits => "person_digits",
            Self::PersonForbiddenWord => "person_forbidden_word",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category validity predicate
#[derive(Debug, Clone)]
pub struct ValidityFilter {
    length_bounds: BTreeMap<Category, (usize, usize)>,
}

impl Default for ValidityFilter {
    fn default() -> Self {
        let length_bounds = BTreeMap::from([
            (Category::Quote, (10, 300)),
            (Category::Statistic, (6, 160)),
            (Category::Paper, (4, 200)),
            (Category::Company, (3, 120)),
            (Category::Course, (4, 100)),
        ]);
        Self { length_bounds }
    }
}

impl ValidityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the length bounds of one category
    pub fn with_length_bounds(mut self, category: Category, min: usize, max: usize) -> Self {
        self.length_bounds.insert(category, (min, max));
        self
    }

    pub fn length_bounds(&self, category: Category) -> (usize, usize) {
        self.length_bounds
            .get(&category)
            .copied()
            .unwrap_or((DEFAULT_MIN_LEN, DEFAULT_MAX_LEN))
    }

    pub fn is_valid(&self, title: &str, category: Category) -> bool {
        self.check(title, category).is_ok()
    }

    /// Validate a title, reporting the first failed check
    pub fn check(&self, title: &str, category: Category) -> Result<(), Rejection> {
        let trimmed = title.trim();
        let (min, max) = self.length_bounds(category);
        let len = trimmed.chars().count();
        if len < min || len > max {
            return Err(Rejection::Length);
        }

        let normalized = trimmed.to_lowercase();
        if STOP_LIST.contains(&normalized.as_str()) {
            return Err(Rejection::StopWord);
        }
        if ARTICLE_PHRASE_REGEX.is_match(&normalized) {
            return Err(Rejection::ArticlePhrase);
        }
        if is_numeric(trimmed) {
            return Err(Rejection::Numeric);
        }
        if !trimmed.chars().any(char::is_alphabetic) {
            return Err(Rejection::NoAlphabetic);
        }

        let mut words = normalized.split_whitespace();
        if let (Some(word), None) = (words.next(), words.next()) {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if COMMON_GENERIC_NOUNS.contains(&word)
                || category_generic_nouns(category).contains(&word)
            {
                return Err(Rejection::GenericNoun);
            }
        }

        if category == Category::Person {
            check_person_name(trimmed)?;
        }

        Ok(())
    }
}

fn is_numeric(title: &str) -> bool {
    title.chars().any(|c| c.is_ascii_digit())
        && title
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ',' | '-' | '+'))
}

fn check_person_name(title: &str) -> Result<(), Rejection> {
    for token in title.split_whitespace() {
        let letters: Vec<char> = token.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() > 3 && letters.iter().all(|c| c.is_uppercase()) {
            return Err(Rejection::PersonAcronym);
        }
        if token.chars().any(|c| c.is_ascii_digit()) {
            return Err(Rejection::PersonDigits);
        }
        let word = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if PERSON_FORBIDDEN_WORDS.contains(&word.as_str()) {
            return Err(Rejection::PersonForbiddenWord);
        }
    }
    Ok(())
}

/// Whether a lower-cased title is a known overly generic term
pub fn is_generic_term(normalized: &str) -> bool {
    let normalized = normalized.trim();
    GENERIC_PHRASES.contains(&normalized) || COMMON_GENERIC_NOUNS.contains(&normalized)
}

/// [`ValidityFilter::is_valid`] with default bounds
pub fn is_valid(title: &str, category: Category) -> bool {
    static FILTER: LazyLock<ValidityFilter> = LazyLock::new(ValidityFilter::default);
    FILTER.is_valid(title, category)
}
