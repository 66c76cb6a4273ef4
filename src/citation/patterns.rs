//! Pattern library: the declarative rule table
//!
//! Rules are data. Each [`RuleDefinition`] names its category, a regular
//! expression and the role of every capture group, plus an optional static
//! strength. Definitions are compiled once into [`PatternRule`]s and grouped by
//! category; the order within a category runs from most to least specific.
//!
//! A definition that fails to compile is skipped with a configuration warning.
//! It never aborts construction of the library.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock};

use super::category::Category;
use super::weights::{
    DEFAULT_TOP_RULE_STRENGTH, MAX_RULE_STRENGTH, MIN_RULE_STRENGTH, RULE_RANK_DECAY,
};
use crate::error::{Error, Result};

/// Role of a capture group within a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureRole {
    /// The cited work, name or statement
    Title,
    /// Author, speaker or other attribution
    Author,
    /// Extra context kept for display only
    Context,
}

fn default_roles() -> Vec<CaptureRole> {
    vec![CaptureRole::Title]
}

/// Uncompiled rule, as written in a rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Stable identifier, conventionally `<category>.<name>`
    pub id: String,

    /// Category assigned to every match of this rule
    pub category: Category,

    /// Regular expression (Rust `regex` syntax)
    pub pattern: String,

    /// `roles[i]` is the role of capture group `i + 1`
    #[serde(default = "default_roles")]
    pub roles: Vec<CaptureRole>,

    /// Static reliability; derived from the rule's rank when absent
    #[serde(default)]
    pub strength: Option<f32>,
}

impl RuleDefinition {
    /// Create a single-title rule definition
    pub fn new(id: impl Into<String>, category: Category, pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            pattern: pattern.into(),
            roles: default_roles(),
            strength: None,
        }
    }

    /// Set the capture roles
    pub fn with_roles(mut self, roles: &[CaptureRole]) -> Self {
        self.roles = roles.to_vec();
        self
    }

    /// Set an explicit strength
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = Some(strength);
        self
    }
}

/// Compiled, immutable pattern rule
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub id: String,
    pub category: Category,
    pub regex: Regex,
    pub capture_roles: Vec<CaptureRole>,
    pub base_strength: f32,
    /// Position within the category (0 = most specific)
    pub rank: usize,
}

impl PatternRule {
    /// Compile a definition at the given rank
    pub fn compile(def: &RuleDefinition, rank: usize) -> Result<Self> {
        let regex = Regex::new(&def.pattern).map_err(|source| Error::InvalidRule {
            id: def.id.clone(),
            source,
        })?;

        if !def.roles.contains(&CaptureRole::Title) {
            return Err(Error::invalid_config(
                format!("rules.{}.roles", def.id),
                format!("{:?}", def.roles),
                "A rule must declare a title capture",
            ));
        }

        // captures_len includes the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if def.roles.len() > groups {
            return Err(Error::invalid_config(
                format!("rules.{}.roles", def.id),
                def.roles.len(),
                format!("Pattern only has {groups} capture group(s)"),
            ));
        }

        if let Some(strength) = def.strength {
            if !strength.is_finite() {
                return Err(Error::invalid_config(
                    format!("rules.{}.strength", def.id),
                    strength,
                    "Must be a finite number",
                ));
            }
        }

        Ok(Self {
            id: def.id.clone(),
            category: def.category,
            regex,
            capture_roles: def.roles.clone(),
            base_strength: resolve_strength(def.strength, rank),
            rank,
        })
    }

    /// Capture group index (1-based) declared for a role
    pub fn group_for(&self, role: CaptureRole) -> Option<usize> {
        self.capture_roles
            .iter()
            .position(|r| *r == role)
            .map(|i| i + 1)
    }
}

/// Explicit strengths are clamped; missing ones decay with rank
fn resolve_strength(explicit: Option<f32>, rank: usize) -> f32 {
    let raw = explicit
        .unwrap_or_else(|| DEFAULT_TOP_RULE_STRENGTH - RULE_RANK_DECAY * rank as f32);
    raw.clamp(MIN_RULE_STRENGTH, MAX_RULE_STRENGTH)
}

/// Ordered rule table grouped by category
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    rules: BTreeMap<Category, Vec<PatternRule>>,
    skipped: Vec<String>,
}

impl PatternLibrary {
    /// Compile the built-in rule table
    pub fn builtin() -> Self {
        Self::from_definitions(builtin_definitions())
    }

    /// Process-wide built-in library, compiled on first use
    pub fn shared() -> Arc<PatternLibrary> {
        static LIBRARY: LazyLock<Arc<PatternLibrary>> =
            LazyLock::new(|| Arc::new(PatternLibrary::builtin()));
        Arc::clone(&LIBRARY)
    }

    /// The shared library, copied and extended only when `defs` is non-empty
    pub fn shared_with(defs: &[RuleDefinition]) -> Arc<PatternLibrary> {
        let shared = Self::shared();
        if defs.is_empty() {
            return shared;
        }
        Arc::new(PatternLibrary::clone(&shared).with_rules(defs.iter().cloned()))
    }

    /// Compile definitions, skipping (and logging) malformed ones
    pub fn from_definitions(defs: impl IntoIterator<Item = RuleDefinition>) -> Self {
        let mut library = Self::default();
        library.extend(defs);
        library
    }

    /// Compile definitions, failing on the first malformed one
    pub fn try_from_definitions(defs: impl IntoIterator<Item = RuleDefinition>) -> Result<Self> {
        let mut library = Self::default();
        for def in defs {
            let rank = library.rules_for_category(def.category).len();
            let rule = PatternRule::compile(&def, rank)?;
            library.rules.entry(def.category).or_default().push(rule);
        }
        Ok(library)
    }

    /// Append definitions after the existing rules of their category
    pub fn extend(&mut self, defs: impl IntoIterator<Item = RuleDefinition>) {
        for def in defs {
            let rank = self.rules_for_category(def.category).len();
            match PatternRule::compile(&def, rank) {
                Ok(rule) => self.rules.entry(def.category).or_default().push(rule),
                Err(e) => {
                    tracing::warn!(
                        rule_id = %def.id,
                        category = %def.category,
                        error = %e,
                        "Skipping malformed pattern rule"
                    );
                    crate::metrics::record_rule_skipped(def.category.as_str());
                    self.skipped.push(def.id);
                }
            }
        }
    }

    /// Builder-style [`extend`](Self::extend)
    pub fn with_rules(mut self, defs: impl IntoIterator<Item = RuleDefinition>) -> Self {
        self.extend(defs);
        self
    }

    /// Rules of one category, most specific first
    pub fn rules_for_category(&self, category: Category) -> &[PatternRule] {
        self.rules.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Categories that have at least one rule
    pub fn all_categories(&self) -> BTreeSet<Category> {
        self.rules
            .iter()
            .filter(|(_, rules)| !rules.is_empty())
            .map(|(category, _)| *category)
            .collect()
    }

    /// All rules, category by category
    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.values().flatten()
    }

    /// Find a rule by id
    pub fn get(&self, id: &str) -> Option<&PatternRule> {
        self.iter().find(|r| r.id == id)
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of definitions that failed to compile
    pub fn skipped_rules(&self) -> &[String] {
        &self.skipped
    }
}

// ============================================================================
// Built-in rule table
// ============================================================================

use CaptureRole::{Author, Title};

/// (id, category, pattern, roles, strength)
type BuiltinRule = (
    &'static str,
    Category,
    &'static str,
    &'static [CaptureRole],
    f32,
);

const TITLE: &[CaptureRole] = &[Title];
const TITLE_AUTHOR: &[CaptureRole] = &[Title, Author];
const AUTHOR_TITLE: &[CaptureRole] = &[Author, Title];

const BUILTIN_RULES: &[BuiltinRule] = &[
    // ── Books ──
    (
        "book.quoted_by",
        Category::Book,
        r#"["“]([^"“”\n]{2,120})["”],?\s+by\s+([A-Z][\w.'-]*(?:\s+[A-Z][\w.'-]*){0,3})"#,
        TITLE_AUTHOR,
        0.95,
    ),
    (
        "book.possessive",
        Category::Book,
        r#"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2})'s\s+(?i:book|novel|memoir|bestseller),?\s+["“]([^"“”\n]{2,120})["”]"#,
        AUTHOR_TITLE,
        0.9,
    ),
    (
        "book.keyword_quoted",
        Category::Book,
        r#"(?i:\bbook|\bnovel|\bmemoir|\bbestseller|\bautobiography)\s+(?:(?i:called|titled|named)\s+)?["“]([^"“”\n]{2,120})["”]"#,
        TITLE,
        0.85,
    ),
    (
        "book.reading",
        Category::Book,
        r#"(?i:\bread|\breading|\brecommend|\brereading)\s+["“]([^"“”\n]{2,120})["”]"#,
        TITLE,
        0.7,
    ),
    (
        "book.unquoted",
        Category::Book,
        r"(?i:\ba book called|\bthe book|\bhis book|\bher book|\btheir book|\bnew book)\s+([A-Z][\w'-]*(?:\s+(?:of|the|and|to|in|a|an|for|[A-Z][\w'-]*)){0,7})",
        TITLE,
        0.6,
    ),
    // ── Papers ──
    (
        "paper.quoted",
        Category::Paper,
        r#"(?i:\bpaper|\bstudy|\barticle|\bthesis|\bpreprint)\s+(?:(?i:called|titled|named|on)\s+)?["“]([^"“”\n]{4,160})["”]"#,
        TITLE,
        0.9,
    ),
    (
        "paper.arxiv",
        Category::Paper,
        r"\b((?i:arxiv):\s?\d{4}\.\d{4,5}(?:v\d+)?)",
        TITLE,
        0.9,
    ),
    (
        "paper.doi",
        Category::Paper,
        r#"\b(10\.\d{4,9}/[^\s"<>]+)"#,
        TITLE,
        0.9,
    ),
    (
        "paper.published_in",
        Category::Paper,
        r"(?i:\bpaper|\bstudy|\bresearch|\barticle|\bfindings|\bresults)\s+(?i:published|appeared|printed|came out)\s+in\s+(?:[Tt]he\s+)?([A-Z][\w&-]*(?:\s+(?:of|for|and|&|[A-Z][\w&-]*)){0,6})",
        TITLE,
        0.75,
    ),
    (
        "paper.journal",
        Category::Paper,
        r"\b(?:[Tt]he\s+)?((?:Journal|Proceedings|Annals|Review)\s+of\s+(?:the\s+)?[A-Z][\w-]*(?:\s+(?:and|of|[A-Z][\w-]*)){0,5})",
        TITLE,
        0.7,
    ),
    (
        "paper.et_al",
        Category::Paper,
        r"\b([A-Z][a-z]+\s+et\s+al\.?(?:\s*\(?\d{4}\)?)?)",
        TITLE,
        0.65,
    ),
    // ── Topics ──
    (
        "topic.concept_of",
        Category::Topic,
        r"(?i:\bthe concept of|\bthe idea of|\bthe field of|\bthe study of|\bthe science of|\bthe psychology of|\bthe physics of)\s+([A-Za-z][\w-]{3,}(?:\s+(?:[A-Z][\w-]+|theory|mechanics|learning|intelligence|science|economics|psychology|physics|biology|computing|engineering|chemistry|philosophy)){0,3})",
        TITLE,
        0.65,
    ),
    (
        "topic.academic",
        Category::Topic,
        r"(?i)\b(machine learning|deep learning|artificial intelligence|neuroscience|behavioral economics|cognitive psychology|evolutionary biology|quantum (?:mechanics|physics|computing)|thermodynamics|epigenetics|neuroplasticity|cryptography|stoicism|existentialism|climate science|molecular biology|astrophysics|linguistics)\b",
        TITLE,
        0.55,
    ),
    // ── People ──
    (
        "person.honorific",
        Category::Person,
        r"(?i:\bdr\.?|\bdoctor|\bprofessor|\bprof\.)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2})",
        TITLE,
        0.85,
    ),
    (
        "person.role",
        Category::Person,
        r"(?i:\bauthor|\bscientist|\bresearcher|\bphysicist|\bphilosopher|\beconomist|\bpsychologist|\bhistorian|\bneuroscientist|\bbiologist|\bentrepreneur|\bjournalist|\bmathematician)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,2})",
        TITLE,
        0.8,
    ),
    (
        "person.according_to",
        Category::Person,
        r"(?i:\baccording to)\s+([A-Z][a-z]+\s+[A-Z][a-z]+)",
        TITLE,
        0.7,
    ),
    (
        "person.attribution_verb",
        Category::Person,
        r"\b([A-Z][a-z]+\s+[A-Z][a-z]+)\s+(?:argues|argued|wrote|writes|discovered|proposed|explains|explained|believes|believed|famously said|pointed out)\b",
        TITLE,
        0.65,
    ),
    // ── Places ──
    (
        "place.geographic",
        Category::Place,
        r"(?i:\bin|\bat|\bfrom|\bto|\bvisited|\bnear|\bacross)\s+(?:[Tt]he\s+)?((?:[A-Z][a-z]+\s+){1,2}(?:Valley|Mountains|Island|Islands|Desert|Ocean|Sea|River|Lake|Canyon|Forest|National Park|Peninsula|Bay))\b",
        TITLE,
        0.75,
    ),
    (
        "place.known",
        Category::Place,
        r"\b(Silicon Valley|New York City|New York|Los Angeles|San Francisco|Paris|London|Tokyo|Rome|Berlin|Athens|Jerusalem|Beijing|Egypt|Greece|Japan|China|India|Antarctica|Mars|Chernobyl|Hiroshima)\b",
        TITLE,
        0.6,
    ),
    // ── Companies ──
    (
        "company.suffix",
        Category::Company,
        r"\b([A-Z][\w&]*(?:\s+[A-Z][\w&]*){0,3}\s+(?:Inc|Corp|Corporation|Ltd|LLC|Technologies|Labs|Group|Holdings))\b",
        TITLE,
        0.85,
    ),
    (
        "company.context",
        Category::Company,
        r"(?i:\bcompany|\bstartup|\bfirm|\bbrand)\s+(?i:called|named)\s+([A-Z][\w&]*(?:\s+[A-Z][\w&]*){0,2})",
        TITLE,
        0.75,
    ),
    (
        "company.known",
        Category::Company,
        r"\b(Google|Apple|Microsoft|Amazon|Meta|Tesla|OpenAI|Netflix|SpaceX|Nvidia|NVIDIA|IBM|Intel|Anthropic|DeepMind|Facebook|Twitter|Samsung|Toyota|Boeing)\b",
        TITLE,
        0.7,
    ),
    (
        "company.founded",
        Category::Company,
        r"(?i:\bco-founded|\bfounded|\bstarted)\s+([A-Z][\w&]*(?:\s+[A-Z][\w&]*){0,2})",
        TITLE,
        0.6,
    ),
    // ── Technology ──
    (
        "technology.named",
        Category::Technology,
        r"(?i:\btechnology|\bplatform|\bframework|\bprotocol|\bdevice|\balgorithm)\s+(?i:called|named|known as)\s+([A-Z][\w.+-]*(?:\s+[A-Z][\w.+-]*){0,2})",
        TITLE,
        0.8,
    ),
    (
        "technology.known",
        Category::Technology,
        r"\b(GPT-\d(?:\.\d)?|ChatGPT|CRISPR|[Bb]lockchain|Bitcoin|Ethereum|quantum computers?|neural networks?|large language models?|mRNA vaccines?|LiDAR|lidar|self-driving cars?|nuclear fusion|gene editing)\b",
        TITLE,
        0.6,
    ),
    // ── Events ──
    (
        "event.year_named",
        Category::Event,
        r"\b(?:[Tt]he\s+)?(\d{4}\s+(?:[A-Z][a-z]+\s+){0,2}(?:Olympics|World Cup|Election|Grand Prix|Championship|Summit|Crisis|Pandemic|Super Bowl))\b",
        TITLE,
        0.85,
    ),
    (
        "event.named",
        Category::Event,
        r"\b(?:[Tt]he\s+)?((?:[A-Z][a-z]+\s+){1,3}(?:War|Revolution|Crisis|Olympics|Summit|Pandemic|Depression|Renaissance|Expedition|Championship|Grand Prix|Massacre|Landing|Rebellion)(?:\s+(?:I{1,3}|IV|V)\b)?)",
        TITLE,
        0.8,
    ),
    (
        "event.incident",
        Category::Event,
        r"\b((?:[A-Z][a-z]+\s+){1,2}(?:disaster|attack|bombing|landing|collapse|crash|eruption|earthquake|outbreak))\b",
        TITLE,
        0.7,
    ),
    // ── Quotes ──
    (
        "quote.speaker_first",
        Category::Quote,
        r#"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2})\s+(?:once\s+|famously\s+)?(?:said|wrote|says|put it|remarked)[,:]?\s+["“]([^"“”\n]{10,300})["”]"#,
        AUTHOR_TITLE,
        0.9,
    ),
    (
        "quote.speaker_last",
        Category::Quote,
        r#"["“]([^"“”\n]{10,300})["”],?\s+(?:said|says|wrote|according to)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2})"#,
        TITLE_AUTHOR,
        0.9,
    ),
    (
        "quote.quoting",
        Category::Quote,
        r#"(?i:\bto quote|\bquoting|\bin the words of)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2})[,:]?\s+["“]([^"“”\n]{10,300})["”]"#,
        AUTHOR_TITLE,
        0.85,
    ),
    // ── Statistics ──
    (
        "statistic.percent_of",
        Category::Statistic,
        r"\b(\d+(?:\.\d+)?\s?(?:%|percent|per cent)\s+of\s+(?:all\s+|the\s+)?[a-z]+(?:\s+[a-z]+){0,3})",
        TITLE,
        0.75,
    ),
    (
        "statistic.magnitude",
        Category::Statistic,
        r"\b(\d+(?:\.\d+)?\s+(?:million|billion|trillion|thousand)\s+(?:[a-z]+\s+){0,2}[a-z]+)",
        TITLE,
        0.6,
    ),
    (
        "statistic.times",
        Category::Statistic,
        r"\b(\d+(?:\.\d+)?\s*(?:x|times)\s+(?:more|less|faster|slower|higher|lower|likely|bigger|smaller)(?:\s+[a-z]+){0,3})",
        TITLE,
        0.6,
    ),
    (
        "statistic.claim",
        Category::Statistic,
        r"(?i:\bstudies show|\bresearch shows|\bdata shows|\bstatistics show|\bsurveys show)\s+(?:that\s+)?([^.!?\n]{10,160})",
        TITLE,
        0.55,
    ),
    // ── Theories ──
    (
        "theory.named",
        Category::Theory,
        r"\b(?:[Tt]he\s+)?((?:[A-Z][a-z]+(?:'s|-[A-Z][a-z]+)?\s+){1,3}(?:Theory|Law|Principle|Hypothesis|Paradox|Effect|Theorem|Fallacy|Bias|Dilemma))\b",
        TITLE,
        0.85,
    ),
    (
        "theory.known",
        Category::Theory,
        r"(?i)\b(general relativity|special relativity|string theory|big bang theory|chaos theory|game theory|evolution by natural selection|natural selection|quantum field theory|cognitive dissonance|confirmation bias)\b",
        TITLE,
        0.75,
    ),
    (
        "theory.of",
        Category::Theory,
        r"\b((?:theory|law|laws|principle)\s+of\s+(?:[a-z]+\s+){0,2}[a-z]+)\b",
        TITLE,
        0.7,
    ),
    // ── Courses ──
    (
        "course.named",
        Category::Course,
        r#"(?i:\bcourse|\bclass|\bmasterclass|\blecture series|\bbootcamp)\s+(?:(?i:called|titled|named|on)\s+)?["“]([^"“”\n]{4,100})["”]"#,
        TITLE,
        0.85,
    ),
    (
        "course.code",
        Category::Course,
        r"\b((?:CS|MATH|PHYS|ECON|BIO|CHEM|PSYCH|STAT)\s?\d{2,4}[A-Z]?)\b",
        TITLE,
        0.7,
    ),
    (
        "course.platform",
        Category::Course,
        r"\b((?:[A-Z][\w'-]*\s+){1,5})(?i:course|class|specialization)\s+(?i:on|from)\s+(?:Coursera|edX|Udemy|Khan Academy|Skillshare|MasterClass)",
        TITLE,
        0.65,
    ),
    // ── Software ──
    (
        "software.named",
        Category::Software,
        r"(?i:\bapp|\bapplication|\bsoftware|\bprogram|\blibrary|\bextension|\bplugin|\btool)\s+(?i:called|named)\s+([A-Z][\w.+-]*(?:\s+[A-Z][\w.+-]*){0,2})",
        TITLE,
        0.85,
    ),
    (
        "software.usage",
        Category::Software,
        r"(?i:\busing|\buse|\binstalled|\bdownload|\bopen|\bin)\s+(Photoshop|Excel|Notion|Obsidian|Python|JavaScript|TypeScript|Rust|Linux|Windows|Blender|Figma|VS Code|Docker|Kubernetes|TensorFlow|PyTorch|Anki|Zotero|Premiere Pro|Final Cut Pro)\b",
        TITLE,
        0.7,
    ),
    // ── Videos ──
    (
        "video.quoted",
        Category::Video,
        r#"(?i:\bvideo|\bdocumentary|\bfilm|\bmovie|\bepisode|\bted talk|\bseries)\s+(?:(?i:called|titled|named)\s+)?["“]([^"“”\n]{2,120})["”]"#,
        TITLE,
        0.85,
    ),
    (
        "video.watch",
        Category::Video,
        r"(?i:\bwatch|\bwatched|\bcheck out|\bsaw)\s+(?:the\s+)?(?i:documentary|film|movie|series|video)\s+([A-Z][\w'-]*(?:\s+(?:of|the|and|[A-Z][\w'-]*)){0,5})",
        TITLE,
        0.7,
    ),
];

/// Built-in rule table as owned definitions
pub fn builtin_definitions() -> Vec<RuleDefinition> {
    BUILTIN_RULES
        .iter()
        .map(|(id, category, pattern, roles, strength)| RuleDefinition {
            id: (*id).to_string(),
            category: *category,
            pattern: (*pattern).to_string(),
            roles: roles.to_vec(),
            strength: Some(*strength),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_all_compile() {
        let library = PatternLibrary::builtin();
        assert!(
            library.skipped_rules().is_empty(),
            "built-in rules failed to compile: {:?}",
            library.skipped_rules()
        );
        assert_eq!(library.len(), BUILTIN_RULES.len());
    }

    #[test]
    fn test_every_category_has_rules() {
        let library = PatternLibrary::shared();
        let categories = library.all_categories();
        for category in Category::all() {
            assert!(categories.contains(&category), "no rules for {category}");
        }
    }

    #[test]
    fn test_rules_keep_declared_order() {
        let library = PatternLibrary::shared();
        let books = library.rules_for_category(Category::Book);
        assert_eq!(books[0].id, "book.quoted_by");
        for (i, rule) in books.iter().enumerate() {
            assert_eq!(rule.rank, i);
        }
    }

    #[test]
    fn test_malformed_rule_is_skipped() {
        let library = PatternLibrary::from_definitions(vec![
            RuleDefinition::new("book.broken", Category::Book, r"(unclosed"),
            RuleDefinition::new("book.ok", Category::Book, r"novel ([A-Z]\w+)"),
        ]);
        assert_eq!(library.len(), 1);
        assert_eq!(library.skipped_rules(), &["book.broken".to_string()]);
        // surviving rule is ranked first in its category
        assert_eq!(library.rules_for_category(Category::Book)[0].rank, 0);
    }

    #[test]
    fn test_try_from_definitions_reports_error() {
        let result = PatternLibrary::try_from_definitions(vec![RuleDefinition::new(
            "book.broken",
            Category::Book,
            r"[a-",
        )]);
        assert!(matches!(result, Err(Error::InvalidRule { .. })));
    }

    #[test]
    fn test_roles_must_fit_capture_groups() {
        let def = RuleDefinition::new("quote.too_many", Category::Quote, r"said (\w+)")
            .with_roles(&[CaptureRole::Author, CaptureRole::Title]);
        assert!(PatternRule::compile(&def, 0).is_err());
    }

    #[test]
    fn test_rule_without_title_role_is_rejected() {
        let def = RuleDefinition::new("person.author_only", Category::Person, r"by (\w+)")
            .with_roles(&[CaptureRole::Author]);
        assert!(PatternRule::compile(&def, 0).is_err());
    }

    #[test]
    fn test_strength_derived_from_rank() {
        let first = resolve_strength(None, 0);
        let third = resolve_strength(None, 2);
        assert!(first > third);
        assert!(resolve_strength(None, 100) >= MIN_RULE_STRENGTH);
        assert_eq!(resolve_strength(Some(2.0), 0), MAX_RULE_STRENGTH);
    }

    #[test]
    fn test_shared_library_is_not_copied_without_custom_rules() {
        let shared = PatternLibrary::shared();
        assert!(Arc::ptr_eq(&shared, &PatternLibrary::shared()));
        assert!(Arc::ptr_eq(&shared, &PatternLibrary::shared_with(&[])));

        let extended = PatternLibrary::shared_with(&[RuleDefinition::new(
            "event.grand_prix",
            Category::Event,
            r"\b([A-Z][a-z]+ Grand Prix)\b",
        )]);
        assert!(!Arc::ptr_eq(&shared, &extended));
        assert_eq!(extended.len(), shared.len() + 1);
        assert!(shared.get("event.grand_prix").is_none());
    }

    #[test]
    fn test_group_for_role() {
        let library = PatternLibrary::shared();
        let rule = library.get("book.possessive").unwrap();
        assert_eq!(rule.group_for(CaptureRole::Author), Some(1));
        assert_eq!(rule.group_for(CaptureRole::Title), Some(2));
        assert_eq!(rule.group_for(CaptureRole::Context), None);
    }

    #[test]
    fn test_custom_rules_extend_category() {
        let library = PatternLibrary::builtin().with_rules(vec![RuleDefinition::new(
            "event.racing_gp",
            Category::Event,
            r"\b((?:[A-Z][a-z]+\s+)GP)\b",
        )]);
        let events = library.rules_for_category(Category::Event);
        let last = events.last().unwrap();
        assert_eq!(last.id, "event.racing_gp");
        assert_eq!(last.rank, events.len() - 1);
    }

    #[test]
    fn test_rule_definition_deserializes_with_defaults() {
        let def: RuleDefinition = toml::from_str(
            r#"
            id = "video.podcast"
            category = "video"
            pattern = 'podcast called "([^"]+)"'
            "#,
        )
        .unwrap();
        assert_eq!(def.roles, vec![CaptureRole::Title]);
        assert!(def.strength.is_none());
    }
}
