use anyhow::Result;
use std::path::PathBuf;

use transcite::citation::{Category, PatternLibrary};
use transcite::config::Config;

/// List the pattern rules, built-in plus any custom rules from the config
pub fn rules(category: Option<String>, config: Option<PathBuf>) -> Result<()> {
    let filter = match category.as_deref() {
        Some(name) => Some(
            Category::parse(name).ok_or_else(|| anyhow::anyhow!("Unknown category: {name}"))?,
        ),
        None => None,
    };

    let config = Config::load(config.as_deref())?;
    let library = PatternLibrary::shared_with(&config.extraction.custom_rules);

    for category in library.all_categories() {
        if filter.is_some_and(|f| f != category) {
            continue;
        }
        let rules = library.rules_for_category(category);
        println!("{category} ({} rules)", rules.len());
        for rule in rules {
            println!(
                "  {:<28} strength {:.2}  {}",
                rule.id,
                rule.base_strength,
                rule.regex.as_str()
            );
        }
    }

    if !library.skipped_rules().is_empty() {
        println!("\nSkipped (invalid): {}", library.skipped_rules().join(", "));
    }

    Ok(())
}
