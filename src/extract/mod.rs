//! Fact extraction from category memberships and page markup.
//!
//! Category titles yield `cat.*` facts; recognized template invocations yield
//! `<template-prefix>.*` facts. Both are unioned into one `FactSet` per name.

use tracing::debug;

use crate::constants::extract::{HIT_CATEGORIES, HIT_PAGES};
use crate::facts::FactSet;
use crate::language::LanguageResolver;
use crate::stats::{RunStats, SoftMiss};

/// Category title patterns.
pub mod category;
/// Template invocation tokenizer.
pub mod markup;
/// Per-template argument schemas.
pub mod template;

pub use category::{parse_categories, parse_category};
pub use markup::{ArgName, Argument, Invocation, invocations};
pub use template::{TEMPLATE_SCHEMAS, TemplateSchema, parse_invocation, schema_for};

/// Facts from every recognized template in `markup`.
///
/// A page without recognized templates is a pattern miss, not an error.
pub fn parse_markup(
    name: &str,
    markup: &str,
    resolver: &(impl LanguageResolver + ?Sized),
    stats: &mut RunStats,
) -> FactSet {
    let mut facts = FactSet::new();
    let mut hit = false;
    for invocation in invocations(markup) {
        let Some(schema) = schema_for(&invocation.name) else {
            continue;
        };
        hit = true;
        facts.absorb(parse_invocation(&invocation, schema, resolver, stats));
    }
    if !hit {
        debug!(name, "pattern miss");
        stats.misses.add(SoftMiss::PatternMiss);
    }
    facts
}

/// Extract the combined fact set for one name.
///
/// Counts a hit per source that produced facts and a hit per extracted key.
pub fn extract<S: AsRef<str>>(
    name: &str,
    categories: &[S],
    markup: Option<&str>,
    resolver: &(impl LanguageResolver + ?Sized),
    stats: &mut RunStats,
) -> FactSet {
    let category_facts = parse_categories(categories, resolver, stats);
    if !category_facts.is_empty() {
        stats.hits.add(HIT_CATEGORIES);
    }
    debug!(name, facts = ?category_facts, "category result");

    let mut facts = match markup {
        Some(markup) => parse_markup(name, markup, resolver, stats),
        None => FactSet::new(),
    };
    if !facts.is_empty() {
        stats.hits.add(HIT_PAGES);
    }
    debug!(name, facts = ?facts, "markup result");

    facts.absorb(category_facts);
    for (key, _) in facts.iter() {
        stats.hits.add(key.clone());
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageTable;

    #[test]
    fn categories_and_markup_combine() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = extract(
            "Jean",
            &["Category:French male given names from Latin"],
            Some("{{given name|fr|male|eq=John}}"),
            &table,
            &mut stats,
        );
        assert_eq!(facts.len(), 6);
        assert!(facts.get("given-name.eq").unwrap().contains("John"));
        assert!(facts.get("cat.origin").unwrap().contains("la"));
        assert_eq!(stats.hits.get(&HIT_CATEGORIES.to_string()), 1);
        assert_eq!(stats.hits.get(&HIT_PAGES.to_string()), 1);
        assert_eq!(stats.hits.get(&"cat.lang".to_string()), 1);
    }

    #[test]
    fn pages_without_templates_are_pattern_misses() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = parse_markup("Jean", "Just prose, {{l|en|John}}.", &table, &mut stats);
        assert!(facts.is_empty());
        assert_eq!(stats.misses.get(&SoftMiss::PatternMiss), 1);
    }

    #[test]
    fn missing_markup_yields_category_facts_only() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = extract(
            "Anna",
            &["Category:English female given names"],
            None,
            &table,
            &mut stats,
        );
        assert_eq!(facts.len(), 2);
        assert_eq!(stats.misses.get(&SoftMiss::PatternMiss), 0);
        assert_eq!(stats.hits.get(&HIT_PAGES.to_string()), 0);
    }
}
