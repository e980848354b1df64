use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::constants::extract::{CATEGORY_PREFIX, CATEGORY_SOURCE};
use crate::facts::FactSet;
use crate::language::LanguageResolver;
use crate::stats::{RunStats, SoftMiss};

/// Interwiki language-link categories such as `Category:fr:Prénoms`.
static LANGUAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{CATEGORY_PREFIX}\w\w:")).expect("language link pattern")
});

/// `Category:<Language> [male |female |unisex ]given names[ from <Origin>]`.
static GIVEN_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{CATEGORY_PREFIX}(.*?) (male |female |unisex |)given names( from (.+))?$"
    ))
    .expect("given names pattern")
});

/// Extract `cat.lang`, `cat.gender`, and `cat.origin` from one category title.
pub fn parse_category(
    category: &str,
    resolver: &(impl LanguageResolver + ?Sized),
    stats: &mut RunStats,
) -> FactSet {
    let mut facts = FactSet::new();
    if LANGUAGE_LINK.is_match(category) {
        debug!(category, "skipping language-link category");
        stats.misses.add(SoftMiss::LanguageLinkCategory);
        return facts;
    }
    let Some(caps) = GIVEN_NAMES.captures(category) else {
        debug!(category, "unrecognized category format");
        stats.misses.add(SoftMiss::UnrecognizedCategory);
        return facts;
    };

    let mut unresolved = false;
    let language = caps.get(1).map_or("", |m| m.as_str());
    match resolver.resolve(language) {
        Ok(tag) => facts.add(format!("{CATEGORY_SOURCE}.lang"), tag),
        Err(err) => {
            debug!(category, %err, "skipping unknown language");
            stats.unresolved_language(language);
            unresolved = true;
        }
    }

    let gender = caps.get(2).map_or("", |m| m.as_str()).trim();
    if !gender.is_empty() {
        facts.add(format!("{CATEGORY_SOURCE}.gender"), gender);
    }

    if let Some(origin) = caps.get(4) {
        match resolver.resolve(origin.as_str()) {
            Ok(tag) => facts.add(format!("{CATEGORY_SOURCE}.origin"), tag),
            Err(err) => {
                debug!(category, %err, "skipping unknown origin language");
                stats.unresolved_language(origin.as_str());
                unresolved = true;
            }
        }
    }

    if !unresolved && facts.is_empty() {
        debug!(category, "category matched but produced no facts");
        stats.misses.add(SoftMiss::UnrecognizedCategory);
    }
    facts
}

/// Union the facts of every category a name belongs to.
pub fn parse_categories<S: AsRef<str>>(
    categories: &[S],
    resolver: &(impl LanguageResolver + ?Sized),
    stats: &mut RunStats,
) -> FactSet {
    let mut facts = FactSet::new();
    for category in categories {
        facts.absorb(parse_category(category.as_ref(), resolver, stats));
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageTable;

    fn values(facts: &FactSet, key: &str) -> Vec<String> {
        facts
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn gendered_category_with_origin() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = parse_category(
            "Category:French male given names from Latin",
            &table,
            &mut stats,
        );
        assert_eq!(values(&facts, "cat.lang"), vec!["fr"]);
        assert_eq!(values(&facts, "cat.gender"), vec!["male"]);
        assert_eq!(values(&facts, "cat.origin"), vec!["la"]);
        assert!(stats.misses.is_empty());
    }

    #[test]
    fn plain_category_has_only_language() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = parse_category("Category:English given names", &table, &mut stats);
        assert_eq!(values(&facts, "cat.lang"), vec!["en"]);
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn language_link_categories_are_skipped() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = parse_category("Category:fr:SomePage", &table, &mut stats);
        assert!(facts.is_empty());
        assert_eq!(stats.misses.get(&SoftMiss::LanguageLinkCategory), 1);
    }

    #[test]
    fn unknown_languages_are_counted_not_fatal() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = parse_category(
            "Category:Klingon female given names from Vulcan",
            &table,
            &mut stats,
        );
        assert_eq!(values(&facts, "cat.gender"), vec!["female"]);
        assert!(facts.get("cat.lang").is_none());
        assert_eq!(stats.unresolved_languages.get(&"Klingon".to_string()), 1);
        assert_eq!(stats.unresolved_languages.get(&"Vulcan".to_string()), 1);
        assert_eq!(stats.misses.get(&SoftMiss::UnrecognizedCategory), 0);
    }

    #[test]
    fn unrelated_categories_are_reported() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = parse_category("Category:Given names by language", &table, &mut stats);
        assert!(facts.is_empty());
        assert_eq!(stats.misses.get(&SoftMiss::UnrecognizedCategory), 1);
    }

    #[test]
    fn memberships_union_into_one_set() {
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = parse_categories(
            &[
                "Category:English female given names",
                "Category:German female given names",
            ],
            &table,
            &mut stats,
        );
        assert_eq!(values(&facts, "cat.lang"), vec!["de", "en"]);
        assert_eq!(values(&facts, "cat.gender"), vec!["female"]);
    }
}
