use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::errors::NamebaseError;
use crate::extract::extract;
use crate::facts::{FactSet, split_key};
use crate::language::LanguageResolver;
use crate::stats::{RunStats, SoftMiss};
use crate::store::{LanguageField, NameEntry, NameInfo, NameStore};
use crate::vocab::{GenderFlag, Relationship, RelationshipEdge};

/// Extract the combined category and page facts for one stored name.
pub fn parse_name<S: NameStore + ?Sized>(
    store: &S,
    resolver: &(impl LanguageResolver + ?Sized),
    entry: &NameEntry,
    stats: &mut RunStats,
) -> Result<FactSet, NamebaseError> {
    let categories = store.categories_for(entry.id)?;
    Ok(extract(
        &entry.name,
        &categories,
        entry.wiki_text.as_deref(),
        resolver,
        stats,
    ))
}

/// Write extracted facts for `entry` back into the store.
///
/// Language fields become language rows, relationship fields become edges to
/// existing names, and gender words are OR-ed into the name's info. Fields
/// with no handler are counted and skipped.
pub fn apply_facts<S: NameStore + ?Sized>(
    store: &mut S,
    entry: &NameEntry,
    facts: &FactSet,
    parsed_at: DateTime<Utc>,
    stats: &mut RunStats,
) -> Result<NameInfo, NamebaseError> {
    let mut gender = GenderFlag::empty();
    for (key, values) in facts.iter() {
        let (_, field) = split_key(key);
        if let Some(language_field) = LanguageField::from_field(field) {
            for tag in values {
                store.insert_language(entry.id, language_field, tag)?;
            }
        } else if let Some(relationship) = Relationship::from_field(field) {
            for target in values {
                if *target == entry.name {
                    stats.misses.add(SoftMiss::SelfReference);
                    continue;
                }
                let Some(name_id2) = store.name_id(target) else {
                    debug!(name = %entry.name, target = %target, "relationship target not stored");
                    stats.misses.add(SoftMiss::MissingTarget);
                    continue;
                };
                store.insert_relationship(RelationshipEdge {
                    name_id: entry.id,
                    relationship,
                    name_id2,
                })?;
            }
        } else if field == "gender" {
            for word in values {
                match GenderFlag::parse(word) {
                    Some(flag) => gender |= flag,
                    None => {
                        debug!(name = %entry.name, word = %word, "unknown gender");
                        stats.misses.add(SoftMiss::UnknownGender);
                    }
                }
            }
        } else {
            debug!(name = %entry.name, key = %key, "unhandled field");
            stats.misses.add(SoftMiss::UnhandledField);
        }
    }

    let info = NameInfo {
        gender_flag: gender.bits(),
        last_parse: parsed_at,
    };
    store.update_name_info(entry.id, info)?;
    Ok(info)
}

/// Parse every name with page text, or only `filter` when given.
///
/// Per-name failures are tallied by `(message, kind)` and do not stop the run.
pub fn run_parse<S: NameStore + ?Sized>(
    store: &mut S,
    resolver: &(impl LanguageResolver + ?Sized),
    filter: Option<&str>,
) -> Result<RunStats, NamebaseError> {
    let entries = store.names_with_text(filter)?;
    let mut stats = RunStats {
        names: entries.len(),
        ..RunStats::default()
    };
    for entry in &entries {
        let outcome = parse_name(store, resolver, entry, &mut stats)
            .and_then(|facts| apply_facts(store, entry, &facts, Utc::now(), &mut stats));
        if let Err(err) = outcome {
            warn!(name = %entry.name, %err, "failed to parse name");
            stats.record_error(&err);
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageTable;
    use crate::store::MemoryNameStore;

    fn seeded() -> (MemoryNameStore, NameEntry) {
        let mut store = MemoryNameStore::new();
        let markup = "{{given name|fr|male|Latin|eq=John|var=Jehan|var2=Jean}}";
        let id = store.insert_name("Jean", Some(markup)).unwrap();
        store.insert_name("John", None).unwrap();
        let cat = store
            .insert_category("Category:French male given names from Latin")
            .unwrap();
        store.add_membership(id, cat).unwrap();
        let entry = store.names_with_text(Some("Jean")).unwrap().remove(0);
        (store, entry)
    }

    #[test]
    fn facts_become_languages_edges_and_gender() {
        let (mut store, entry) = seeded();
        let table = LanguageTable::builtin();
        let mut stats = RunStats::default();
        let facts = parse_name(&store, &table, &entry, &mut stats).unwrap();
        let now = Utc::now();
        let info = apply_facts(&mut store, &entry, &facts, now, &mut stats).unwrap();

        assert_eq!(info.gender_flag, GenderFlag::MALE.bits());
        assert_eq!(store.name_info(entry.id), Some(info));
        assert_eq!(store.languages(entry.id, LanguageField::Lang), vec!["fr"]);
        assert_eq!(store.languages(entry.id, LanguageField::Origin), vec!["la"]);
        let john = store.name_id("John").unwrap();
        assert_eq!(
            store.relationships_from(entry.id),
            vec![(Relationship::IsEquivalentTo, john)]
        );
        assert_eq!(stats.misses.get(&SoftMiss::SelfReference), 1);
        assert_eq!(stats.misses.get(&SoftMiss::MissingTarget), 1);
    }

    #[test]
    fn unknown_gender_words_and_fields_are_soft_misses() {
        let (mut store, entry) = seeded();
        let mut facts = FactSet::new();
        facts.add("given-name.gender", "neuter");
        facts.add("historical-given-name.notorious", "yes");
        let mut stats = RunStats::default();
        let info = apply_facts(&mut store, &entry, &facts, Utc::now(), &mut stats).unwrap();
        assert_eq!(info.gender_flag, 0);
        assert_eq!(stats.misses.get(&SoftMiss::UnknownGender), 1);
        assert_eq!(stats.misses.get(&SoftMiss::UnhandledField), 1);
    }

    #[test]
    fn run_parse_counts_names_and_hits() {
        let (mut store, _) = seeded();
        store.insert_name("Zed", Some("no templates here")).unwrap();
        let stats = run_parse(&mut store, &LanguageTable::builtin(), None).unwrap();
        assert_eq!(stats.names, 2);
        assert_eq!(stats.hits.get(&"pages".to_string()), 1);
        assert_eq!(stats.hits.get(&"categories".to_string()), 1);
        assert_eq!(stats.misses.get(&SoftMiss::PatternMiss), 1);
        assert!(stats.errors.is_empty());

        let filtered = run_parse(&mut store, &LanguageTable::builtin(), Some("Zed")).unwrap();
        assert_eq!(filtered.names, 1);
    }
}
