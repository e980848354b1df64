//! Name store: names, page text, categories, and the facts derived from them.
//!
//! `NameStore` is the typed set of verbs the parse and dump stages need.
//! `MemoryNameStore` keeps everything in memory and persists as JSON.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::facts::{LANG_FIELD, ORIGIN_FIELD};
use crate::errors::NamebaseError;
use crate::transport::fs::write_atomic;
use crate::types::{CategoryId, CategoryName, LanguageTag, Name, NameId};
use crate::vocab::{Relationship, RelationshipEdge};

const STORE_STATE_VERSION: u32 = 1;

/// One stored name with its page text, if it has one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    /// Store identity.
    pub id: NameId,
    /// Name as stored.
    pub name: Name,
    /// Raw page markup.
    #[serde(default)]
    pub wiki_text: Option<String>,
}

/// Per-name result of the last parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameInfo {
    /// OR of every gender word found for the name.
    pub gender_flag: u32,
    /// When the name was last parsed.
    pub last_parse: DateTime<Utc>,
}

/// Which language table a language row belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageField {
    /// Language the name is used in.
    Lang,
    /// Language the name originates from.
    Origin,
}

impl LanguageField {
    /// Map an extracted field name onto a language table.
    ///
    /// Template `from` clauses name an origin language.
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            LANG_FIELD => Some(Self::Lang),
            ORIGIN_FIELD | "from" => Some(Self::Origin),
            _ => None,
        }
    }

    /// Record field name used in partition files.
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Lang => LANG_FIELD,
            Self::Origin => ORIGIN_FIELD,
        }
    }
}

/// Typed access to stored names and their facts.
pub trait NameStore {
    /// Names with page text, ordered by name. `filter` restricts to one name.
    fn names_with_text(&self, filter: Option<&str>) -> Result<Vec<NameEntry>, NamebaseError>;
    /// Identity of `name`, matched exactly.
    fn name_id(&self, name: &str) -> Option<NameId>;
    /// Name stored under `id`.
    fn name_of(&self, id: NameId) -> Option<&str>;
    /// Category titles `id` is a member of.
    fn categories_for(&self, id: NameId) -> Result<Vec<CategoryName>, NamebaseError>;
    /// Insert `name` if absent and return its identity. Page text, when
    /// given, replaces what was stored.
    fn insert_name(&mut self, name: &str, wiki_text: Option<&str>) -> Result<NameId, NamebaseError>;
    /// Insert a category title if absent and return its identity.
    fn insert_category(&mut self, title: &str) -> Result<CategoryId, NamebaseError>;
    /// Record that `name_id` belongs to `category_id`. Returns false when
    /// the membership already existed.
    fn add_membership(&mut self, name_id: NameId, category_id: CategoryId)
    -> Result<bool, NamebaseError>;
    /// Attach a language tag. Returns false when the row already existed.
    fn insert_language(
        &mut self,
        name_id: NameId,
        field: LanguageField,
        tag: &str,
    ) -> Result<bool, NamebaseError>;
    /// Insert a relationship edge. Returns false when it already existed;
    /// self-edges are rejected.
    fn insert_relationship(&mut self, edge: RelationshipEdge) -> Result<bool, NamebaseError>;
    /// Replace the parse info of `name_id`.
    fn update_name_info(&mut self, name_id: NameId, info: NameInfo) -> Result<(), NamebaseError>;
    /// Language tags of `name_id` in `field`, sorted.
    fn languages(&self, name_id: NameId, field: LanguageField) -> Vec<LanguageTag>;
    /// Outgoing edges of `name_id` as `(kind, target)`, sorted.
    fn relationships_from(&self, name_id: NameId) -> Vec<(Relationship, NameId)>;
    /// Parse info of `name_id`, if it was ever parsed.
    fn name_info(&self, name_id: NameId) -> Option<NameInfo>;
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
struct LanguageRow {
    name_id: NameId,
    field: LanguageField,
    tag: LanguageTag,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedNameStore {
    version: u32,
    names: Vec<NameEntry>,
    categories: IndexSet<CategoryName>,
    memberships: BTreeSet<(NameId, CategoryId)>,
    languages: BTreeSet<LanguageRow>,
    relationships: BTreeSet<RelationshipEdge>,
    info: BTreeMap<NameId, NameInfo>,
}

/// In-memory name store with JSON persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryNameStore {
    names: BTreeMap<NameId, NameEntry>,
    by_name: HashMap<Name, NameId>,
    categories: IndexSet<CategoryName>,
    memberships: BTreeSet<(NameId, CategoryId)>,
    languages: BTreeSet<LanguageRow>,
    relationships: BTreeSet<RelationshipEdge>,
    info: BTreeMap<NameId, NameInfo>,
}

impl MemoryNameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, NamebaseError> {
        if !path.exists() {
            debug!(path = %path.display(), "name store not found; starting empty");
            return Ok(Self::new());
        }
        let raw = fs::read_to_string(path)?;
        let persisted: PersistedNameStore =
            serde_json::from_str(&raw).map_err(|err| NamebaseError::StoreFormat {
                path: path.to_path_buf(),
                details: err.to_string(),
            })?;
        if persisted.version != STORE_STATE_VERSION {
            return Err(NamebaseError::StoreFormat {
                path: path.to_path_buf(),
                details: format!(
                    "unsupported version {} (expected {STORE_STATE_VERSION})",
                    persisted.version
                ),
            });
        }

        let mut store = Self {
            categories: persisted.categories,
            memberships: persisted.memberships,
            languages: persisted.languages,
            relationships: persisted.relationships,
            info: persisted.info,
            ..Self::default()
        };
        for entry in persisted.names {
            if store.by_name.insert(entry.name.clone(), entry.id).is_some() {
                return Err(NamebaseError::StoreFormat {
                    path: path.to_path_buf(),
                    details: format!("duplicate name '{}'", entry.name),
                });
            }
            store.names.insert(entry.id, entry);
        }
        Ok(store)
    }

    /// Write the store to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), NamebaseError> {
        let persisted = PersistedNameStore {
            version: STORE_STATE_VERSION,
            names: self.names.values().cloned().collect(),
            categories: self.categories.clone(),
            memberships: self.memberships.clone(),
            languages: self.languages.clone(),
            relationships: self.relationships.clone(),
            info: self.info.clone(),
        };
        let raw =
            serde_json::to_vec_pretty(&persisted).map_err(|err| NamebaseError::StoreFormat {
                path: path.to_path_buf(),
                details: err.to_string(),
            })?;
        write_atomic(path, &raw)
    }

    /// Number of stored names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no names are stored.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn require_name(&self, id: NameId) -> Result<(), NamebaseError> {
        if self.names.contains_key(&id) {
            Ok(())
        } else {
            Err(NamebaseError::Store(format!("unknown name id {id}")))
        }
    }

    fn category_title(&self, id: CategoryId) -> Option<&CategoryName> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.categories.get_index(index)
    }
}

impl NameStore for MemoryNameStore {
    fn names_with_text(&self, filter: Option<&str>) -> Result<Vec<NameEntry>, NamebaseError> {
        let mut entries: Vec<NameEntry> = self
            .names
            .values()
            .filter(|entry| entry.wiki_text.is_some())
            .filter(|entry| filter.is_none_or(|name| entry.name == name))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn name_id(&self, name: &str) -> Option<NameId> {
        self.by_name.get(name).copied()
    }

    fn name_of(&self, id: NameId) -> Option<&str> {
        self.names.get(&id).map(|entry| entry.name.as_str())
    }

    fn categories_for(&self, id: NameId) -> Result<Vec<CategoryName>, NamebaseError> {
        self.require_name(id)?;
        self.memberships
            .range((id, CategoryId::MIN)..=(id, CategoryId::MAX))
            .map(|(_, category_id)| {
                self.category_title(*category_id).cloned().ok_or_else(|| {
                    NamebaseError::Store(format!("unknown category id {category_id}"))
                })
            })
            .collect()
    }

    fn insert_name(&mut self, name: &str, wiki_text: Option<&str>) -> Result<NameId, NamebaseError> {
        if name.is_empty() {
            return Err(NamebaseError::EmptyName);
        }
        if let Some(id) = self.by_name.get(name).copied() {
            if let Some(text) = wiki_text
                && let Some(entry) = self.names.get_mut(&id)
            {
                entry.wiki_text = Some(text.to_string());
            }
            return Ok(id);
        }
        let id = self.names.keys().next_back().map_or(1, |last| last + 1);
        self.names.insert(
            id,
            NameEntry {
                id,
                name: name.to_string(),
                wiki_text: wiki_text.map(str::to_string),
            },
        );
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    fn insert_category(&mut self, title: &str) -> Result<CategoryId, NamebaseError> {
        let (index, _) = self.categories.insert_full(title.to_string());
        Ok(index as CategoryId + 1)
    }

    fn add_membership(
        &mut self,
        name_id: NameId,
        category_id: CategoryId,
    ) -> Result<bool, NamebaseError> {
        self.require_name(name_id)?;
        if self.category_title(category_id).is_none() {
            return Err(NamebaseError::Store(format!(
                "unknown category id {category_id}"
            )));
        }
        Ok(self.memberships.insert((name_id, category_id)))
    }

    fn insert_language(
        &mut self,
        name_id: NameId,
        field: LanguageField,
        tag: &str,
    ) -> Result<bool, NamebaseError> {
        self.require_name(name_id)?;
        Ok(self.languages.insert(LanguageRow {
            name_id,
            field,
            tag: tag.to_string(),
        }))
    }

    fn insert_relationship(&mut self, edge: RelationshipEdge) -> Result<bool, NamebaseError> {
        if edge.is_self_edge() {
            return Err(NamebaseError::Store(format!(
                "refusing self-edge {:?} on name id {}",
                edge.relationship, edge.name_id
            )));
        }
        self.require_name(edge.name_id)?;
        self.require_name(edge.name_id2)?;
        Ok(self.relationships.insert(edge))
    }

    fn update_name_info(&mut self, name_id: NameId, info: NameInfo) -> Result<(), NamebaseError> {
        self.require_name(name_id)?;
        self.info.insert(name_id, info);
        Ok(())
    }

    fn languages(&self, name_id: NameId, field: LanguageField) -> Vec<LanguageTag> {
        self.languages
            .iter()
            .filter(|row| row.name_id == name_id && row.field == field)
            .map(|row| row.tag.clone())
            .collect()
    }

    fn relationships_from(&self, name_id: NameId) -> Vec<(Relationship, NameId)> {
        self.relationships
            .iter()
            .filter(|edge| edge.name_id == name_id)
            .map(|edge| (edge.relationship, edge.name_id2))
            .collect()
    }

    fn name_info(&self, name_id: NameId) -> Option<NameInfo> {
        self.info.get(&name_id).copied()
    }
}
