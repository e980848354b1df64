//! Language-name to language-tag resolution.
//!
//! The built-in table is embedded at compile time and parsed on first use.
//! Extra tables can be layered on top from YAML files with the same layout.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::errors::NamebaseError;
use crate::types::LanguageTag;

/// Raw built-in table, embedded at compile time.
pub static LANGUAGES_YAML: &str = include_str!("languages.yaml");

static BUILTIN: LazyLock<LanguageTable> = LazyLock::new(|| {
    LanguageTable::from_yaml_str(LANGUAGES_YAML).expect("languages.yaml must parse")
});

/// Returned when text does not name a known language.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown language '{0}'")]
pub struct LanguageNotFound(pub String);

/// Resolves free-form language names to tags.
pub trait LanguageResolver {
    /// Resolve `text` (a language name or a known tag) to a tag.
    fn resolve(&self, text: &str) -> Result<LanguageTag, LanguageNotFound>;
}

#[derive(Deserialize)]
struct RawLanguageTable {
    languages: IndexMap<LanguageTag, Vec<String>>,
}

/// Table-backed resolver matching names case-insensitively and tags exactly.
#[derive(Clone, Debug, Default)]
pub struct LanguageTable {
    by_name: HashMap<String, LanguageTag>,
    tags: HashSet<LanguageTag>,
}

impl LanguageTable {
    /// The embedded table.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Parse a table from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, NamebaseError> {
        let raw: RawLanguageTable = serde_yml::from_str(yaml).map_err(|err| {
            NamebaseError::Configuration(format!("invalid language table: {err}"))
        })?;
        let mut table = Self::default();
        for (tag, names) in raw.languages {
            for name in names {
                table.insert(tag.clone(), &name);
            }
            table.tags.insert(tag);
        }
        Ok(table)
    }

    /// Load a table from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, NamebaseError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Register `name` as another spelling of `tag`.
    pub fn insert(&mut self, tag: impl Into<LanguageTag>, name: &str) {
        let tag = tag.into();
        self.by_name.insert(name.trim().to_lowercase(), tag.clone());
        self.tags.insert(tag);
    }

    /// Layer `other` on top of this table; its names win on collision.
    pub fn extend(&mut self, other: LanguageTable) {
        self.by_name.extend(other.by_name);
        self.tags.extend(other.tags);
    }

    /// Number of known names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when no names are known.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl LanguageResolver for LanguageTable {
    fn resolve(&self, text: &str) -> Result<LanguageTag, LanguageNotFound> {
        let trimmed = text.trim();
        if let Some(tag) = self.by_name.get(&trimmed.to_lowercase()) {
            return Ok(tag.clone());
        }
        if self.tags.contains(trimmed) {
            return Ok(trimmed.to_string());
        }
        Err(LanguageNotFound(trimmed.to_string()))
    }
}
