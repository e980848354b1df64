//! Fact sets, fact records, and their merge rules.
//!
//! Merging is associative and commutative for union and OR fields, so folding
//! sources in any order converges to the same record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::facts::GENDER_FLAG_FIELD;
use crate::errors::NamebaseError;
use crate::types::FieldKey;
use crate::vocab::GenderFlag;

/// A single field value in a fact record.
///
/// Serializes as an integer, a string, or a sorted sequence of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// Flag bits combined with bitwise OR.
    Flags(u32),
    /// A single string such as one language tag.
    Tag(String),
    /// A set of strings combined by union.
    Set(BTreeSet<String>),
}

impl FactValue {
    /// Short label used in conflict reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FactValue::Flags(_) => "flags",
            FactValue::Tag(_) => "tag",
            FactValue::Set(_) => "set",
        }
    }

    /// Build a set value from any string iterator.
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FactValue::Set(values.into_iter().map(Into::into).collect())
    }

    fn accepts(&self, incoming: &FactValue) -> bool {
        !matches!(
            (self, incoming),
            (FactValue::Flags(_), FactValue::Tag(_) | FactValue::Set(_))
                | (FactValue::Tag(_) | FactValue::Set(_), FactValue::Flags(_))
        )
    }

    /// Fold `incoming` into `self`. Callers must check `accepts` first.
    fn absorb(&mut self, incoming: &FactValue) {
        if let FactValue::Tag(tag) = self {
            if matches!(incoming, FactValue::Tag(other) if other == tag) {
                return;
            }
            let promoted = BTreeSet::from([std::mem::take(tag)]);
            *self = FactValue::Set(promoted);
        }
        match (self, incoming) {
            (FactValue::Flags(bits), FactValue::Flags(more)) => *bits |= *more,
            (FactValue::Set(set), FactValue::Set(more)) => set.extend(more.iter().cloned()),
            (FactValue::Set(set), FactValue::Tag(tag)) => {
                set.insert(tag.clone());
            }
            _ => unreachable!("rejected by accepts"),
        }
    }
}

/// Per-name mapping of field to value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FactRecord {
    fields: BTreeMap<FieldKey, FactValue>,
}

impl FactRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FactValue> {
        self.fields.get(field)
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FactValue)> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Gender bits stored in the record, empty when absent.
    pub fn gender(&self) -> GenderFlag {
        match self.fields.get(GENDER_FLAG_FIELD) {
            Some(FactValue::Flags(bits)) => GenderFlag::from_bits_truncate(*bits),
            _ => GenderFlag::empty(),
        }
    }

    /// Merge a single value into `field`.
    pub fn merge_value(
        &mut self,
        field: impl Into<FieldKey>,
        value: FactValue,
    ) -> Result<(), NamebaseError> {
        let field = field.into();
        match self.fields.get_mut(&field) {
            None => {
                self.fields.insert(field, value);
            }
            Some(existing) => {
                if !existing.accepts(&value) {
                    return Err(conflict(&field, existing, &value));
                }
                existing.absorb(&value);
            }
        }
        Ok(())
    }

    /// Add one string to the set stored under `field`.
    pub fn add_to_set(
        &mut self,
        field: impl Into<FieldKey>,
        value: impl Into<String>,
    ) -> Result<(), NamebaseError> {
        self.merge_value(field, FactValue::Set(BTreeSet::from([value.into()])))
    }

    /// OR gender bits into the `gender_flag` field.
    pub fn add_gender(&mut self, gender: GenderFlag) -> Result<(), NamebaseError> {
        self.merge_value(GENDER_FLAG_FIELD, FactValue::Flags(gender.bits()))
    }

    /// Merge `addition` into this record.
    ///
    /// Either every field merges or the record is left untouched: a type
    /// conflict on any field is reported before anything is written.
    pub fn merge(&mut self, addition: &FactRecord) -> Result<(), NamebaseError> {
        for (field, incoming) in &addition.fields {
            if let Some(existing) = self.fields.get(field)
                && !existing.accepts(incoming)
            {
                return Err(conflict(field, existing, incoming));
            }
        }
        for (field, incoming) in &addition.fields {
            match self.fields.get_mut(field) {
                Some(existing) => existing.absorb(incoming),
                None => {
                    self.fields.insert(field.clone(), incoming.clone());
                }
            }
        }
        Ok(())
    }
}

fn conflict(field: &str, existing: &FactValue, incoming: &FactValue) -> NamebaseError {
    NamebaseError::MergeConflict {
        field: field.to_string(),
        existing: existing.kind(),
        incoming: incoming.kind(),
    }
}

impl<'de> Deserialize<'de> for FactRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Fields written as null (or never written) are treated as absent.
        let raw = Option::<BTreeMap<FieldKey, Option<FactValue>>>::deserialize(deserializer)?;
        let fields = raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(field, value)| value.map(|value| (field, value)))
            .collect();
        Ok(Self { fields })
    }
}

impl FromIterator<(FieldKey, FactValue)> for FactRecord {
    fn from_iter<I: IntoIterator<Item = (FieldKey, FactValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Extracted facts keyed by `<source>.<field>`, each a set of strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactSet {
    facts: BTreeMap<FieldKey, BTreeSet<String>>,
}

impl FactSet {
    /// Create an empty fact set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value under `key`.
    pub fn add(&mut self, key: impl Into<FieldKey>, value: impl Into<String>) {
        self.facts.entry(key.into()).or_default().insert(value.into());
    }

    /// Union `other` into this set.
    pub fn absorb(&mut self, other: FactSet) {
        for (key, values) in other.facts {
            self.facts.entry(key).or_default().extend(values);
        }
    }

    /// Values under `key`.
    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.facts.get(key)
    }

    /// Iterate keys in order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &BTreeSet<String>)> {
        self.facts.iter()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// True when no facts were extracted.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl From<FactSet> for FactRecord {
    fn from(set: FactSet) -> Self {
        set.facts
            .into_iter()
            .map(|(key, values)| (key, FactValue::Set(values)))
            .collect()
    }
}

/// Split `given-name.from` into `("given-name", "from")`.
///
/// Keys without a source prefix come back with an empty source.
pub fn split_key(key: &str) -> (&str, &str) {
    key.split_once('.').unwrap_or(("", key))
}
