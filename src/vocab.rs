use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::NameId;

bitflags! {
    /// Gender bits accumulated across sources.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GenderFlag: u32 {
        const FEMALE = 1;
        const MALE = 2;
        const UNISEX = 4;
    }
}

impl GenderFlag {
    /// Parse a gender word such as `male` or `Female`.
    pub fn parse(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "female" => Some(Self::FEMALE),
            "male" => Some(Self::MALE),
            "unisex" => Some(Self::UNISEX),
            _ => None,
        }
    }
}

/// Directed relationship kind between two names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    IsShortFor = 1,
    OriginatesFrom = 2,
    IsAVariantOf = 3,
    IsEquivalentTo = 4,
    IsTransliteratedAs = 5,
}

impl Relationship {
    /// All kinds in code order.
    pub const ALL: [Relationship; 5] = [
        Relationship::IsShortFor,
        Relationship::OriginatesFrom,
        Relationship::IsAVariantOf,
        Relationship::IsEquivalentTo,
        Relationship::IsTransliteratedAs,
    ];

    /// Map an extracted template field onto a relationship kind.
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "var" | "varform" | "alt" => Some(Self::IsAVariantOf),
            "eq" => Some(Self::IsEquivalentTo),
            "dim" | "diminutive" => Some(Self::IsShortFor),
            "xlit" => Some(Self::IsTransliteratedAs),
            _ => None,
        }
    }

    /// Record field name used in partition files.
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::IsShortFor => "is_short_for",
            Self::OriginatesFrom => "originates_from",
            Self::IsAVariantOf => "is_a_variant_of",
            Self::IsEquivalentTo => "is_equivalent_to",
            Self::IsTransliteratedAs => "is_transliterated_as",
        }
    }

    /// Stable numeric code.
    pub const fn code(&self) -> u8 {
        *self as u8
    }
}

/// Directed, typed link between two stored names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub name_id: NameId,
    pub relationship: Relationship,
    pub name_id2: NameId,
}

impl RelationshipEdge {
    /// True when both ends are the same name.
    pub fn is_self_edge(&self) -> bool {
        self.name_id == self.name_id2
    }
}
