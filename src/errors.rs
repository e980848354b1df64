use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{FieldKey, SourceId};

/// Error type for merge conflicts, IO, and persistence failures.
#[derive(Debug, Error)]
pub enum NamebaseError {
    #[error("cannot merge {incoming} into {existing} for field '{field}'")]
    MergeConflict {
        field: FieldKey,
        existing: &'static str,
        incoming: &'static str,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("partition file '{}' is unusable: {details}", path.display())]
    PartitionFormat { path: PathBuf, details: String },
    #[error("name store '{}' is unusable: {details}", path.display())]
    StoreFormat { path: PathBuf, details: String },
    #[error("name store failure: {0}")]
    Store(String),
    #[error("names must be non-empty to be bucketed")]
    EmptyName,
    #[error("nickname source '{source_id}' could not be read: {details}")]
    SourceFormat { source_id: SourceId, details: String },
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl NamebaseError {
    /// Short stable label used when tallying per-name failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MergeConflict { .. } => "merge_conflict",
            Self::Io(_) => "io",
            Self::PartitionFormat { .. } => "partition_format",
            Self::StoreFormat { .. } => "store_format",
            Self::Store(_) => "store",
            Self::EmptyName => "empty_name",
            Self::SourceFormat { .. } => "source_format",
            Self::Configuration(_) => "configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_conflict_message_names_both_sides() {
        let err = NamebaseError::MergeConflict {
            field: "gender_flag".into(),
            existing: "flags",
            incoming: "set",
        };
        assert_eq!(
            err.to_string(),
            "cannot merge set into flags for field 'gender_flag'"
        );
        assert_eq!(err.kind(), "merge_conflict");
    }
}
