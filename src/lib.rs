#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Name-to-bucket classification.
pub mod bucket;
/// Command-line driver.
pub mod cli;
/// Pipeline locations and switches.
pub mod config;
/// Centralized constants used across classification, extraction, and storage.
pub mod constants;
/// Fact extraction from categories and page markup.
pub mod extract;
/// Fact records and merge rules.
pub mod facts;
/// Language-name resolution.
pub mod language;
/// Bucket partition files.
pub mod partition;
/// Parse, dump, and integrate stages.
pub mod pipeline;
/// Cached nickname sources.
pub mod source;
/// Run statistics and tallies.
pub mod stats;
/// Name store interface and in-memory implementation.
pub mod store;
/// Filesystem transport used by sources and partitions.
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;
/// Gender flags and relationship kinds.
pub mod vocab;
/// Bucketed streaming writer.
pub mod writer;

mod errors;

pub use bucket::{Bucket, classify};
pub use config::PipelineConfig;
pub use errors::NamebaseError;
pub use extract::extract;
pub use facts::{FactRecord, FactSet, FactValue};
pub use language::{LanguageNotFound, LanguageResolver, LanguageTable};
pub use partition::{PartitionData, PartitionStore, YamlPartitionStore};
pub use source::{NicknameFormat, SourceRecords, Sources};
pub use stats::{RunStats, SoftMiss, Tally};
pub use store::{LanguageField, MemoryNameStore, NameEntry, NameInfo, NameStore};
pub use types::{CategoryId, CategoryName, FieldKey, LanguageTag, Name, NameId, SourceId};
pub use vocab::{GenderFlag, Relationship, RelationshipEdge};
pub use writer::{BucketedWriter, WriterReport, sort_for_streaming, write_sorted};
