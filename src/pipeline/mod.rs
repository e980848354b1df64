//! Pipeline stages: parse stored pages into facts, dump stored facts into
//! partitions, and integrate nickname sources into the same partitions.

/// Stored facts to partition files.
pub mod dump;
/// Nickname sources to partition files.
pub mod integrate;
/// Page text and categories to stored facts.
pub mod parse;

pub use dump::{record_for, run_dump};
pub use integrate::integrate;
pub use parse::{apply_facts, parse_name, run_parse};
