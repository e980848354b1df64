//! Cached nickname sources.
//!
//! Each source lives in its own directory under the cache root, one or more
//! raw files per source. Files are parsed into per-source record maps that
//! the integrate stage folds into the bucket partitions.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::errors::NamebaseError;
use crate::transport::fs::{FileStream, write_atomic};
use crate::types::SourceId;

/// Nickname list formats.
pub mod nicknames;

pub use nicknames::{NicknameFormat, SourceRecords};

/// Per-source snapshot written next to the raw files.
pub const COMMON_FILE_NAME: &str = "common.yaml";

/// Parsed sources in enumeration order.
pub type Sources = IndexMap<SourceId, SourceRecords>;

/// Raw files of every known source below `cache_root`, in source order.
///
/// Sources without a directory are left out; snapshot files are ignored.
pub fn discover(cache_root: &Path) -> IndexMap<NicknameFormat, Vec<PathBuf>> {
    NicknameFormat::ALL
        .into_iter()
        .filter_map(|format| {
            let files: Vec<PathBuf> = FileStream::new(cache_root.join(format.id()))
                .files()
                .into_iter()
                .filter(|path| path.file_name().is_none_or(|name| name != COMMON_FILE_NAME))
                .collect();
            if files.is_empty() {
                debug!(source = format.id(), "no cached files");
                None
            } else {
                Some((format, files))
            }
        })
        .collect()
}

/// Parse all cached sources below `cache_root`.
pub fn load_sources(cache_root: &Path) -> Result<Sources, NamebaseError> {
    let mut sources = Sources::new();
    for (format, files) in discover(cache_root) {
        let records = sources.entry(format.id().to_string()).or_default();
        let mut skipped = 0;
        for path in &files {
            let text = std::fs::read_to_string(path)?;
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| NamebaseError::SourceFormat {
                    source_id: format.id().to_string(),
                    details: format!("file name of {} is not UTF-8", path.display()),
                })?;
            skipped += format.parse_into(file_name, &text, records)?;
        }
        info!(
            source = format.id(),
            files = files.len(),
            names = records.len(),
            skipped,
            "parsed nickname source"
        );
    }
    Ok(sources)
}

/// Write each source's records as `<cache_root>/<source>/common.yaml`.
pub fn write_common(cache_root: &Path, sources: &Sources) -> Result<(), NamebaseError> {
    for (source_id, records) in sources {
        let yaml = serde_yml::to_string(records).map_err(|err| NamebaseError::SourceFormat {
            source_id: source_id.clone(),
            details: err.to_string(),
        })?;
        write_atomic(
            &cache_root.join(source_id).join(COMMON_FILE_NAME),
            yaml.as_bytes(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sources_load_in_enumeration_order_and_skip_snapshots() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("onyxrev")).unwrap();
        fs::create_dir_all(root.join("brianary")).unwrap();
        fs::write(root.join("onyxrev/nicknames.csv"), "id,name,nickname\n1,aaron,erin\n").unwrap();
        fs::write(root.join("brianary/nicknames.txt"), "Abigail\tAbby\n").unwrap();
        fs::write(root.join("brianary/common.yaml"), "not: [a, source").unwrap();

        let sources = load_sources(root).unwrap();
        let ids: Vec<&str> = sources.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["brianary", "onyxrev"]);
        assert!(sources["brianary"].contains_key("Abby"));
    }

    #[test]
    fn snapshots_are_written_per_source() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("brianary")).unwrap();
        fs::write(root.join("brianary/nicknames.txt"), "Abigail\tAbby\n").unwrap();
        let sources = load_sources(root).unwrap();
        write_common(root, &sources).unwrap();
        let yaml = fs::read_to_string(root.join("brianary").join(COMMON_FILE_NAME)).unwrap();
        assert!(yaml.contains("Abby"));
        assert!(yaml.contains("- Abigail"));
        assert_eq!(discover(root)[&NicknameFormat::Brianary].len(), 1);
    }
}
