use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::NamebaseError;

/// Filesystem walk over the regular files below a root, in path order.
pub struct FileStream {
    root: PathBuf,
}

impl FileStream {
    /// Create a stream rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Regular, non-hidden files sorted by path. A missing root yields nothing.
    pub fn files(&self) -> Vec<PathBuf> {
        if !self.root.exists() {
            return Vec::new();
        }
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| !is_hidden(path))
            .collect()
    }
}

/// True if the file name starts with a dot.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<(), NamebaseError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Replace `path` with `contents` via a sibling temp file and rename, so an
/// interrupted write never leaves a truncated file behind.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), NamebaseError> {
    ensure_parent_dir(path)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn files_are_sorted_and_skip_hidden_entries() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("meranda")).unwrap();
        fs::write(root.join("meranda/nicknames.txt"), "x").unwrap();
        fs::write(root.join("brianary.txt"), "x").unwrap();
        fs::write(root.join(".DS_Store"), "x").unwrap();

        let files = FileStream::new(root).files();
        let names: Vec<String> = files
            .iter()
            .map(|path| {
                path.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["brianary.txt", "meranda/nicknames.txt"]);
    }

    #[test]
    fn missing_roots_yield_no_files() {
        let temp = tempdir().unwrap();
        assert!(FileStream::new(temp.path().join("absent")).files().is_empty());
    }

    #[test]
    fn atomic_writes_create_parents_and_replace() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data/Latin_A.yaml");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp.path().join("data/Latin_A.yaml.tmp").exists());
    }
}
