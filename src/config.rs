use std::path::{Path, PathBuf};

use crate::constants::config::{
    DEFAULT_CACHE_ROOT, DEFAULT_DATA_ROOT, DEFAULT_PARTITION_EXTENSION, DEFAULT_STORE_PATH,
};
use crate::errors::NamebaseError;
use crate::language::LanguageTable;
use crate::partition::YamlPartitionStore;

/// Locations and switches shared by every pipeline stage.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Directory holding the bucket partition files.
    pub data_root: PathBuf,
    /// Directory holding cached nickname source files, one sub-directory per source.
    pub cache_root: PathBuf,
    /// JSON file backing the name store.
    pub store_path: PathBuf,
    /// Partition file extension, without the dot.
    pub partition_extension: String,
    /// Extra language-name table layered over the built-in one.
    pub language_table: Option<PathBuf>,
    /// Restrict parsing to this one name.
    pub name_filter: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            cache_root: PathBuf::from(DEFAULT_CACHE_ROOT),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            partition_extension: DEFAULT_PARTITION_EXTENSION.to_string(),
            language_table: None,
            name_filter: None,
        }
    }
}

impl PipelineConfig {
    /// Set the partition directory.
    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    /// Set the nickname cache directory.
    pub fn with_cache_root(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    /// Set the name store file.
    pub fn with_store_path(mut self, store_path: impl Into<PathBuf>) -> Self {
        self.store_path = store_path.into();
        self
    }

    /// Set the partition file extension.
    pub fn with_partition_extension(mut self, extension: impl Into<String>) -> Self {
        self.partition_extension = extension.into();
        self
    }

    /// Layer an extra language table from a YAML file.
    pub fn with_language_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.language_table = Some(path.into());
        self
    }

    /// Parse only `name`.
    pub fn with_name_filter(mut self, name: impl Into<String>) -> Self {
        self.name_filter = Some(name.into());
        self
    }

    /// Reject settings no stage can work with.
    pub fn validate(&self) -> Result<(), NamebaseError> {
        let extension = self.partition_extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(NamebaseError::Configuration(
                "partition extension must not be empty".into(),
            ));
        }
        if self.name_filter.as_deref().is_some_and(str::is_empty) {
            return Err(NamebaseError::Configuration(
                "name filter must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Partition store rooted at `data_root`.
    pub fn partition_store(&self) -> YamlPartitionStore {
        YamlPartitionStore::new(
            &self.data_root,
            self.partition_extension.trim_start_matches('.'),
        )
    }

    /// Built-in language table, extended by `language_table` when set.
    pub fn languages(&self) -> Result<LanguageTable, NamebaseError> {
        let mut table = LanguageTable::builtin();
        if let Some(path) = &self.language_table {
            table.extend(LanguageTable::from_path(path)?);
        }
        Ok(table)
    }

    /// Name store file.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}
