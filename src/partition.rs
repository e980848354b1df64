//! Partition file persistence.
//!
//! One file per bucket holds a mapping of name to fact record. Sets are
//! written as sorted sequences; null or missing fields read back as absent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::bucket::Bucket;
use crate::errors::NamebaseError;
use crate::facts::FactRecord;
use crate::transport::fs::write_atomic;
use crate::types::Name;

/// In-memory contents of one partition, ordered by name.
pub type PartitionData = BTreeMap<Name, FactRecord>;

/// Load/store interface for bucket partitions.
pub trait PartitionStore {
    /// Load the partition for `bucket`, or `None` if it was never written.
    fn load(&mut self, bucket: &Bucket) -> Result<Option<PartitionData>, NamebaseError>;
    /// Persist `data` as the full contents of the partition for `bucket`.
    fn store(&mut self, bucket: &Bucket, data: &PartitionData) -> Result<(), NamebaseError>;
}

impl<S: PartitionStore + ?Sized> PartitionStore for &mut S {
    fn load(&mut self, bucket: &Bucket) -> Result<Option<PartitionData>, NamebaseError> {
        (**self).load(bucket)
    }

    fn store(&mut self, bucket: &Bucket, data: &PartitionData) -> Result<(), NamebaseError> {
        (**self).store(bucket, data)
    }
}

/// YAML partition files under a root directory.
#[derive(Clone, Debug)]
pub struct YamlPartitionStore {
    root: PathBuf,
    extension: String,
}

impl YamlPartitionStore {
    /// Store partitions as `<root>/<Label>_<Label>.<extension>`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Directory holding the partition files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `bucket`.
    pub fn path_for(&self, bucket: &Bucket) -> PathBuf {
        self.root.join(bucket.file_name(&self.extension))
    }

    /// Parse partition YAML; empty documents are empty partitions.
    pub fn parse(path: &Path, yaml: &str) -> Result<PartitionData, NamebaseError> {
        if yaml.trim().is_empty() {
            return Ok(PartitionData::new());
        }
        let parsed: Option<PartitionData> =
            serde_yml::from_str(yaml).map_err(|err| NamebaseError::PartitionFormat {
                path: path.to_path_buf(),
                details: err.to_string(),
            })?;
        Ok(parsed.unwrap_or_default())
    }
}

impl PartitionStore for YamlPartitionStore {
    fn load(&mut self, bucket: &Bucket) -> Result<Option<PartitionData>, NamebaseError> {
        let path = self.path_for(bucket);
        if !path.exists() {
            return Ok(None);
        }
        let yaml = std::fs::read_to_string(&path)?;
        Self::parse(&path, &yaml).map(Some)
    }

    fn store(&mut self, bucket: &Bucket, data: &PartitionData) -> Result<(), NamebaseError> {
        let path = self.path_for(bucket);
        let yaml = serde_yml::to_string(data).map_err(|err| NamebaseError::PartitionFormat {
            path: path.clone(),
            details: err.to_string(),
        })?;
        write_atomic(&path, yaml.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactValue;
    use tempfile::tempdir;

    fn latin(letter: &'static str) -> Bucket {
        Bucket::Letter {
            alphabet: "Latin",
            letter,
        }
    }

    #[test]
    fn missing_partitions_load_as_none() {
        let temp = tempdir().unwrap();
        let mut store = YamlPartitionStore::new(temp.path(), "yaml");
        assert!(store.load(&latin("A")).unwrap().is_none());
    }

    #[test]
    fn partitions_round_trip_through_files() {
        let temp = tempdir().unwrap();
        let mut store = YamlPartitionStore::new(temp.path(), "yaml");
        let mut record = FactRecord::new();
        record
            .merge_value("is_short_for", FactValue::set(["Annabel", "Anne"]))
            .unwrap();
        record.merge_value("gender_flag", FactValue::Flags(1)).unwrap();
        let data = PartitionData::from([("Ann".to_string(), record)]);

        store.store(&latin("A"), &data).unwrap();
        assert!(temp.path().join("Latin_A.yaml").exists());
        assert_eq!(store.load(&latin("A")).unwrap(), Some(data));
    }

    #[test]
    fn null_records_and_empty_files_load_cleanly() {
        let path = Path::new("Other.yaml");
        assert!(YamlPartitionStore::parse(path, "").unwrap().is_empty());
        let data = YamlPartitionStore::parse(path, "Anna:\nBoris:\n  lang: [ru]\n").unwrap();
        assert!(data["Anna"].is_empty());
        assert_eq!(data["Boris"].get("lang"), Some(&FactValue::set(["ru"])));
    }

    #[test]
    fn unreadable_yaml_is_a_partition_error() {
        let err = YamlPartitionStore::parse(Path::new("Other.yaml"), "- just\n- a list\n")
            .unwrap_err();
        assert_eq!(err.kind(), "partition_format");
    }
}
