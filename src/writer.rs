//! Bucketed streaming writer.
//!
//! Names are fed in bucket-then-name order. Exactly one partition is resident
//! at a time: it is loaded lazily on the first name that maps into it, merged
//! into while the stream stays inside the bucket, and persisted the moment
//! the stream crosses into another bucket (or ends).

use std::collections::HashSet;

use tracing::{info, warn};

use crate::bucket::{Bucket, classify};
use crate::errors::NamebaseError;
use crate::facts::FactRecord;
use crate::partition::{PartitionData, PartitionStore};
use crate::stats::Tally;
use crate::types::Name;

/// Counters describing one writer pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriterReport {
    /// Records merged into partitions.
    pub names: usize,
    /// Partitions read back from the store.
    pub partitions_loaded: usize,
    /// Partitions started empty because nothing was stored yet.
    pub partitions_created: usize,
    /// Partition writes.
    pub partitions_stored: usize,
    /// Buckets entered again after having been flushed.
    pub revisited: usize,
    /// Records rejected by a merge conflict, by `(message, kind)`.
    pub errors: Tally<(String, &'static str)>,
}

struct ResidentPartition {
    bucket: Bucket,
    data: PartitionData,
}

/// Streams records into bucket partitions with one partition resident.
pub struct BucketedWriter<S: PartitionStore> {
    store: S,
    current: Option<ResidentPartition>,
    flushed: HashSet<Bucket>,
    report: WriterReport,
}

impl<S: PartitionStore> BucketedWriter<S> {
    /// Create a writer over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: None,
            flushed: HashSet::new(),
            report: WriterReport::default(),
        }
    }

    /// Bucket of the resident partition, if any.
    pub fn resident_bucket(&self) -> Option<Bucket> {
        self.current.as_ref().map(|partition| partition.bucket)
    }

    /// Counters so far.
    pub fn report(&self) -> &WriterReport {
        &self.report
    }

    /// Merge `record` into the stored record for `name`.
    ///
    /// A merge conflict leaves the stored record untouched and is returned to
    /// the caller; the writer itself stays usable.
    pub fn write(&mut self, name: &str, record: &FactRecord) -> Result<(), NamebaseError> {
        if name.is_empty() {
            return Err(NamebaseError::EmptyName);
        }
        let data = self.enter(classify(name), name)?;
        match data.get_mut(name) {
            Some(existing) => existing.merge(record)?,
            None => {
                data.insert(name.to_string(), record.clone());
            }
        }
        self.report.names += 1;
        Ok(())
    }

    /// Like `write`, but tallies merge conflicts instead of returning them.
    pub fn write_or_tally(&mut self, name: &str, record: &FactRecord) -> Result<(), NamebaseError> {
        match self.write(name, record) {
            Err(err @ NamebaseError::MergeConflict { .. }) => {
                warn!(name, %err, "skipping record");
                self.report.errors.add((err.to_string(), err.kind()));
                Ok(())
            }
            other => other,
        }
    }

    /// Persist and release the resident partition.
    pub fn flush(&mut self) -> Result<(), NamebaseError> {
        if let Some(partition) = self.current.take() {
            self.persist(partition)?;
        }
        Ok(())
    }

    /// Flush the final partition and return the pass counters.
    pub fn finish(mut self) -> Result<WriterReport, NamebaseError> {
        self.flush()?;
        Ok(self.report)
    }

    fn enter(&mut self, bucket: Bucket, name: &str) -> Result<&mut PartitionData, NamebaseError> {
        let partition = match self.current.take() {
            Some(partition) if partition.bucket == bucket => partition,
            previous => {
                if let Some(partition) = previous {
                    self.persist(partition)?;
                }
                self.load(bucket, name)?
            }
        };
        Ok(&mut self.current.insert(partition).data)
    }

    fn load(&mut self, bucket: Bucket, name: &str) -> Result<ResidentPartition, NamebaseError> {
        if self.flushed.contains(&bucket) {
            warn!(bucket = %bucket, name, "re-entering a flushed partition; input is not bucket-ordered");
            self.report.revisited += 1;
        }
        info!(bucket = %bucket, name, "switching partition");
        let data = match self.store.load(&bucket)? {
            Some(data) => {
                self.report.partitions_loaded += 1;
                data
            }
            None => {
                self.report.partitions_created += 1;
                PartitionData::new()
            }
        };
        Ok(ResidentPartition { bucket, data })
    }

    fn persist(&mut self, partition: ResidentPartition) -> Result<(), NamebaseError> {
        self.store.store(&partition.bucket, &partition.data)?;
        self.report.partitions_stored += 1;
        self.flushed.insert(partition.bucket);
        Ok(())
    }
}

/// Order names so every bucket is contiguous: bucket first, then
/// case-insensitive name, then the raw spelling as a tiebreak.
pub fn sort_for_streaming<T>(items: &mut [T], name_of: impl Fn(&T) -> &str) {
    items.sort_by_cached_key(|item| {
        let name = name_of(item);
        (classify(name), name.to_lowercase(), name.to_string())
    });
}

/// Sort `entries` for streaming and write them all through one writer pass.
///
/// Empty names are skipped; merge conflicts are tallied per name.
pub fn write_sorted<S, I>(store: S, entries: I) -> Result<WriterReport, NamebaseError>
where
    S: PartitionStore,
    I: IntoIterator<Item = (Name, FactRecord)>,
{
    let mut entries: Vec<(Name, FactRecord)> = entries
        .into_iter()
        .filter(|(name, _)| !name.is_empty())
        .collect();
    sort_for_streaming(&mut entries, |(name, _)| name.as_str());
    let mut writer = BucketedWriter::new(store);
    for (name, record) in &entries {
        writer.write_or_tally(name, record)?;
    }
    writer.finish()
}
