use std::collections::BTreeSet;

use tracing::warn;

use crate::errors::NamebaseError;
use crate::facts::FactRecord;
use crate::partition::PartitionStore;
use crate::source::Sources;
use crate::stats::Tally;
use crate::types::Name;
use crate::writer::{WriterReport, write_sorted};

/// Fold every source's records into the bucket partitions.
///
/// Each name's records are merged in source enumeration order before the
/// result is streamed through one writer pass. A name whose sources
/// disagree on a field type is dropped and tallied in the report.
pub fn integrate<P: PartitionStore>(
    sources: &Sources,
    partitions: P,
) -> Result<WriterReport, NamebaseError> {
    let names: BTreeSet<&Name> = sources.values().flat_map(|records| records.keys()).collect();
    let mut entries = Vec::with_capacity(names.len());
    let mut conflicts: Tally<(String, &'static str)> = Tally::default();
    for name in names {
        match merge_sources(sources, name) {
            Ok(record) => entries.push((name.clone(), record)),
            Err(err) => {
                warn!(name = %name, %err, "sources disagree");
                conflicts.add((err.to_string(), err.kind()));
            }
        }
    }
    let mut report = write_sorted(partitions, entries)?;
    report.errors.absorb(conflicts);
    Ok(report)
}

fn merge_sources(sources: &Sources, name: &str) -> Result<FactRecord, NamebaseError> {
    let mut merged = FactRecord::new();
    for records in sources.values() {
        if let Some(record) = records.get(name) {
            merged.merge(record)?;
        }
    }
    Ok(merged)
}
