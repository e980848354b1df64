use crate::constants::facts::GENDER_FLAG_FIELD;
use crate::errors::NamebaseError;
use crate::facts::{FactRecord, FactValue};
use crate::partition::PartitionStore;
use crate::store::{LanguageField, NameEntry, NameStore};
use crate::writer::{WriterReport, write_sorted};

/// Build the partition record for one stored name.
///
/// Holds `gender_flag` when non-zero, one set of target names per
/// relationship kind, and `lang`/`origin` tag sets.
pub fn record_for<S: NameStore + ?Sized>(
    store: &S,
    entry: &NameEntry,
) -> Result<FactRecord, NamebaseError> {
    let mut record = FactRecord::new();
    if let Some(info) = store.name_info(entry.id)
        && info.gender_flag != 0
    {
        record.merge_value(GENDER_FLAG_FIELD, FactValue::Flags(info.gender_flag))?;
    }
    for (relationship, target_id) in store.relationships_from(entry.id) {
        let target = store.name_of(target_id).ok_or_else(|| {
            NamebaseError::Store(format!(
                "relationship from '{}' points at unknown name id {target_id}",
                entry.name
            ))
        })?;
        record.add_to_set(relationship.field_name(), target)?;
    }
    for field in [LanguageField::Lang, LanguageField::Origin] {
        for tag in store.languages(entry.id, field) {
            record.add_to_set(field.field_name(), tag)?;
        }
    }
    Ok(record)
}

/// Stream every name with page text into the bucket partitions.
pub fn run_dump<S, P>(store: &S, partitions: P) -> Result<WriterReport, NamebaseError>
where
    S: NameStore + ?Sized,
    P: PartitionStore,
{
    let entries = store
        .names_with_text(None)?
        .into_iter()
        .map(|entry| record_for(store, &entry).map(|record| (entry.name, record)))
        .collect::<Result<Vec<_>, _>>()?;
    write_sorted(partitions, entries)
}
