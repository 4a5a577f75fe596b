// crates/shelter-core/src/merge.rs

//! Full outer join of the facilities table with the capability tables.
//!
//! Policy: every key from every input survives. A key known only to the
//! facilities side keeps `Unknown` for the hazards that only capability
//! sources supply; a key known only to a capability source becomes a record
//! without a site. Enumeration order is primary rows first (file order),
//! then capability-only rows (earlier sources first, file order).

use crate::error::{Result, ShelterError};
use crate::model::{MergedRecord, Provenance};
use crate::normalize::NormalizedTable;
use std::collections::HashMap;
use tracing::debug;

pub fn merge(primary: &NormalizedTable, secondaries: &[NormalizedTable]) -> Result<Vec<MergedRecord>> {
    ensure_unique_keys(primary)?;
    for table in secondaries {
        ensure_unique_keys(table)?;
    }

    let mut records: Vec<MergedRecord> = Vec::with_capacity(primary.rows.len());
    let mut by_key: HashMap<String, usize> = HashMap::with_capacity(primary.rows.len());

    for row in &primary.rows {
        if let Some(key) = &row.key {
            by_key.insert(key.clone(), records.len());
        }
        records.push(MergedRecord {
            ordinal: records.len(),
            key: row.key.clone(),
            site: row.site.clone(),
            capabilities: row.capabilities.clone(),
            provenance: Provenance::single(&primary.id),
        });
    }

    for table in secondaries {
        let mut joined = 0usize;
        let mut only_here = 0usize;
        for row in &table.rows {
            let existing = row.key.as_ref().and_then(|k| by_key.get(k)).copied();
            match existing {
                Some(idx) => {
                    let record = &mut records[idx];
                    record.capabilities.absorb(&row.capabilities);
                    record.provenance.push(&table.id);
                    if record.site.is_none() {
                        record.site = row.site.clone();
                    }
                    joined += 1;
                }
                None => {
                    if let Some(key) = &row.key {
                        by_key.insert(key.clone(), records.len());
                    }
                    records.push(MergedRecord {
                        ordinal: records.len(),
                        key: row.key.clone(),
                        site: row.site.clone(),
                        capabilities: row.capabilities.clone(),
                        provenance: Provenance::single(&table.id),
                    });
                    only_here += 1;
                }
            }
        }
        debug!(source = %table.id, joined, only_here, "merged capability source");
    }

    Ok(records)
}

/// Checks every row of the source, dropped ones included. Rows with an
/// absent key never collide.
fn ensure_unique_keys(table: &NormalizedTable) -> Result<()> {
    let kept = table
        .rows
        .iter()
        .filter_map(|row| row.key.as_deref().map(|key| (row.row, key)));
    let dropped = table.dropped_keys.iter().map(|(row, key)| (*row, key.as_str()));

    let mut seen: HashMap<&str, usize> =
        HashMap::with_capacity(table.rows.len() + table.dropped_keys.len());
    for (row, key) in kept.chain(dropped) {
        if seen.insert(key, row).is_some() {
            return Err(ShelterError::AmbiguousKey {
                key: key.to_owned(),
                dataset: table.id.clone(),
            });
        }
    }
    Ok(())
}
