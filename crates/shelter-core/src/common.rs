use serde::{Deserialize, Serialize};

/// Aggregate counts for one shelter snapshot.
///
/// Returned by [`crate::ShelterDb::stats`]; reflects the merged records after
/// invalid facility rows were dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    /// Every record of the outer join.
    pub records: usize,
    /// Records with a site (name and coordinates); only these are ranked.
    pub locatable: usize,
    /// Records carrying a join key.
    pub keyed: usize,
    pub sources: usize,
    /// Facility rows dropped during normalization.
    pub dropped_rows: usize,
}
