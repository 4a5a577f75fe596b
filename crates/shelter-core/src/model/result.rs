// crates/shelter-core/src/model/result.rs
use super::record::ShelterRecord;
use crate::proximity::ProximityTier;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub shelter: ShelterRecord,
    pub distance_km: f64,
    pub tier: ProximityTier,
}

/// Entries ordered by ascending distance; ties keep merge enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResult {
    entries: Vec<RankedEntry>,
}

impl RankedResult {
    pub(crate) fn new(entries: Vec<RankedEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntry> {
        self.entries.iter()
    }

    pub fn nearest(&self) -> Option<&RankedEntry> {
        self.entries.first()
    }
}

impl IntoIterator for RankedResult {
    type Item = RankedEntry;
    type IntoIter = std::vec::IntoIter<RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a RankedEntry;
    type IntoIter = std::slice::Iter<'a, RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Outcome of a successful query.
///
/// `NoMatch` is a normal answer ("no matching shelter found"), never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum QueryOutcome {
    Matches(RankedResult),
    NoMatch,
}

impl QueryOutcome {
    pub(crate) fn from_ranked(result: RankedResult) -> Self {
        if result.is_empty() {
            QueryOutcome::NoMatch
        } else {
            QueryOutcome::Matches(result)
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, QueryOutcome::NoMatch)
    }

    /// Ranked entries; empty for `NoMatch`.
    pub fn entries(&self) -> &[RankedEntry] {
        match self {
            QueryOutcome::Matches(r) => r.entries(),
            QueryOutcome::NoMatch => &[],
        }
    }
}
