// crates/shelter-core/src/filter.rs
use crate::model::{AcceptanceTag, CapabilityLevel, HazardType, MergedRecord};
use crate::traits::NameMatch;
use serde::{Deserialize, Serialize};

/// Records whose capability for `hazard` is exactly `level`.
///
/// Filtering only happens when both are given; with either one missing
/// every record passes. An empty result is a normal outcome.
pub fn filter<'a>(
    records: &'a [MergedRecord],
    hazard: Option<HazardType>,
    level: Option<CapabilityLevel>,
) -> Vec<&'a MergedRecord> {
    match (hazard, level) {
        (Some(hazard), Some(level)) => records
            .iter()
            .filter(|r| r.capability(hazard) == level)
            .collect(),
        _ => records.iter().collect(),
    }
}

/// Which acceptance classes a query admits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceFilter {
    #[default]
    Any,
    /// Drops shelters reserved for people needing special care (要配慮者).
    ExcludeRestricted,
}

impl AcceptanceFilter {
    pub fn admits(self, record: &MergedRecord) -> bool {
        match self {
            AcceptanceFilter::Any => true,
            AcceptanceFilter::ExcludeRestricted => record.acceptance() != AcceptanceTag::Restricted,
        }
    }
}

/// Locatable records whose name contains `query`, either literally or after
/// case/accent folding. A blank query matches nothing.
pub fn find_by_name<'a>(records: &'a [MergedRecord], query: &str) -> Vec<&'a MergedRecord> {
    let q = query.trim();
    if q.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.site.is_some())
        .filter(|r| r.name_str().contains(q) || r.name_contains(q))
        .collect()
}
