// crates/shelter-core/src/rank.rs

//! Distance ranking with a bounded top-N.
//!
//! Sort key is `(distance, ordinal)`: ties fall back to merge enumeration
//! order, so equal inputs always rank identically. Large candidate sets are
//! split into chunks on the rayon pool; every chunk keeps its own top-N and
//! the survivors are merged and truncated once more.

use crate::error::{Result, ShelterError};
use crate::geodesic::DistanceModel;
use crate::model::{GeoPoint, MergedRecord, RankedEntry, RankedResult};
use crate::proximity::classify;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;
const MIN_CHUNK_LEN: usize = 512;

/// A time budget that starts when it is created.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }

    pub fn check(&self) -> Result<()> {
        if self.is_expired() {
            Err(ShelterError::DeadlineExceeded {
                budget_ms: self.budget.as_millis(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    pub model: DistanceModel,
    /// Candidate count at which ranking moves onto the rayon pool.
    pub parallel_threshold: usize,
    pub deadline: Option<Deadline>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            model: DistanceModel::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            deadline: None,
        }
    }
}

impl RankOptions {
    fn check_deadline(&self) -> Result<()> {
        self.deadline.as_ref().map_or(Ok(()), Deadline::check)
    }
}

#[derive(Clone, Copy)]
struct Scored<'a> {
    distance_km: f64,
    record: &'a MergedRecord,
}

fn by_distance_then_ordinal(a: &Scored<'_>, b: &Scored<'_>) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then(a.record.ordinal.cmp(&b.record.ordinal))
}

fn top_of<'a>(
    chunk: &[&'a MergedRecord],
    point: GeoPoint,
    top_n: usize,
    model: DistanceModel,
) -> Vec<Scored<'a>> {
    let mut scored: Vec<Scored<'a>> = chunk
        .iter()
        .filter_map(|&record| {
            let location = record.location()?;
            Some(Scored {
                distance_km: model.distance_km(point, location),
                record,
            })
        })
        .collect();
    scored.sort_unstable_by(by_distance_then_ordinal);
    scored.truncate(top_n);
    scored
}

/// Up to `top_n` candidates closest to `point`, each with its proximity tier.
///
/// Candidates without a site are skipped. Fewer than `top_n` locatable
/// candidates yields all of them.
pub fn rank(
    candidates: &[&MergedRecord],
    point: GeoPoint,
    top_n: usize,
    options: &RankOptions,
) -> Result<RankedResult> {
    if top_n == 0 {
        return Err(ShelterError::invalid("top_n must be a positive integer"));
    }
    options.check_deadline()?;

    let best = if candidates.len() >= options.parallel_threshold {
        let chunk_len = candidates
            .len()
            .div_ceil(rayon::current_num_threads())
            .max(MIN_CHUNK_LEN);
        debug!(candidates = candidates.len(), chunk_len, "ranking in parallel");

        let partial = candidates
            .par_chunks(chunk_len)
            .map(|chunk| {
                options
                    .check_deadline()
                    .map(|()| top_of(chunk, point, top_n, options.model))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut merged: Vec<Scored<'_>> = partial.into_iter().flatten().collect();
        merged.sort_unstable_by(by_distance_then_ordinal);
        merged.truncate(top_n);
        merged
    } else {
        debug!(candidates = candidates.len(), "ranking sequentially");
        top_of(candidates, point, top_n, options.model)
    };
    options.check_deadline()?;

    let entries = best
        .into_iter()
        .filter_map(|s| s.record.to_shelter().map(|shelter| (shelter, s.distance_km)))
        .map(|(shelter, distance_km)| {
            classify(distance_km).map(|tier| RankedEntry {
                shelter,
                distance_km,
                tier,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RankedResult::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AcceptanceTag, CapabilityMap, Provenance, Site};
    use crate::proximity::ProximityTier;

    fn at(ordinal: usize, lat: f64, lon: f64) -> MergedRecord {
        MergedRecord {
            ordinal,
            key: Some(format!("k{ordinal}")),
            site: Some(Site {
                name: format!("Shelter {ordinal}"),
                address: String::new(),
                location: GeoPoint::new_unchecked(lat, lon),
                acceptance: AcceptanceTag::Unspecified,
            }),
            capabilities: CapabilityMap::new(),
            provenance: Provenance::single("facilities"),
        }
    }

    fn origin() -> GeoPoint {
        GeoPoint::new_unchecked(33.8117, 132.7789)
    }

    #[test]
    fn zero_top_n_is_invalid() {
        let records = [at(0, 33.8120, 132.7790)];
        let refs: Vec<&MergedRecord> = records.iter().collect();
        let err = rank(&refs, origin(), 0, &RankOptions::default()).unwrap_err();
        assert!(matches!(err, ShelterError::InvalidArgument(_)));
    }

    #[test]
    fn fewer_candidates_than_requested() {
        let records = [at(0, 33.8200, 132.7800), at(1, 33.8120, 132.7790)];
        let refs: Vec<&MergedRecord> = records.iter().collect();
        let result = rank(&refs, origin(), 5, &RankOptions::default()).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.entries()[0].shelter.name(), "Shelter 1");
        assert_eq!(result.entries()[0].tier, ProximityTier::Near);
        assert!(result.entries()[0].distance_km <= result.entries()[1].distance_km);
    }

    #[test]
    fn ties_keep_enumeration_order() {
        let records = [at(0, 33.82, 132.78), at(1, 33.82, 132.78), at(2, 33.82, 132.78)];
        let refs: Vec<&MergedRecord> = records.iter().rev().collect();
        let result = rank(&refs, origin(), 2, &RankOptions::default()).unwrap();

        let names: Vec<&str> = result.iter().map(|e| e.shelter.name()).collect();
        assert_eq!(names, ["Shelter 0", "Shelter 1"]);
    }

    #[test]
    fn records_without_site_are_skipped() {
        let mut orphan = at(0, 0.0, 0.0);
        orphan.site = None;
        let records = [orphan, at(1, 33.8120, 132.7790)];
        let refs: Vec<&MergedRecord> = records.iter().collect();
        let result = rank(&refs, origin(), 5, &RankOptions::default()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.entries()[0].shelter.key(), Some("k1"));
    }

    #[test]
    fn parallel_path_matches_sequential() {
        // deterministic scatter around Matsuyama, with duplicated points
        let records: Vec<MergedRecord> = (0..3000)
            .map(|i| {
                let j = (i * 7919) % 1000;
                at(i, 33.70 + j as f64 * 2.5e-4, 132.65 + ((j * 31) % 1000) as f64 * 2.5e-4)
            })
            .collect();
        let refs: Vec<&MergedRecord> = records.iter().collect();

        let sequential = RankOptions {
            parallel_threshold: usize::MAX,
            ..RankOptions::default()
        };
        let parallel = RankOptions {
            parallel_threshold: 1,
            ..RankOptions::default()
        };
        let a = rank(&refs, origin(), 25, &sequential).unwrap();
        let b = rank(&refs, origin(), 25, &parallel).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 25);
    }

    #[test]
    fn expired_deadline_discards_results() {
        let records = [at(0, 33.8120, 132.7790)];
        let refs: Vec<&MergedRecord> = records.iter().collect();
        let options = RankOptions {
            deadline: Some(Deadline::after(Duration::ZERO)),
            ..RankOptions::default()
        };
        let err = rank(&refs, origin(), 1, &options).unwrap_err();
        assert!(matches!(err, ShelterError::DeadlineExceeded { budget_ms: 0 }));
        assert!(err.is_query_error());
    }
}
