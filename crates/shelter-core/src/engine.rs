// crates/shelter-core/src/engine.rs

//! Query facade: point + optional hazard/level → ranked nearest shelters.

use crate::common::SnapshotStats;
use crate::config::{EngineConfig, RankingConfig};
use crate::error::{Result, ShelterError};
use crate::filter::{filter, AcceptanceFilter};
use crate::model::{CapabilityLevel, GeoPoint, HazardType, MergedRecord, QueryOutcome, ShelterRecord};
use crate::rank::{rank, Deadline, RankOptions};
use crate::store::{BoundSource, ShelterDb, ShelterStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One nearest-shelter request.
///
/// ```rust
/// use shelter_core::{CapabilityLevel, HazardType, ShelterQuery};
///
/// let q = ShelterQuery::new(33.8117, 132.7789)
///     .hazard(HazardType::Earthquake)
///     .level(CapabilityLevel::Full)
///     .top_n(3);
/// assert_eq!(q.requested_top_n(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ShelterQuery {
    latitude: f64,
    longitude: f64,
    hazard: Option<HazardType>,
    level: Option<CapabilityLevel>,
    top_n: Option<usize>,
    acceptance: AcceptanceFilter,
    budget: Option<Duration>,
}

impl ShelterQuery {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            hazard: None,
            level: None,
            top_n: None,
            acceptance: AcceptanceFilter::Any,
            budget: None,
        }
    }

    pub fn hazard(mut self, hazard: HazardType) -> Self {
        self.hazard = Some(hazard);
        self
    }

    pub fn level(mut self, level: CapabilityLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Overrides `ranking.default_top_n`.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    pub fn acceptance(mut self, acceptance: AcceptanceFilter) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Time budget for the whole query, measured from [`ShelterEngine::query`].
    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn requested_top_n(&self) -> Option<usize> {
        self.top_n
    }
}

#[derive(Debug)]
pub struct ShelterEngine {
    store: ShelterStore,
    ranking: RankingConfig,
}

impl ShelterEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let mut store = ShelterStore::new(config.bind_sources())?;
        if let Some(path) = &config.cache.path {
            store = store.with_cache(path);
        }
        Ok(Self {
            store,
            ranking: config.ranking,
        })
    }

    pub fn from_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(EngineConfig::from_path(path)?)
    }

    /// Engine over arbitrary sources (in-memory tables, custom readers).
    pub fn with_sources(sources: Vec<BoundSource>, ranking: RankingConfig) -> Result<Self> {
        Ok(Self {
            store: ShelterStore::new(sources)?,
            ranking,
        })
    }

    pub fn ranking(&self) -> &RankingConfig {
        &self.ranking
    }

    pub fn snapshot(&self) -> Result<Arc<ShelterDb>> {
        self.store.snapshot()
    }

    pub fn stats(&self) -> Result<SnapshotStats> {
        Ok(self.snapshot()?.stats())
    }

    pub fn find_by_name(&self, query: &str) -> Result<Vec<ShelterRecord>> {
        Ok(self.snapshot()?.find_by_name(query))
    }

    /// Up to `top_n` shelters nearest to (`latitude`, `longitude`).
    ///
    /// With both `hazard` and `level` given, only shelters whose capability
    /// for that hazard is exactly `level` are considered. An empty candidate
    /// set is [`QueryOutcome::NoMatch`], not an error.
    pub fn find_nearest(
        &self,
        latitude: f64,
        longitude: f64,
        hazard: Option<HazardType>,
        level: Option<CapabilityLevel>,
        top_n: usize,
    ) -> Result<QueryOutcome> {
        let mut query = ShelterQuery::new(latitude, longitude).top_n(top_n);
        query.hazard = hazard;
        query.level = level;
        self.query(&query)
    }

    pub fn query(&self, query: &ShelterQuery) -> Result<QueryOutcome> {
        let deadline = query.budget.map(Deadline::after);
        let point = GeoPoint::new(query.latitude, query.longitude)?;
        let top_n = query.top_n.unwrap_or(self.ranking.default_top_n);
        if top_n == 0 {
            return Err(ShelterError::invalid("top_n must be a positive integer"));
        }

        let db = self.snapshot()?;
        let candidates: Vec<&MergedRecord> = filter(db.records(), query.hazard, query.level)
            .into_iter()
            .filter(|r| query.acceptance.admits(r))
            .collect();
        debug!(
            candidates = candidates.len(),
            hazard = ?query.hazard,
            level = ?query.level,
            top_n,
            "ranking candidates"
        );

        let options = RankOptions {
            model: self.ranking.distance_model,
            parallel_threshold: self.ranking.parallel_threshold,
            deadline,
        };
        let ranked = rank(&candidates, point, top_n, &options)?;
        Ok(QueryOutcome::from_ranked(ranked))
    }
}
