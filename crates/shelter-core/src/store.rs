// crates/shelter-core/src/store.rs

//! # Snapshot Store
//!
//! Owns the configured sources and the current [`ShelterDb`]. A snapshot is
//! immutable once built and shared as `Arc<ShelterDb>`; queries run on the
//! `Arc` they cloned, without holding any lock.
//!
//! Freshness is keyed on the list of [`DatasetVersion`]s. When a source
//! reports a new version the next [`ShelterStore::snapshot`] call rebuilds
//! off-lock and swaps the `Arc` in one assignment. A failed rebuild returns
//! its error and leaves the previous snapshot in place.
//!
//! The on-disk cache also records the [`SourceSpec`]s it was built with; a
//! cached snapshot is reused only when both the versions and the specs match.

use crate::common::SnapshotStats;
use crate::error::{Result, ShelterError};
use crate::filter::find_by_name;
use crate::loader::{Dataset, DatasetVersion};
use crate::merge::merge;
use crate::model::{MergedRecord, ShelterRecord};
use crate::normalize::{normalize, NormalizedTable, RowIssue};
use crate::schema::{SourceRole, SourceSpec};
use crate::traits::TableSource;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(feature = "compact")]
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

/// The merged, immutable shelter database for one set of source versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterDb {
    records: Vec<MergedRecord>,
    versions: Vec<DatasetVersion>,
    specs: Vec<SourceSpec>,
    issues: Vec<RowIssue>,
}

impl ShelterDb {
    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    pub fn versions(&self) -> &[DatasetVersion] {
        &self.versions
    }

    /// Source declarations this snapshot was built with.
    pub fn specs(&self) -> &[SourceSpec] {
        &self.specs
    }

    /// Facility rows dropped while building this snapshot.
    pub fn issues(&self) -> &[RowIssue] {
        &self.issues
    }

    pub fn get_by_key(&self, key: &str) -> Option<&MergedRecord> {
        self.records.iter().find(|r| r.key() == Some(key))
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            records: self.records.len(),
            locatable: self.records.iter().filter(|r| r.site.is_some()).count(),
            keyed: self.records.iter().filter(|r| r.key.is_some()).count(),
            sources: self.versions.len(),
            dropped_rows: self.issues.len(),
        }
    }

    pub fn find_by_name(&self, query: &str) -> Vec<ShelterRecord> {
        find_by_name(&self.records, query)
            .into_iter()
            .filter_map(MergedRecord::to_shelter)
            .collect()
    }
}

/// A source declaration bound to where its rows come from.
#[derive(Clone)]
pub struct BoundSource {
    pub spec: SourceSpec,
    pub source: Arc<dyn TableSource>,
}

impl BoundSource {
    pub fn new(spec: SourceSpec, source: impl TableSource + 'static) -> Self {
        Self {
            spec,
            source: Arc::new(source),
        }
    }
}

impl std::fmt::Debug for BoundSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundSource")
            .field("id", &self.spec.id)
            .field("role", &self.spec.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ShelterStore {
    /// Facilities source first, then capability sources in declaration order.
    sources: Vec<BoundSource>,
    cache_path: Option<PathBuf>,
    current: RwLock<Option<Arc<ShelterDb>>>,
    rebuild: Mutex<()>,
}

impl ShelterStore {
    /// Requires exactly one facilities source; source ids must be unique.
    pub fn new(sources: Vec<BoundSource>) -> Result<Self> {
        for bound in &sources {
            bound.spec.validate()?;
        }
        for (i, bound) in sources.iter().enumerate() {
            if sources[..i].iter().any(|b| b.spec.id == bound.spec.id) {
                return Err(ShelterError::Config(format!(
                    "source id `{}` is declared twice",
                    bound.spec.id
                )));
            }
        }

        let (mut ordered, secondaries): (Vec<_>, Vec<_>) = sources
            .into_iter()
            .partition(|b| b.spec.role == SourceRole::Facilities);
        if ordered.len() != 1 {
            return Err(ShelterError::Config(format!(
                "expected exactly one facilities source, found {}",
                ordered.len()
            )));
        }
        ordered.extend(secondaries);

        Ok(Self {
            sources: ordered,
            cache_path: None,
            current: RwLock::new(None),
            rebuild: Mutex::new(()),
        })
    }

    /// Persists built snapshots at `path` and reuses them across processes
    /// while the source versions are unchanged.
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn sources(&self) -> &[BoundSource] {
        &self.sources
    }

    /// Current source versions, one stat per source.
    pub fn versions(&self) -> Result<Vec<DatasetVersion>> {
        self.sources.iter().map(|b| b.source.version()).collect()
    }

    /// The snapshot for the current source versions, rebuilt if stale.
    pub fn snapshot(&self) -> Result<Arc<ShelterDb>> {
        let versions = self.versions()?;
        if let Some(db) = self.current_for(&versions) {
            return Ok(db);
        }

        // one rebuild at a time; readers of the old snapshot are not blocked
        let _guard = self.rebuild.lock();
        if let Some(db) = self.current_for(&versions) {
            return Ok(db);
        }

        let db = Arc::new(self.load_or_build(versions)?);
        *self.current.write() = Some(Arc::clone(&db));
        Ok(db)
    }

    fn current_for(&self, versions: &[DatasetVersion]) -> Option<Arc<ShelterDb>> {
        self.current
            .read()
            .as_ref()
            .filter(|db| db.versions == versions)
            .map(Arc::clone)
    }

    fn load_or_build(&self, versions: Vec<DatasetVersion>) -> Result<ShelterDb> {
        if let Some(path) = &self.cache_path {
            match read_snapshot(path) {
                Ok(db) if db.versions == versions && self.matches_specs(&db) => {
                    debug!(path = %path.display(), "snapshot cache hit");
                    return Ok(db);
                }
                Ok(_) => debug!(path = %path.display(), "snapshot cache stale"),
                Err(e) => debug!(path = %path.display(), error = %e, "snapshot cache miss"),
            }
        }

        let db = self.build(versions)?;

        if let Some(path) = &self.cache_path {
            if let Err(e) = write_snapshot(path, &db) {
                warn!(path = %path.display(), error = %e, "could not write snapshot cache");
            }
        }
        Ok(db)
    }

    fn matches_specs(&self, db: &ShelterDb) -> bool {
        db.specs.len() == self.sources.len()
            && db.specs.iter().zip(&self.sources).all(|(s, b)| *s == b.spec)
    }

    fn build(&self, versions: Vec<DatasetVersion>) -> Result<ShelterDb> {
        let mut tables: Vec<NormalizedTable> = Vec::with_capacity(self.sources.len());
        for bound in &self.sources {
            let dataset = Dataset::load(&bound.spec, bound.source.as_ref())?;
            tables.push(normalize(&dataset, &bound.spec)?);
        }

        let (primary, secondaries) = tables
            .split_first()
            .ok_or_else(|| ShelterError::Config("no sources configured".into()))?;
        let records = merge(primary, secondaries)?;
        let issues: Vec<RowIssue> = tables.iter().flat_map(|t| t.issues.iter().cloned()).collect();

        let db = ShelterDb {
            records,
            versions,
            specs: self.sources.iter().map(|b| b.spec.clone()).collect(),
            issues,
        };
        let stats = db.stats();
        info!(
            records = stats.records,
            locatable = stats.locatable,
            sources = stats.sources,
            dropped = stats.dropped_rows,
            "built shelter snapshot"
        );
        Ok(db)
    }
}

fn read_snapshot(path: &Path) -> Result<ShelterDb> {
    let reader = BufReader::new(File::open(path)?);

    #[cfg(feature = "compact")]
    let reader = GzDecoder::new(reader);

    Ok(bincode::deserialize_from(reader)?)
}

/// Writes to a sibling temp file, then renames over `path`.
fn write_snapshot(path: &Path, db: &ShelterDb) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let writer = BufWriter::new(File::create(&tmp)?);

    #[cfg(feature = "compact")]
    {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        bincode::serialize_into(&mut encoder, db)?;
        encoder.finish()?.flush()?;
    }

    #[cfg(not(feature = "compact"))]
    {
        let mut writer = writer;
        bincode::serialize_into(&mut writer, db)?;
        writer.flush()?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}
