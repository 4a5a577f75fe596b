// crates/shelter-core/src/config.rs

//! JSON engine configuration.
//!
//! Relative source and cache paths are resolved against the directory of the
//! configuration file.

use crate::error::{Result, ShelterError};
use crate::geodesic::DistanceModel;
use crate::loader::FileSource;
use crate::model::HazardType;
use crate::rank::DEFAULT_PARALLEL_THRESHOLD;
use crate::schema::{FieldMap, SchemaDescriptor, SourceRole, SourceSpec};
use crate::store::BoundSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_TOP_N: usize = 5;

/// A source declaration plus the file it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(flatten)]
    pub spec: SourceSpec,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub default_top_n: usize,
    pub distance_model: DistanceModel,
    pub parallel_threshold: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_top_n: DEFAULT_TOP_N,
            distance_model: DistanceModel::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshot cache file; no disk cache when absent.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl EngineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ShelterError::NotFound(format!("Config not found at {}: {}", path.display(), e))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json(&text, base)
    }

    /// Parses and validates `text`, resolving relative paths against `base`.
    pub fn from_json(text: &str, base: &Path) -> Result<Self> {
        let mut config: EngineConfig = serde_json::from_str(text)?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for source in &mut self.sources {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
        if let Some(cache) = &mut self.cache.path {
            if cache.is_relative() {
                *cache = base.join(&*cache);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for source in &self.sources {
            source.spec.validate()?;
            if !ids.insert(source.spec.id.as_str()) {
                return Err(ShelterError::Config(format!(
                    "source id `{}` is declared twice",
                    source.spec.id
                )));
            }
        }

        let facilities = self
            .sources
            .iter()
            .filter(|s| s.spec.role == SourceRole::Facilities)
            .count();
        if facilities != 1 {
            return Err(ShelterError::Config(format!(
                "expected exactly one facilities source, found {facilities}"
            )));
        }
        if self.ranking.default_top_n == 0 {
            return Err(ShelterError::Config("ranking.default_top_n must be positive".into()));
        }
        if self.ranking.parallel_threshold == 0 {
            return Err(ShelterError::Config(
                "ranking.parallel_threshold must be positive".into(),
            ));
        }
        Ok(())
    }

    /// File-backed sources in declaration order.
    pub fn bind_sources(&self) -> Vec<BoundSource> {
        self.sources
            .iter()
            .map(|s| BoundSource::new(s.spec.clone(), FileSource::new(&s.spec.id, &s.path)))
            .collect()
    }

    /// Built-in profile for the Ehime prefecture open-data exports:
    /// `mergeFromCity_1.csv` (facilities, keyed by 共通ID) and
    /// `matsu_hinan.csv` (per-hazard ○/△/✕ marks, keyed by df2_共通ID).
    pub fn ehime_profile(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();

        let facilities = SourceSpec::facilities(
            "facilities",
            SchemaDescriptor::new(
                ["施設・場所名", "住所", "緯度", "経度"],
                ["受入対象者"],
                Some("共通ID"),
            ),
            FieldMap::facility("施設・場所名", "住所", "緯度", "経度").acceptance("受入対象者"),
        );

        let hazard_columns: Vec<(HazardType, String)> = HazardType::ALL
            .iter()
            .map(|h| (*h, format!("df2_{}", h.label_ja())))
            .collect();
        let optional: Vec<String> = hazard_columns
            .iter()
            .map(|(_, col)| col.clone())
            .filter(|col| col != "df2_地震")
            .collect();
        let hazards = SourceSpec::hazard_capability(
            "hazards",
            SchemaDescriptor::new(vec!["df2_地震".to_string()], optional, Some("df2_共通ID")),
            hazard_columns,
        );

        Self {
            sources: vec![
                SourceConfig {
                    spec: facilities,
                    path: dir.join("mergeFromCity_1.csv"),
                },
                SourceConfig {
                    spec: hazards,
                    path: dir.join("matsu_hinan.csv"),
                },
            ],
            ranking: RankingConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "sources": [
        { "id": "facilities", "path": "facilities.csv", "role": "facilities",
          "schema": { "required": ["name", "address", "lat", "lon"], "key": "id" },
          "fields": { "name": "name", "address": "address",
                      "latitude": "lat", "longitude": "lon" } },
        { "id": "hazards", "path": "/abs/hazards.csv", "role": "hazard_capability",
          "schema": { "required": ["quake"], "key": "hid" },
          "fields": { "hazards": { "earthquake": "quake" } },
          "capability_encoding": "integer" }
      ],
      "ranking": { "distance_model": "haversine" },
      "cache": { "path": "snapshot.bin" }
    }"#;

    #[test]
    fn parses_and_resolves_relative_paths() {
        let config = EngineConfig::from_json(SAMPLE, Path::new("/data")).unwrap();

        assert_eq!(config.sources[0].path, Path::new("/data/facilities.csv"));
        assert_eq!(config.sources[1].path, Path::new("/abs/hazards.csv"));
        assert_eq!(config.cache.path.as_deref(), Some(Path::new("/data/snapshot.bin")));
        assert_eq!(config.ranking.default_top_n, DEFAULT_TOP_N);
        assert_eq!(config.ranking.distance_model, DistanceModel::Haversine);
        assert_eq!(
            config.sources[1].spec.capability_encoding,
            crate::encoding::CapabilityEncoding::Integer
        );
    }

    #[test]
    fn two_facilities_sources_are_rejected() {
        let text = SAMPLE.replace(r#""role": "hazard_capability""#, r#""role": "facilities""#);
        assert!(EngineConfig::from_json(&text, Path::new("/data")).is_err());
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let text = SAMPLE.replace(
            r#""distance_model": "haversine""#,
            r#""distance_model": "haversine", "default_top_n": 0"#,
        );
        let err = EngineConfig::from_json(&text, Path::new("/data")).unwrap_err();
        assert!(matches!(err, ShelterError::Config(_)));
    }

    #[test]
    fn ehime_profile_is_valid() {
        let config = EngineConfig::ehime_profile("/srv/shelters");
        config.validate().unwrap();

        let hazards = &config.sources[1].spec;
        assert_eq!(hazards.schema.key.as_deref(), Some("df2_共通ID"));
        assert_eq!(
            hazards.fields.hazards.get(&HazardType::StormSurge).map(String::as_str),
            Some("df2_高潮")
        );
        assert_eq!(config.bind_sources().len(), 2);
    }

    #[test]
    fn round_trips_through_json() {
        let config = EngineConfig::ehime_profile("/srv/shelters");
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&text, Path::new("/elsewhere")).unwrap(), config);
    }
}
