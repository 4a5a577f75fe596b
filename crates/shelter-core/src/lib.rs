// crates/shelter-core/src/lib.rs

//! Nearest-shelter matching.
//!
//! Pipeline: [`loader`] reads each configured source into a schema-checked
//! [`Dataset`], [`normalize`] renames keys and translates encodings,
//! [`merge`] outer-joins facilities with capability tables, and the
//! resulting immutable [`ShelterDb`] snapshot is shared by all queries.
//! A query [`filter`]s on hazard capability, [`rank`]s by geodesic distance
//! and tags each hit with a [`ProximityTier`].

pub mod common;
pub mod config;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod filter;
pub mod geodesic;
pub mod loader; // Tables from files or memory
pub mod merge;
pub mod model;
pub mod normalize;
pub mod proximity;
pub mod rank;
pub mod schema;
pub mod store;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::common::SnapshotStats;
pub use crate::config::{CacheConfig, EngineConfig, RankingConfig, SourceConfig};
pub use crate::encoding::{AcceptanceMap, CapabilityEncoding, ValueMap};
pub use crate::engine::{ShelterEngine, ShelterQuery};
pub use crate::error::{Result, ShelterError};
pub use crate::filter::AcceptanceFilter;
pub use crate::geodesic::DistanceModel;
pub use crate::loader::{Dataset, DatasetVersion, FileSource, MemorySource, RawTable};
pub use crate::model::{
    AcceptanceTag, CapabilityLevel, CapabilityMap, GeoPoint, HazardType, MergedRecord,
    Provenance, QueryOutcome, RankedEntry, RankedResult, ShelterRecord, Site,
};
pub use crate::normalize::RowIssue;
pub use crate::proximity::ProximityTier;
pub use crate::rank::{Deadline, RankOptions};
pub use crate::schema::{FieldMap, SchemaDescriptor, SourceRole, SourceSpec};
pub use crate::store::{BoundSource, ShelterDb, ShelterStore};
pub use crate::traits::{NameMatch, TableSource};
