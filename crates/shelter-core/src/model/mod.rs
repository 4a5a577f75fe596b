// crates/shelter-core/src/model/mod.rs
pub mod hazard;
pub mod record;
pub mod result;

pub use hazard::{AcceptanceTag, CapabilityLevel, CapabilityMap, HazardType};
pub use record::{GeoPoint, MergedRecord, Provenance, ShelterRecord, Site};
pub use result::{QueryOutcome, RankedEntry, RankedResult};
