// crates/shelter-core/src/model/record.rs
use super::hazard::{AcceptanceTag, CapabilityLevel, CapabilityMap, HazardType};
use crate::error::{Result, ShelterError};
use crate::traits::NameMatch;
use serde::{Deserialize, Serialize};

/// A validated WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Fails with `InvalidArgument` for non-finite values or values outside
    /// [-90, 90] / [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ShelterError::invalid(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ShelterError::invalid(format!(
                "longitude {lon} is outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }

    pub const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Ordered list of the source ids that contributed to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance(Vec<String>);

impl Provenance {
    pub fn single(source: &str) -> Self {
        Self(vec![source.to_owned()])
    }

    pub fn push(&mut self, source: &str) {
        if !self.contains(source) {
            self.0.push(source.to_owned());
        }
    }

    pub fn contains(&self, source: &str) -> bool {
        self.0.iter().any(|s| s == source)
    }

    pub fn sources(&self) -> &[String] {
        &self.0
    }
}

/// The locatable half of a record, supplied by the facilities source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub acceptance: AcceptanceTag,
}

/// One row of the outer join.
///
/// `site` is `None` for keys that only capability sources know about; such
/// records survive the merge but can never be ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    /// Position in merge enumeration order; the ranking tie-breaker.
    pub ordinal: usize,
    pub key: Option<String>,
    pub site: Option<Site>,
    pub capabilities: CapabilityMap,
    pub provenance: Provenance,
}

impl MergedRecord {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.site.as_ref().map(|s| s.name.as_str())
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.site.as_ref().map(|s| s.location)
    }

    pub fn acceptance(&self) -> AcceptanceTag {
        self.site.as_ref().map(|s| s.acceptance).unwrap_or_default()
    }

    pub fn capability(&self, hazard: HazardType) -> CapabilityLevel {
        self.capabilities.get(hazard)
    }

    /// Owned shelter view; `None` when the record has no site.
    pub fn to_shelter(&self) -> Option<ShelterRecord> {
        let site = self.site.as_ref()?;
        Some(ShelterRecord {
            key: self.key.clone(),
            name: site.name.clone(),
            address: site.address.clone(),
            location: site.location,
            acceptance: site.acceptance,
            capabilities: self.capabilities.clone(),
            provenance: self.provenance.clone(),
        })
    }
}

impl NameMatch for MergedRecord {
    fn name_str(&self) -> &str {
        self.name().unwrap_or("")
    }
}

/// A facility entry with location and hazard-capability attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterRecord {
    pub key: Option<String>,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub acceptance: AcceptanceTag,
    pub capabilities: CapabilityMap,
    pub provenance: Provenance,
}

impl ShelterRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn capability(&self, hazard: HazardType) -> CapabilityLevel {
        self.capabilities.get(hazard)
    }
}

impl NameMatch for ShelterRecord {
    fn name_str(&self) -> &str {
        &self.name
    }
}
