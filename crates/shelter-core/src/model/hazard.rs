// crates/shelter-core/src/model/hazard.rs
use crate::error::{Result, ShelterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Category of disaster a shelter may or may not accommodate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardType {
    Earthquake,
    Tsunami,
    StormSurge,
    Flood,
    Landslide,
}

impl HazardType {
    pub const ALL: [HazardType; 5] = [
        HazardType::Earthquake,
        HazardType::Tsunami,
        HazardType::StormSurge,
        HazardType::Flood,
        HazardType::Landslide,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HazardType::Earthquake => "earthquake",
            HazardType::Tsunami => "tsunami",
            HazardType::StormSurge => "storm_surge",
            HazardType::Flood => "flood",
            HazardType::Landslide => "landslide",
        }
    }

    /// Label used by the municipal source tables (地震, 津波, ...).
    pub fn label_ja(self) -> &'static str {
        match self {
            HazardType::Earthquake => "地震",
            HazardType::Tsunami => "津波",
            HazardType::StormSurge => "高潮",
            HazardType::Flood => "洪水",
            HazardType::Landslide => "土砂",
        }
    }
}

impl fmt::Display for HazardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardType {
    type Err = ShelterError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(h) = HazardType::ALL.iter().find(|h| h.label_ja() == trimmed) {
            return Ok(*h);
        }
        match trimmed.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "earthquake" => Ok(HazardType::Earthquake),
            "tsunami" => Ok(HazardType::Tsunami),
            "storm_surge" | "stormsurge" => Ok(HazardType::StormSurge),
            "flood" => Ok(HazardType::Flood),
            "landslide" => Ok(HazardType::Landslide),
            _ => Err(ShelterError::invalid(format!("unknown hazard type `{s}`"))),
        }
    }
}

/// Degree to which a shelter accepts evacuees for a given hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityLevel {
    Full,
    Partial,
    None,
    #[default]
    Unknown,
}

impl CapabilityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityLevel::Full => "full",
            CapabilityLevel::Partial => "partial",
            CapabilityLevel::None => "none",
            CapabilityLevel::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != CapabilityLevel::Unknown
    }
}

impl fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityLevel {
    type Err = ShelterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(CapabilityLevel::Full),
            "partial" => Ok(CapabilityLevel::Partial),
            "none" => Ok(CapabilityLevel::None),
            "unknown" => Ok(CapabilityLevel::Unknown),
            _ => Err(ShelterError::invalid(format!(
                "unknown capability level `{s}` (expected full, partial, none or unknown)"
            ))),
        }
    }
}

/// Who a shelter admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceTag {
    General,
    /// Reserved for people who need special care (要配慮者).
    Restricted,
    #[default]
    Unspecified,
}

impl AcceptanceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            AcceptanceTag::General => "general",
            AcceptanceTag::Restricted => "restricted",
            AcceptanceTag::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for AcceptanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-hazard capability levels. A hazard with no entry reads as
/// [`CapabilityLevel::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMap(BTreeMap<HazardType, CapabilityLevel>);

impl CapabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hazard: HazardType) -> CapabilityLevel {
        self.0.get(&hazard).copied().unwrap_or_default()
    }

    pub fn set(&mut self, hazard: HazardType, level: CapabilityLevel) {
        self.0.insert(hazard, level);
    }

    pub fn with(mut self, hazard: HazardType, level: CapabilityLevel) -> Self {
        self.set(hazard, level);
        self
    }

    /// Folds a later source's values into this map: a known level overrides,
    /// `Unknown` never erases a known level.
    pub fn absorb(&mut self, later: &CapabilityMap) {
        for (hazard, level) in &later.0 {
            if level.is_known() || !self.0.contains_key(hazard) {
                self.0.insert(*hazard, *level);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (HazardType, CapabilityLevel)> + '_ {
        self.0.iter().map(|(h, l)| (*h, *l))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
