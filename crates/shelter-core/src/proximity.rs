// crates/shelter-core/src/proximity.rs

//! Distance buckets handed to the presentation layer (marker colours in the
//! map view: near, mid, far).

use crate::error::{Result, ShelterError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NEAR_LIMIT_KM: f64 = 0.5;
pub const MID_LIMIT_KM: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityTier {
    Near,
    Mid,
    Far,
}

impl ProximityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ProximityTier::Near => "near",
            ProximityTier::Mid => "mid",
            ProximityTier::Far => "far",
        }
    }
}

impl fmt::Display for ProximityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Near` below 0.5 km, `Mid` below 1.0 km, `Far` otherwise.
pub fn classify(distance_km: f64) -> Result<ProximityTier> {
    if distance_km.is_nan() || distance_km < 0.0 {
        return Err(ShelterError::invalid(format!(
            "distance must be non-negative, got {distance_km}"
        )));
    }
    Ok(if distance_km < NEAR_LIMIT_KM {
        ProximityTier::Near
    } else if distance_km < MID_LIMIT_KM {
        ProximityTier::Mid
    } else {
        ProximityTier::Far
    })
}
