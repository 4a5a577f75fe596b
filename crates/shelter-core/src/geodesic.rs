// crates/shelter-core/src/geodesic.rs

//! Distances on the WGS84 ellipsoid.
//!
//! [`vincenty_km`] is the inverse Vincenty solution, accurate to well under a
//! millimetre for the distances a shelter lookup cares about. It can fail to
//! converge for nearly antipodal points; [`DistanceModel::Geodesic`] then
//! falls back to the spherical [`haversine_km`].

use crate::model::GeoPoint;
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis (m).
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (m).
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// Mean Earth radius used by the spherical model (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceModel {
    /// Ellipsoidal (Vincenty) distance.
    #[default]
    Geodesic,
    /// Great-circle distance on a sphere of radius [`EARTH_RADIUS_KM`].
    Haversine,
}

impl DistanceModel {
    pub fn distance_km(self, a: GeoPoint, b: GeoPoint) -> f64 {
        match self {
            DistanceModel::Geodesic => vincenty_km(a, b).unwrap_or_else(|| haversine_km(a, b)),
            DistanceModel::Haversine => haversine_km(a, b),
        }
    }
}

pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat().to_radians(), b.lat().to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon() - a.lon()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Inverse Vincenty; `None` when the iteration does not converge.
pub fn vincenty_km(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    if a == b {
        return Some(0.0);
    }

    let l = (b.lon() - a.lon()).to_radians();
    let u1 = ((1.0 - WGS84_F) * a.lat().to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * b.lat().to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // coincident points
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // equatorial line: cos_sq_alpha = 0
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < CONVERGENCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            let metres = WGS84_B * big_a * (sigma - delta_sigma);
            return Some(metres / 1000.0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        let here = p(33.8117, 132.7789);
        assert_eq!(DistanceModel::Geodesic.distance_km(here, here), 0.0);
        assert_eq!(DistanceModel::Haversine.distance_km(here, here), 0.0);
    }

    #[test]
    fn short_hop_in_matsuyama() {
        let d = DistanceModel::Geodesic.distance_km(p(33.8120, 132.7790), p(33.8117, 132.7789));
        assert!((0.03..0.05).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_of_latitude_at_equator() {
        // Reference value from the WGS84 meridian arc: 110.574 km
        let d = vincenty_km(p(0.0, 0.0), p(1.0, 0.0)).unwrap();
        assert_relative_eq!(d, 110.574, epsilon = 1e-3);
    }

    #[test]
    fn geodesic_and_haversine_agree_roughly() {
        let tokyo = p(35.6812, 139.7671);
        let matsuyama = p(33.8392, 132.7657);
        let g = DistanceModel::Geodesic.distance_km(tokyo, matsuyama);
        let h = DistanceModel::Haversine.distance_km(tokyo, matsuyama);
        assert_relative_eq!(g, h, max_relative = 0.005);
    }

    #[test]
    fn models_agree_to_a_tenth_of_a_km_at_shelter_scale() {
        let here = p(33.8117, 132.7789);
        for (dlat, dlon) in [(0.09, 0.0), (0.0, 0.1), (0.06, 0.06), (-0.03, 0.05), (0.004, -0.002)] {
            let there = p(here.lat() + dlat, here.lon() + dlon);
            let g = DistanceModel::Geodesic.distance_km(here, there);
            let h = DistanceModel::Haversine.distance_km(here, there);
            assert!(g <= 10.0, "{g} km is beyond shelter scale");
            assert_abs_diff_eq!(g, h, epsilon = 0.05);
        }
    }

    #[test]
    fn nearly_antipodal_points_fall_back() {
        let a = p(0.0, 0.0);
        let b = p(0.5, 179.7);
        let d = DistanceModel::Geodesic.distance_km(a, b);
        assert!(d.is_finite());
        assert!(d > 19_000.0);
    }

    #[test]
    fn symmetric() {
        let a = p(33.80, 132.70);
        let b = p(33.85, 132.78);
        assert_relative_eq!(
            DistanceModel::Geodesic.distance_km(a, b),
            DistanceModel::Geodesic.distance_km(b, a),
            epsilon = 1e-9
        );
    }
}
