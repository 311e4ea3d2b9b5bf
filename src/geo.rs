//! Great-circle district lookup
//!
//! Maps a submission point to the nearest administrative district by
//! haversine distance. District counts are small (administrative regions,
//! not points of interest), so a linear scan is fine.

use crate::store::District;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometers.
pub fn distance_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let d_lat = (lat_b - lat_a).to_radians();
    let d_lon = (lon_b - lon_a).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat_a.to_radians().cos() * lat_b.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Find the district closest to the given point.
///
/// Returns `None` for an empty district set. Ties are broken by the first
/// district encountered in iteration order (implementation-defined).
pub fn nearest_district(lat: f64, lon: f64, districts: &[District]) -> Option<&District> {
    let mut closest: Option<(&District, f64)> = None;

    for district in districts {
        let distance = distance_km(lat, lon, district.latitude, district.longitude);
        match closest {
            Some((_, best)) if distance >= best => {}
            _ => closest = Some((district, distance)),
        }
    }

    closest.map(|(district, _)| district)
}
