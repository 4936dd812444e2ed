//! Great-circle distances

use crate::constants::EARTH_RADIUS_KM;
use crate::models::Coordinate;

/// Haversine distance in kilometers between two coordinates
pub fn great_circle_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (to.longitude() - from.longitude()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards against rounding just above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn same_point_is_zero() {
        let london = coord(51.5074, -0.1278);
        assert_eq!(great_circle_km(&london, &london), 0.0);
    }

    #[test]
    fn london_to_paris() {
        let d = great_circle_km(&coord(51.5074, -0.1278), &coord(48.8566, 2.3522));
        assert!((d - 343.5).abs() < 1.5, "got {}", d);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = great_circle_km(&coord(0.0, 0.0), &coord(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn symmetric() {
        let a = coord(40.7128, -74.0060);
        let b = coord(34.0522, -118.2437);
        assert!((great_circle_km(&a, &b) - great_circle_km(&b, &a)).abs() < 1e-9);
    }
}
