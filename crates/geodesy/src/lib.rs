//! Great-circle helpers and vector wind composition.

use drone_core::Waypoint;
use drone_core::constants::EARTH_RADIUS_KM;
use drone_core::units::{deg_to_rad, normalize_deg};
use drone_core::vector;

/// Lower bound applied to composed ground speed so that a full headwind never
/// produces a zero or negative divisor.
pub const MIN_GROUND_SPEED_KMH: f64 = 0.1;

/// Great-circle distance between two waypoints (km).
pub fn haversine_km(a: &Waypoint, b: &Waypoint) -> f64 {
    haversine_coords_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Great-circle distance between raw coordinates in degrees (km).
pub fn haversine_coords_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = deg_to_rad(lat1);
    let phi2 = deg_to_rad(lat2);
    let dphi = deg_to_rad(lat2 - lat1);
    let dlambda = deg_to_rad(lon2 - lon1);
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Initial course from `a` towards `b`, degrees clockwise from north in `[0, 360)`.
pub fn bearing_deg(a: &Waypoint, b: &Waypoint) -> f64 {
    let phi1 = deg_to_rad(a.latitude);
    let phi2 = deg_to_rad(b.latitude);
    let dlambda = deg_to_rad(b.longitude - a.longitude);
    let x = dlambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    normalize_deg(x.atan2(y).to_degrees())
}

/// Ground speed obtained by adding the airspeed vector (along `course_deg`)
/// and the wind vector (blowing towards `wind_toward_deg`).
///
/// Crosswinds raise the magnitude above the pure airspeed; a headwind equal to
/// the airspeed is floored at [`MIN_GROUND_SPEED_KMH`].
pub fn ground_speed_kmh(
    airspeed_kmh: f64,
    course_deg: f64,
    wind_speed_kmh: f64,
    wind_toward_deg: f64,
) -> f64 {
    let air = vector::from_bearing(airspeed_kmh, course_deg);
    let wind = vector::from_bearing(wind_speed_kmh, wind_toward_deg);
    vector::norm(&vector::add(&air, &wind)).max(MIN_GROUND_SPEED_KMH)
}

/// Total length of a polyline of waypoints (km).
pub fn path_length_km(points: &[Waypoint]) -> f64 {
    points.windows(2).map(|pair| haversine_km(&pair[0], &pair[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, lat: f64, lon: f64) -> Waypoint {
        Waypoint::new(id, lat, lon)
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_km(&wp("a", 0.0, 0.0), &wp("b", 1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "distance {d}");
    }

    #[test]
    fn cardinal_bearings() {
        let origin = wp("o", 0.0, 0.0);
        assert!(bearing_deg(&origin, &wp("n", 1.0, 0.0)).abs() < 1e-9);
        assert!((bearing_deg(&origin, &wp("e", 0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &wp("s", -1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &wp("w", 0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn oblique_wind_composition() {
        // 36 km/h towards 45 degrees with 15 km/h blowing towards 90 degrees
        let v = ground_speed_kmh(36.0, 45.0, 15.0, 90.0);
        assert!((v - 47.80).abs() < 0.01, "ground speed {v}");
    }

    #[test]
    fn full_headwind_is_floored() {
        let v = ground_speed_kmh(40.0, 0.0, 40.0, 180.0);
        assert!((v - MIN_GROUND_SPEED_KMH).abs() < 1e-9);
    }

    #[test]
    fn path_length_of_single_point_is_zero() {
        assert_eq!(path_length_km(&[wp("a", 1.0, 1.0)]), 0.0);
    }
}
