use drone_route_optimizer::common::Waypoint;
use drone_route_optimizer::geodesy::{MIN_GROUND_SPEED_KMH, bearing_deg, ground_speed_kmh};
use drone_route_optimizer::weather::{Cardinal, WindBuckets, WindEntry, WindForecast};

const COURSE: f64 = 63.0;

#[test]
fn calm_air_keeps_the_airspeed() {
    assert!((ground_speed_kmh(48.0, COURSE, 0.0, 200.0) - 48.0).abs() < 1e-9);
}

#[test]
fn tailwind_adds_and_headwind_subtracts() {
    let tail = ground_speed_kmh(60.0, COURSE, 20.0, COURSE);
    let head = ground_speed_kmh(60.0, COURSE, 20.0, COURSE + 180.0);
    assert!((tail - 80.0).abs() < 1e-9);
    assert!((head - 40.0).abs() < 1e-9);
}

#[test]
fn overwhelming_headwind_is_floored() {
    let head = ground_speed_kmh(36.0, COURSE, 50.0, COURSE + 180.0);
    assert!((head - MIN_GROUND_SPEED_KMH).abs() < 1e-12);
}

#[test]
fn crosswind_composes_in_quadrature() {
    let cross = ground_speed_kmh(40.0, COURSE, 30.0, COURSE + 90.0);
    assert!((cross - 50.0).abs() < 1e-9);
}

#[test]
fn cardinal_labels_point_where_the_wind_comes_from() {
    let north = Waypoint::new("n", 1.0, 0.0);
    let origin = Waypoint::new("o", 0.0, 0.0);
    let course = bearing_deg(&origin, &north);
    // a southerly wind blows towards the north: pure tailwind on this course
    let southerly: Cardinal = "s".parse().expect("cardinal");
    let tail = ground_speed_kmh(60.0, course, 30.0, southerly.toward_deg());
    assert!((tail - 90.0).abs() < 1e-6);
    assert!("NORTHISH".parse::<Cardinal>().is_err());
}

#[test]
fn forecast_lookup_uses_bucket_starts() {
    let forecast = WindForecast::weekly_default();
    assert_eq!(forecast.len(), 42);
    let early = forecast.get_wind(1, 5 * 60);
    let first = forecast.get_wind(1, 6 * 60);
    let late_first = forecast.get_wind(1, 8 * 60 + 59);
    assert_eq!(early, first);
    assert_eq!(first, late_first);
    assert_eq!(first.cardinal, Cardinal::Ene);
    assert_eq!(first.speed_kmh, 17.0);
    assert_eq!(forecast.get_wind(5, 23 * 60).cardinal, Cardinal::E);
    assert_eq!(forecast.get_wind(9, 12 * 60).speed_kmh, 0.0);
}

#[test]
fn five_bucket_forecasts_merge_the_evening() {
    let buckets = WindBuckets::new(vec![6, 9, 12, 15, 18]).expect("buckets");
    assert_eq!(buckets.bucket_for(22 * 60), 18);
    let forecast = WindForecast::new(
        buckets,
        [
            WindEntry::cardinal(1, 18, 12.0, Cardinal::Sw),
            WindEntry::from_degrees(1, 6, 8.0, 90.0),
        ],
    )
    .expect("forecast");
    assert_eq!(forecast.get_wind(1, 21 * 60 + 30).cardinal, Cardinal::Sw);
    assert_eq!(forecast.get_wind(1, 7 * 60).cardinal, Cardinal::E);
    assert!(WindForecast::new(
        WindBuckets::default(),
        [WindEntry::cardinal(1, 7, 5.0, Cardinal::N)]
    )
    .is_err());
}
