use std::path::Path;

use drone_route_optimizer::config::{FitnessModel, LateFeeBasis};
use drone_route_optimizer::scenario::{ScenarioError, load_scenario};
use drone_route_optimizer::weather::WindForecast;

#[test]
fn default_scenario_uses_the_weekly_forecast() {
    let scenario = load_scenario(None, Path::new("data/waypoints.csv"), None).expect("scenario");
    assert_eq!(scenario.waypoints.len(), 19);
    assert_eq!(scenario.forecast, WindForecast::weekly_default());
    assert!(scenario.waypoints.iter().any(|w| w.is("82821020")));
}

#[test]
fn wind_csv_matches_the_built_in_week() {
    let scenario = load_scenario(
        Some(Path::new("configs/settings.toml")),
        Path::new("data/waypoints.csv"),
        Some(Path::new("data/wind_table.csv")),
    )
    .expect("scenario");
    assert_eq!(scenario.forecast, WindForecast::weekly_default());
    assert_eq!(scenario.settings.genetic.population_size, 50);
}

#[test]
fn alternate_configuration_switches_the_documented_options() {
    let scenario = load_scenario(
        Some(Path::new("configs/alternate.yaml")),
        Path::new("data/waypoints.csv"),
        None,
    )
    .expect("scenario");
    let settings = &scenario.settings;
    assert_eq!(settings.drone.recharge_duration_s, 1_800);
    assert_eq!(settings.costs.late_fee_basis, LateFeeBasis::End);
    assert!(settings.penalties.hard_day_limit);
    assert!(matches!(settings.fitness, FitnessModel::Weighted { .. }));
    assert_eq!(scenario.forecast.buckets().starts(), &[6, 9, 12, 15, 18]);
    assert_eq!(scenario.forecast.len(), 35);
}

#[test]
fn catalog_without_home_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("points.csv");
    std::fs::write(&path, "cep,lat,lon\n80010000,-25.43,-49.27\n").expect("write");
    let err = load_scenario(None, &path, None).expect_err("home missing");
    assert!(matches!(err, ScenarioError::Import(_)));
    assert!(err.to_string().contains("82821020"));
}
