//! Loading a complete run (settings, catalog, forecast) and writing its
//! artifacts.

use std::io::Write;
use std::path::{Path, PathBuf};

use drone_config::{ConfigError, MissionSettings, load_settings};
use drone_core::Waypoint;
use drone_export::{ExportError, flight_plan, history, summary, writer_for_path};
use drone_importer::{ImportError, ensure_home, load_waypoints, load_wind_table};
use drone_mission::{AutonomyModel, Route};
use drone_weather::{WeatherError, WindBuckets, WindForecast};
use log::info;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to write artifacts: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything one optimisation or simulation run reads.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub settings: MissionSettings,
    pub waypoints: Vec<Waypoint>,
    pub forecast: WindForecast,
}

/// Load settings (defaults when `settings` is `None`), the waypoint catalog
/// and the wind table (the built-in weekly forecast when `wind` is `None`).
pub fn load_scenario(
    settings: Option<&Path>,
    waypoints: &Path,
    wind: Option<&Path>,
) -> Result<Scenario, ScenarioError> {
    let settings = match settings {
        Some(path) => {
            info!("loading settings from {}", path.display());
            load_settings(path)?
        }
        None => MissionSettings::default(),
    };
    let catalog = load_waypoints(waypoints)?;
    ensure_home(&catalog, &settings.home)?;
    let buckets = WindBuckets::new(settings.wind.bucket_start_hours.clone())?;
    let forecast = match wind {
        Some(path) => load_wind_table(path, buckets)?,
        None => WindForecast::weekly_with_buckets(buckets),
    };
    Ok(Scenario {
        settings,
        waypoints: catalog,
        forecast,
    })
}

/// Paths written by [`write_artifacts`].
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub flight_plan: PathBuf,
    pub summary: PathBuf,
    pub history: PathBuf,
}

/// Write `flight_plan.csv`, `summary.csv` and `history.json` into `dir`.
pub fn write_artifacts<S: Serialize>(
    dir: &Path,
    route: &Route,
    autonomy: &AutonomyModel,
    generations: &[S],
) -> Result<ArtifactPaths, ScenarioError> {
    let paths = ArtifactPaths {
        flight_plan: dir.join("flight_plan.csv"),
        summary: dir.join("summary.csv"),
        history: dir.join("history.json"),
    };

    let mut writer = writer_for_path(&paths.flight_plan)?;
    flight_plan::write_route(&mut *writer, route)?;

    let rows = summary::rows(route, autonomy);
    summary::write_summary(writer_for_path(&paths.summary)?, &rows)?;

    let mut writer = writer_for_path(&paths.history)?;
    history::write_history(&mut writer, &route.ids(), route.fitness(), generations)?;
    writer.flush()?;

    info!("artifacts written to {}", dir.display());
    Ok(paths)
}

/// Summary rows rendered as aligned `key: value` lines.
pub fn format_summary(rows: &[(String, String)]) -> String {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value)| format!("{key:<width$} : {value}\n"))
        .collect()
}
