//! Route search: a generational genetic algorithm followed by an optional
//! geometric 2-opt pass over the winner.

pub mod engine;
pub mod operators;
pub mod population;
pub mod two_opt;

use drone_config::{ConfigError, MissionSettings};
use drone_core::Waypoint;
use drone_mission::catalog::CatalogError;
use drone_mission::{MissionError, MissionSimulator, Route, RouteRules};
use drone_weather::WindForecast;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

pub use engine::GeneticOptimizer;
pub use population::{GenerationStats, Population};
pub use two_opt::{TwoOptReport, two_opt};

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("invalid settings: {0}")]
    Settings(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Mission(#[from] MissionError),
    #[error("population is empty")]
    EmptyPopulation,
}

/// Result of [`optimize_route`].
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    /// Simulated best route after the optional refinement.
    pub best: Route,
    pub history: Vec<GenerationStats>,
    /// 2-opt report when refinement ran.
    pub refinement: Option<TwoOptReport>,
    /// Whether the refined sequence replaced the GA winner.
    pub refined_kept: bool,
}

/// Run the full search over `waypoints`. The RNG is seeded from
/// `settings.genetic.seed` when set, from entropy otherwise.
pub fn optimize_route(
    settings: &MissionSettings,
    waypoints: &[Waypoint],
    forecast: &WindForecast,
) -> Result<OptimizationOutcome, OptimizerError> {
    settings.validate()?;
    let rng = match settings.genetic.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let simulator = MissionSimulator::new(settings, forecast)?;
    let mut optimizer = GeneticOptimizer::new(simulator.clone(), waypoints, rng)?;
    optimizer.run();
    let (best, history) = optimizer.finish()?;
    info!(
        "genetic search finished: fitness {:.2} over {:.2} km",
        best.fitness(),
        best.metrics().distance_km
    );

    if !settings.refinement.enabled {
        return Ok(OptimizationOutcome {
            best,
            history,
            refinement: None,
            refined_kept: false,
        });
    }

    let report = two_opt(
        best.waypoints(),
        settings.refinement.max_iterations,
        settings.refinement.epsilon_km,
    );
    let rules = RouteRules::from_settings(settings);
    let mut refined = Route::new(report.waypoints.clone(), &rules);
    simulator.evaluate(&mut refined, &settings.fitness);
    let refined_kept = report.improved && refined.fitness() < best.fitness();
    info!(
        "2-opt: {:.3} km -> {:.3} km, fitness {:.2} vs {:.2}, {}",
        report.initial_km,
        report.final_km,
        refined.fitness(),
        best.fitness(),
        if refined_kept { "kept" } else { "discarded" }
    );
    Ok(OptimizationOutcome {
        best: if refined_kept { refined } else { best },
        history,
        refinement: Some(report),
        refined_kept,
    })
}
