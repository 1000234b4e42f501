use std::path::PathBuf;

use clap::Parser;
use drone_route_optimizer::export::summary;
use drone_route_optimizer::mission::MissionSimulator;
use drone_route_optimizer::optimizer::optimize_route;
use drone_route_optimizer::scenario::{format_summary, load_scenario, write_artifacts};
use env_logger::Env;
use log::warn;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Search for a low-cost survey route with a genetic algorithm"
)]
struct Cli {
    /// Settings file (.toml or YAML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Waypoint catalog CSV
    #[arg(long, default_value = "data/waypoints.csv")]
    waypoints: PathBuf,

    /// Wind table CSV; the built-in weekly forecast when omitted
    #[arg(long)]
    wind: Option<PathBuf>,

    /// Directory receiving flight_plan.csv, summary.csv and history.json
    #[arg(long, default_value = "artifacts")]
    output_dir: PathBuf,

    #[arg(long)]
    generations: Option<usize>,

    #[arg(long)]
    population: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the 2-opt pass over the best route
    #[arg(long)]
    no_refine: bool,

    /// Evaluate individuals on the calling thread only
    #[arg(long)]
    serial: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut scenario = load_scenario(cli.config.as_deref(), &cli.waypoints, cli.wind.as_deref())?;
    let settings = &mut scenario.settings;
    if let Some(generations) = cli.generations {
        settings.genetic.generations = generations;
    }
    if let Some(size) = cli.population {
        settings.genetic.population_size = size;
    }
    if cli.seed.is_some() {
        settings.genetic.seed = cli.seed;
    }
    if cli.no_refine {
        settings.refinement.enabled = false;
    }
    if cli.serial {
        settings.genetic.parallel = false;
    }

    let outcome = optimize_route(&scenario.settings, &scenario.waypoints, &scenario.forecast)?;
    let best = &outcome.best;
    if !best.is_feasible() {
        warn!("no feasible route found; exporting the least-penalised candidate");
    }

    let simulator = MissionSimulator::new(&scenario.settings, &scenario.forecast)?;
    let rows = summary::rows(best, simulator.autonomy());
    println!("=== Route Summary ===");
    print!("{}", format_summary(&rows));
    if let Some(report) = &outcome.refinement {
        println!(
            "2-opt: {:.3} km -> {:.3} km ({} moves, {})",
            report.initial_km,
            report.final_km,
            report.iterations,
            if outcome.refined_kept { "kept" } else { "discarded" }
        );
    }

    let paths = write_artifacts(&cli.output_dir, best, simulator.autonomy(), &outcome.history)?;
    println!("Flight plan: {}", paths.flight_plan.display());
    println!("Summary: {}", paths.summary.display());
    println!("History: {}", paths.history.display());
    Ok(())
}
