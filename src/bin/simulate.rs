use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use drone_route_optimizer::export::summary;
use drone_route_optimizer::mission::catalog::route_from_ids;
use drone_route_optimizer::mission::{MissionSimulator, RouteRules};
use drone_route_optimizer::optimizer::GenerationStats;
use drone_route_optimizer::scenario::{format_summary, load_scenario, write_artifacts};
use env_logger::Env;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Simulate a fixed visiting order and export its flight plan"
)]
struct Cli {
    /// Comma-separated waypoint ids; home is added at both ends
    #[arg(long)]
    order: String,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "data/waypoints.csv")]
    waypoints: PathBuf,

    #[arg(long)]
    wind: Option<PathBuf>,

    #[arg(long, default_value = "artifacts")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let scenario = load_scenario(cli.config.as_deref(), &cli.waypoints, cli.wind.as_deref())?;

    let ids: Vec<&str> = cli
        .order
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();
    let rules = RouteRules::from_settings(&scenario.settings);
    let mut route = route_from_ids(&scenario.waypoints, &ids, &rules)
        .context("failed to build the route")?;

    let simulator = MissionSimulator::new(&scenario.settings, &scenario.forecast)?;
    simulator.evaluate(&mut route, &scenario.settings.fitness);

    println!("=== Route Summary ===");
    print!("{}", format_summary(&summary::rows(&route, simulator.autonomy())));
    for leg in route.legs() {
        println!(
            "day {} {} -> {}: {} km/h, wind {:.0} km/h {}, {:.2} km in {:.1} min{}",
            leg.day,
            leg.origin.id(),
            leg.destination.id(),
            leg.airspeed_kmh,
            leg.wind.speed_kmh,
            leg.wind.label(),
            leg.distance_km,
            leg.flight_minutes(),
            if leg.landed_before { " (after recharge)" } else { "" }
        );
    }

    let no_history: [GenerationStats; 0] = [];
    let paths = write_artifacts(&cli.output_dir, &route, simulator.autonomy(), &no_history)?;
    println!("Flight plan: {}", paths.flight_plan.display());
    Ok(())
}
