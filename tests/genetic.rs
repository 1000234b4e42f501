use std::collections::HashSet;

use drone_route_optimizer::common::Waypoint;
use drone_route_optimizer::config::MissionSettings;
use drone_route_optimizer::importer::load_waypoints;
use drone_route_optimizer::mission::{MissionSimulator, Route, RouteRules};
use drone_route_optimizer::optimizer::operators::order_crossover;
use drone_route_optimizer::optimizer::{GeneticOptimizer, optimize_route};
use drone_route_optimizer::weather::WindForecast;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

fn small_run() -> MissionSettings {
    let mut settings = MissionSettings::default();
    settings.genetic.population_size = 20;
    settings.genetic.generations = 10;
    settings.genetic.seed = Some(2024);
    settings
}

#[test]
fn global_best_is_monotonic_over_the_catalog() {
    let settings = small_run();
    let forecast = WindForecast::weekly_default();
    let waypoints = load_waypoints("data/waypoints.csv").expect("catalog");
    let simulator = MissionSimulator::new(&settings, &forecast).expect("simulator");
    let mut optimizer =
        GeneticOptimizer::new(simulator, &waypoints, StdRng::seed_from_u64(5)).expect("optimizer");

    let mut best_so_far = f64::INFINITY;
    for generation in 0..settings.genetic.generations {
        let stats = optimizer.step();
        assert_eq!(stats.generation, generation);
        let best = optimizer.global_best().expect("global best").fitness();
        assert!(best <= best_so_far, "generation {generation} regressed");
        assert!(best <= stats.best_fitness);
        best_so_far = best;
    }
    assert_eq!(optimizer.history().len(), settings.genetic.generations);
}

#[test]
fn crossover_never_loses_or_duplicates_stops() {
    let waypoints = load_waypoints("data/waypoints.csv").expect("catalog");
    let rules = RouteRules::from_settings(&MissionSettings::default());
    let home = waypoints[0].clone();
    let stops: Vec<Waypoint> = waypoints[1..].to_vec();
    let expected: HashSet<&str> = stops.iter().map(Waypoint::id).collect();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..100 {
        let mut a = stops.clone();
        let mut b = stops.clone();
        a.shuffle(&mut rng);
        b.shuffle(&mut rng);
        let p1 = Route::round_trip(home.clone(), a, &rules);
        let p2 = Route::round_trip(home.clone(), b, &rules);
        let child = Route::new(
            order_crossover(p1.waypoints(), p2.waypoints(), &rules, &mut rng),
            &rules,
        );
        assert!(child.is_structurally_valid(), "{:?}", child.violations());
        let ids: HashSet<&str> = child.interior().iter().map(Waypoint::id).collect();
        assert_eq!(ids, expected);
        assert_eq!(child.interior().len(), stops.len());
    }
}

#[test]
fn pipeline_visits_every_stop_once() {
    let settings = small_run();
    let waypoints = load_waypoints("data/waypoints.csv").expect("catalog");
    let outcome =
        optimize_route(&settings, &waypoints, &WindForecast::weekly_default()).expect("optimize");
    let best = &outcome.best;
    assert!(best.is_feasible());
    assert_eq!(best.ids().first(), Some(&"82821020"));
    assert_eq!(best.ids().last(), Some(&"82821020"));
    assert_eq!(best.interior().len(), waypoints.len() - 1);
    assert_eq!(best.legs().len(), waypoints.len());
    let refinement = outcome.refinement.expect("refinement ran");
    assert!(refinement.final_km <= refinement.initial_km + 1e-9);
}
