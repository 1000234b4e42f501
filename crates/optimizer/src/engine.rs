//! Generational GA driver with elitism and an adaptive mutation rate.

use drone_config::{ElitePolish, FitnessModel, GeneticSettings};
use drone_core::Waypoint;
use drone_mission::catalog;
use drone_mission::{MissionSimulator, Route, RouteRules};
use log::{debug, info};
use rand::Rng;
use rand::rngs::StdRng;

use crate::OptimizerError;
use crate::operators::{inversion_mutation, mutate, order_crossover, tournament};
use crate::population::{GenerationStats, Population};

pub struct GeneticOptimizer<'a> {
    simulator: MissionSimulator<'a>,
    rules: RouteRules,
    population: Population,
    mutation_rate: f64,
    global_best: Option<Route>,
    history: Vec<GenerationStats>,
    generation: usize,
    rng: StdRng,
}

impl<'a> GeneticOptimizer<'a> {
    /// Seed a random population over every non-home waypoint of `waypoints`.
    pub fn new(
        simulator: MissionSimulator<'a>,
        waypoints: &[Waypoint],
        mut rng: StdRng,
    ) -> Result<Self, OptimizerError> {
        let settings = simulator.settings();
        let rules = RouteRules::from_settings(settings);
        let home = catalog::home(waypoints, &rules)?.clone();
        let stops = catalog::stops(waypoints, &rules);
        let population = Population::random(
            &home,
            &stops,
            &rules,
            settings.genetic.population_size,
            &mut rng,
        );
        info!(
            "initial population of {} routes over {} stops",
            population.len(),
            stops.len()
        );
        Ok(Self {
            mutation_rate: settings.genetic.mutation_rate,
            simulator,
            rules,
            population,
            global_best: None,
            history: Vec::new(),
            generation: 0,
            rng,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Best route seen in any evaluated generation.
    pub fn global_best(&self) -> Option<&Route> {
        self.global_best.as_ref()
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn simulator(&self) -> &MissionSimulator<'a> {
        &self.simulator
    }

    fn genetic(&self) -> &GeneticSettings {
        &self.simulator.settings().genetic
    }

    fn fitness_model(&self) -> &FitnessModel {
        &self.simulator.settings().fitness
    }

    /// Evaluate the current population, update the global best and mutation
    /// rate, then breed the next population.
    pub fn step(&mut self) -> GenerationStats {
        let model = self.fitness_model().clone();
        let parallel = self.genetic().parallel;
        self.population.evaluate(&self.simulator, &model, parallel);

        let improved = self.update_global_best();
        self.adapt_mutation_rate(improved);

        let stats = self.population.stats(self.generation, self.mutation_rate);
        info!(
            "generation {}: best {:.2} mean(feasible) {:.2} feasible {:.0}% mutation {:.3}",
            stats.generation,
            stats.best_fitness,
            stats.mean_feasible_fitness,
            stats.feasibility_rate,
            stats.mutation_rate
        );
        self.history.push(stats.clone());

        self.reproduce(&model);
        self.generation += 1;
        stats
    }

    /// Run the configured number of generations.
    pub fn run(&mut self) -> &[GenerationStats] {
        let generations = self.genetic().generations;
        for _ in 0..generations {
            self.step();
        }
        &self.history
    }

    /// Consume the optimizer, returning the best route and the history. With
    /// zero generations run, the initial population is evaluated first.
    pub fn finish(mut self) -> Result<(Route, Vec<GenerationStats>), OptimizerError> {
        if self.global_best.is_none() {
            let model = self.fitness_model().clone();
            let parallel = self.genetic().parallel;
            self.population.evaluate(&self.simulator, &model, parallel);
            self.update_global_best();
        }
        let best = self.global_best.ok_or(OptimizerError::EmptyPopulation)?;
        Ok((best, self.history))
    }

    fn update_global_best(&mut self) -> bool {
        let Some(candidate) = self.population.best() else {
            return false;
        };
        let improved = match &self.global_best {
            None => true,
            Some(best) => candidate.fitness() < best.fitness(),
        };
        if improved {
            debug!(
                "new global best {:.2} in generation {}",
                candidate.fitness(),
                self.generation
            );
            self.global_best = Some(candidate.clone());
        }
        improved
    }

    fn adapt_mutation_rate(&mut self, improved: bool) {
        let genetic = &self.simulator.settings().genetic;
        self.mutation_rate = if improved {
            (self.mutation_rate * genetic.mutation_decay).max(genetic.min_mutation_rate)
        } else {
            (self.mutation_rate * genetic.mutation_growth).min(genetic.max_mutation_rate)
        };
    }

    fn reproduce(&mut self, model: &FitnessModel) {
        let genetic = &self.simulator.settings().genetic;
        let size = genetic.population_size;
        let members = self.population.members();
        let ranked = self.population.sorted_indices();

        let elite_count = ((size as f64 * genetic.elite_fraction).floor() as usize)
            .max(1)
            .min(ranked.len());
        let mut next = Vec::with_capacity(size);
        for &index in ranked.iter().take(elite_count) {
            next.push(polish_elite(
                &members[index],
                &self.simulator,
                model,
                &self.rules,
                genetic.elite_polish,
                &mut self.rng,
            ));
        }

        let crossover_rate = genetic.crossover_rate.clamp(0.0, 1.0);
        let mutation_rate = self.mutation_rate.clamp(0.0, 1.0);
        while next.len() < size {
            let (Some(first), Some(second)) = (
                tournament(members, genetic.tournament_size, &mut self.rng),
                tournament(members, genetic.tournament_size, &mut self.rng),
            ) else {
                break;
            };
            let mut genes = if self.rng.gen_bool(crossover_rate) {
                order_crossover(first.waypoints(), second.waypoints(), &self.rules, &mut self.rng)
            } else {
                first.waypoints().to_vec()
            };
            if self.rng.gen_bool(mutation_rate) {
                mutate(&mut genes, &mut self.rng);
            }
            next.push(Route::new(genes, &self.rules));
        }
        next.truncate(size);
        self.population.replace(next);
    }
}

/// Invert a sub-range of an elite. Under [`ElitePolish::IfNotWorse`] the
/// elite survives unchanged when the inverted copy scores worse.
fn polish_elite(
    elite: &Route,
    simulator: &MissionSimulator<'_>,
    model: &FitnessModel,
    rules: &RouteRules,
    policy: ElitePolish,
    rng: &mut StdRng,
) -> Route {
    let mut genes = elite.waypoints().to_vec();
    inversion_mutation(&mut genes, rng);
    let mut candidate = Route::new(genes, rules);
    simulator.evaluate(&mut candidate, model);
    match policy {
        ElitePolish::IfNotWorse if candidate.fitness() > elite.fitness() => elite.clone(),
        _ => candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_config::MissionSettings;
    use drone_weather::WindForecast;
    use rand::SeedableRng;

    fn catalog() -> Vec<Waypoint> {
        let mut waypoints = vec![Waypoint::new("H", -25.40, -49.30)];
        waypoints.extend((0..7).map(|i| {
            Waypoint::new(
                format!("s{i}"),
                -25.40 + 0.01 * (i % 3) as f64,
                -49.30 + 0.012 * i as f64,
            )
        }));
        waypoints
    }

    fn settings() -> MissionSettings {
        let mut settings = MissionSettings {
            home: "H".to_string(),
            ..MissionSettings::default()
        };
        settings.genetic.population_size = 16;
        settings.genetic.generations = 12;
        settings
    }

    #[test]
    fn global_best_never_gets_worse() {
        let settings = settings();
        let forecast = WindForecast::weekly_default();
        let simulator = MissionSimulator::new(&settings, &forecast).expect("simulator");
        let waypoints = catalog();
        let mut optimizer =
            GeneticOptimizer::new(simulator, &waypoints, StdRng::seed_from_u64(21)).expect("ga");
        let mut previous = f64::INFINITY;
        for _ in 0..settings.genetic.generations {
            optimizer.step();
            let best = optimizer.global_best().expect("best").fitness();
            assert!(best <= previous);
            previous = best;
            assert_eq!(optimizer.population().len(), settings.genetic.population_size);
        }
        let rate = optimizer.mutation_rate();
        assert!(rate >= settings.genetic.min_mutation_rate);
        assert!(rate <= settings.genetic.max_mutation_rate);
    }

    #[test]
    fn same_seed_same_result() {
        let settings = settings();
        let forecast = WindForecast::weekly_default();
        let waypoints = catalog();
        let run = |seed: u64| {
            let simulator = MissionSimulator::new(&settings, &forecast).expect("simulator");
            let mut optimizer =
                GeneticOptimizer::new(simulator, &waypoints, StdRng::seed_from_u64(seed))
                    .expect("ga");
            optimizer.run();
            let (best, history) = optimizer.finish().expect("finish");
            (best.ids().join(","), best.fitness(), history.len())
        };
        let first = run(7);
        assert_eq!(first, run(7));
        assert_eq!(first.2, settings.genetic.generations);
    }

    #[test]
    fn missing_home_is_an_error() {
        let settings = MissionSettings {
            home: "elsewhere".to_string(),
            ..settings()
        };
        let forecast = WindForecast::calm();
        let simulator = MissionSimulator::new(&settings, &forecast).expect("simulator");
        let result = GeneticOptimizer::new(simulator, &catalog(), StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(OptimizerError::Catalog(_))));
    }

    #[test]
    fn elite_polish_policy_decides_what_survives() {
        let settings = settings();
        let forecast = WindForecast::calm();
        let simulator = MissionSimulator::new(&settings, &forecast).expect("simulator");
        let rules = RouteRules::from_settings(&settings);
        let waypoints = catalog();
        let mut elite = Route::round_trip(
            waypoints[0].clone(),
            [waypoints[1].clone(), waypoints[2].clone()],
            &rules,
        );
        // nothing can beat a zero score
        elite.set_fitness(0.0);
        let polish = |policy| {
            let mut rng = StdRng::seed_from_u64(4);
            polish_elite(&elite, &simulator, &settings.fitness, &rules, policy, &mut rng)
        };
        assert_eq!(polish(ElitePolish::Always).ids(), ["H", "s1", "s0", "H"]);
        assert_eq!(polish(ElitePolish::IfNotWorse).ids(), ["H", "s0", "s1", "H"]);
    }

    #[test]
    fn zero_generations_still_yield_a_route() {
        let mut settings = settings();
        settings.genetic.generations = 0;
        let forecast = WindForecast::calm();
        let simulator = MissionSimulator::new(&settings, &forecast).expect("simulator");
        let waypoints = catalog();
        let mut optimizer =
            GeneticOptimizer::new(simulator, &waypoints, StdRng::seed_from_u64(3)).expect("ga");
        optimizer.run();
        let (best, history) = optimizer.finish().expect("finish");
        assert!(history.is_empty());
        assert!(best.is_feasible());
        assert!(best.fitness().is_finite());
    }
}
