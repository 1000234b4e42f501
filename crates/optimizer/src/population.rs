//! Fixed-size set of candidate routes and per-generation statistics.

use drone_config::FitnessModel;
use drone_core::Waypoint;
use drone_mission::{MissionSimulator, Route, RouteRules};
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::Serialize;

/// Summary of one evaluated generation. Infinite values serialise as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub population_size: usize,
    pub best_fitness: f64,
    pub worst_fitness: f64,
    pub mean_fitness: f64,
    pub feasible: usize,
    /// Share of feasible individuals, percent.
    pub feasibility_rate: f64,
    pub mean_feasible_fitness: f64,
    pub mutation_rate: f64,
}

#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<Route>,
}

impl Population {
    /// `size` random tours: home, a shuffled permutation of `stops`, home.
    pub fn random<R: Rng + ?Sized>(
        home: &Waypoint,
        stops: &[Waypoint],
        rules: &RouteRules,
        size: usize,
        rng: &mut R,
    ) -> Self {
        let members = (0..size)
            .map(|_| {
                let mut order = stops.to_vec();
                order.shuffle(rng);
                Route::round_trip(home.clone(), order, rules)
            })
            .collect();
        Self { members }
    }

    pub fn from_members(members: Vec<Route>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Route] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn replace(&mut self, members: Vec<Route>) {
        self.members = members;
    }

    /// Simulate and score every member. Each route carries its own battery
    /// state through the run, so members can be evaluated in parallel.
    pub fn evaluate(
        &mut self,
        simulator: &MissionSimulator<'_>,
        model: &FitnessModel,
        parallel: bool,
    ) {
        if parallel {
            self.members.par_iter_mut().for_each(|route| {
                simulator.evaluate(route, model);
            });
        } else {
            for route in &mut self.members {
                simulator.evaluate(route, model);
            }
        }
    }

    /// Lowest fitness among feasible members, or among all members when none
    /// is feasible.
    pub fn best(&self) -> Option<&Route> {
        self.feasible()
            .min_by(by_fitness)
            .or_else(|| self.members.iter().min_by(by_fitness))
    }

    /// Highest fitness with the same feasibility fallback as [`Population::best`].
    pub fn worst(&self) -> Option<&Route> {
        self.feasible()
            .max_by(by_fitness)
            .or_else(|| self.members.iter().max_by(by_fitness))
    }

    fn feasible(&self) -> impl Iterator<Item = &Route> {
        self.members.iter().filter(|route| route.is_feasible())
    }

    /// Member indices ordered from best to worst fitness; stable on ties.
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by(|&a, &b| {
            self.members[a]
                .fitness()
                .total_cmp(&self.members[b].fitness())
        });
        order
    }

    pub fn stats(&self, generation: usize, mutation_rate: f64) -> GenerationStats {
        let size = self.members.len();
        let fitness: Vec<f64> = self.members.iter().map(Route::fitness).collect();
        let feasible: Vec<f64> = self.feasible().map(Route::fitness).collect();
        GenerationStats {
            generation,
            population_size: size,
            best_fitness: self.best().map_or(f64::INFINITY, Route::fitness),
            worst_fitness: self.worst().map_or(f64::INFINITY, Route::fitness),
            mean_fitness: mean(&fitness),
            feasible: feasible.len(),
            feasibility_rate: if size == 0 {
                0.0
            } else {
                feasible.len() as f64 / size as f64 * 100.0
            },
            mean_feasible_fitness: mean(&feasible),
            mutation_rate,
        }
    }
}

fn by_fitness(a: &&Route, b: &&Route) -> std::cmp::Ordering {
    a.fitness().total_cmp(&b.fitness())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::INFINITY;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
