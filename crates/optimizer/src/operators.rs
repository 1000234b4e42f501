//! Selection, crossover and mutation over waypoint sequences whose first and
//! last genes are the fixed home waypoint.

use std::collections::HashSet;

use drone_core::Waypoint;
use drone_mission::{Route, RouteRules};
use rand::Rng;
use rand::seq::index;

/// k-way tournament: sample `k` distinct members uniformly and return the one
/// with the lowest fitness (the earliest drawn on ties).
pub fn tournament<'a, R: Rng + ?Sized>(
    members: &'a [Route],
    k: usize,
    rng: &mut R,
) -> Option<&'a Route> {
    if members.is_empty() {
        return None;
    }
    let k = k.clamp(1, members.len());
    index::sample(rng, members.len(), k)
        .iter()
        .map(|i| &members[i])
        .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))
}

/// Two distinct interior cut points `1 <= start < end <= len - 2`.
fn interior_cuts<R: Rng + ?Sized>(len: usize, rng: &mut R) -> (usize, usize) {
    let picks = index::sample(rng, len - 2, 2);
    let (a, b) = (picks.index(0) + 1, picks.index(1) + 1);
    (a.min(b), a.max(b))
}

/// Order crossover (OX).
///
/// The child keeps `parent1[start..end]` in place and fills the remaining
/// interior slots with `parent2`'s genes in their relative order, starting at
/// `end` and wrapping back to index 1. Home genes in `parent2` are skipped.
/// Sequences of three or fewer genes, or parents that are not permutations of
/// each other, yield a copy of `parent1`.
pub fn order_crossover<R: Rng + ?Sized>(
    parent1: &[Waypoint],
    parent2: &[Waypoint],
    rules: &RouteRules,
    rng: &mut R,
) -> Vec<Waypoint> {
    let size = parent1.len();
    if size <= 3 || parent2.len() != size {
        return parent1.to_vec();
    }
    let (start, end) = interior_cuts(size, rng);

    let mut child: Vec<Option<Waypoint>> = vec![None; size];
    child[0] = Some(parent1[0].clone());
    child[size - 1] = Some(parent1[size - 1].clone());
    for pos in start..end {
        child[pos] = Some(parent1[pos].clone());
    }

    let kept: HashSet<&str> = parent1[start..end].iter().map(Waypoint::id).collect();
    let donors: Vec<&Waypoint> = parent2
        .iter()
        .filter(|gene| !rules.is_home(gene) && !kept.contains(gene.id()))
        .collect();

    let interior = size - 2;
    let open: Vec<usize> = (0..interior)
        .map(|step| 1 + (end - 1 + step) % interior)
        .filter(|&pos| child[pos].is_none())
        .collect();
    if open.len() != donors.len() {
        return parent1.to_vec();
    }
    for (pos, gene) in open.into_iter().zip(donors) {
        child[pos] = Some(gene.clone());
    }

    child
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .unwrap_or_else(|| parent1.to_vec())
}

/// Swap two distinct interior genes.
pub fn swap_mutation<R: Rng + ?Sized>(genes: &mut [Waypoint], rng: &mut R) {
    if genes.len() < 4 {
        return;
    }
    let (i, j) = interior_cuts(genes.len(), rng);
    genes.swap(i, j);
}

/// Reverse an interior sub-range `genes[i..=j]`.
pub fn inversion_mutation<R: Rng + ?Sized>(genes: &mut [Waypoint], rng: &mut R) {
    if genes.len() < 4 {
        return;
    }
    let (i, j) = interior_cuts(genes.len(), rng);
    genes[i..=j].reverse();
}

/// Apply swap or inversion with equal probability.
pub fn mutate<R: Rng + ?Sized>(genes: &mut [Waypoint], rng: &mut R) {
    if rng.gen_bool(0.5) {
        swap_mutation(genes, rng);
    } else {
        inversion_mutation(genes, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use std::sync::Arc;

    fn rules() -> RouteRules {
        RouteRules {
            home: Arc::from("H"),
            start_end_penalty: 10_000.0,
            duplicate_penalty: 5_000.0,
        }
    }

    fn tour(ids: &[&str]) -> Vec<Waypoint> {
        let mut genes = vec![Waypoint::new("H", 0.0, 0.0)];
        genes.extend(ids.iter().map(|id| Waypoint::new(*id, 0.0, 0.0)));
        genes.push(Waypoint::new("H", 0.0, 0.0));
        genes
    }

    fn sorted_interior(genes: &[Waypoint]) -> Vec<String> {
        let mut ids: Vec<String> = genes[1..genes.len() - 1]
            .iter()
            .map(|w| w.id().to_string())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn crossover_preserves_the_gene_set() {
        let mut rng = StdRng::seed_from_u64(11);
        let ids = ["a", "b", "c", "d", "e", "f", "g", "h"];
        for _ in 0..200 {
            let mut shuffled = ids.to_vec();
            shuffled.shuffle(&mut rng);
            let p1 = tour(&ids);
            let p2 = tour(&shuffled);
            let child = order_crossover(&p1, &p2, &rules(), &mut rng);
            assert_eq!(child.len(), p1.len());
            assert!(child[0].is("H") && child[child.len() - 1].is("H"));
            assert_eq!(sorted_interior(&child), sorted_interior(&p1));
        }
    }

    #[test]
    fn crossover_keeps_a_parent1_slice_in_place() {
        let mut rng = StdRng::seed_from_u64(5);
        let p1 = tour(&["a", "b", "c", "d", "e"]);
        let p2 = tour(&["e", "d", "c", "b", "a"]);
        let child = order_crossover(&p1, &p2, &rules(), &mut rng);
        let matches = child
            .iter()
            .zip(&p1)
            .skip(1)
            .take(5)
            .filter(|(c, p)| c == p)
            .count();
        assert!(matches >= 1);
    }

    #[test]
    fn tiny_routes_copy_parent_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let p1 = tour(&["a"]);
        let p2 = tour(&["b"]);
        assert_eq!(order_crossover(&p1, &p2, &rules(), &mut rng), p1);
    }

    #[test]
    fn mutations_leave_endpoints_alone() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let mut genes = tour(&["a", "b", "c", "d"]);
            mutate(&mut genes, &mut rng);
            assert!(genes[0].is("H") && genes[5].is("H"));
            assert_eq!(sorted_interior(&genes), vec!["a", "b", "c", "d"]);
        }
    }

    #[test]
    fn inversion_always_changes_order() {
        let mut rng = StdRng::seed_from_u64(2);
        let original = tour(&["a", "b", "c"]);
        let mut genes = original.clone();
        inversion_mutation(&mut genes, &mut rng);
        let ids: Vec<&str> = genes.iter().map(Waypoint::id).collect();
        let before: Vec<&str> = original.iter().map(Waypoint::id).collect();
        assert_ne!(ids, before);
    }

    #[test]
    fn tournament_returns_the_fittest_when_k_covers_everyone() {
        let mut rng = StdRng::seed_from_u64(4);
        let rules = rules();
        let mut members: Vec<Route> = (0..4)
            .map(|_| Route::new(tour(&["a", "b"]), &rules))
            .collect();
        for (i, route) in members.iter_mut().enumerate() {
            route.set_fitness(10.0 - i as f64);
        }
        let winner = tournament(&members, 10, &mut rng).expect("winner");
        assert_eq!(winner.fitness(), 7.0);
        assert!(tournament(&[], 3, &mut rng).is_none());
    }
}
