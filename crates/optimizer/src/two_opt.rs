//! Geometric 2-opt refinement. Wind and schedule are ignored here; the caller
//! re-simulates the refined sequence.

use drone_core::Waypoint;
use drone_geodesy::{haversine_km, path_length_km};
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct TwoOptReport {
    pub waypoints: Vec<Waypoint>,
    /// Improving moves applied.
    pub iterations: usize,
    pub improved: bool,
    pub initial_km: f64,
    pub final_km: f64,
}

/// First-improvement 2-opt over the interior of a closed route: apply the
/// first move that shortens the path by more than `epsilon_km`, then rescan
/// from the start. Endpoints stay fixed. Routes with fewer than four
/// waypoints are returned unchanged.
pub fn two_opt(waypoints: &[Waypoint], max_iterations: usize, epsilon_km: f64) -> TwoOptReport {
    let initial_km = path_length_km(waypoints);
    let mut route = waypoints.to_vec();
    let mut iterations = 0;

    if route.len() >= 4 {
        while iterations < max_iterations {
            let Some((i, j)) = first_improvement(&route, epsilon_km) else {
                break;
            };
            route[i..=j].reverse();
            iterations += 1;
        }
    }

    let final_km = path_length_km(&route);
    debug!("2-opt: {initial_km:.3} km -> {final_km:.3} km after {iterations} moves");
    TwoOptReport {
        waypoints: route,
        iterations,
        improved: iterations > 0,
        initial_km,
        final_km,
    }
}

fn first_improvement(route: &[Waypoint], epsilon_km: f64) -> Option<(usize, usize)> {
    let n = route.len();
    for i in 1..n - 2 {
        for j in i + 1..n - 1 {
            let delta = haversine_km(&route[i - 1], &route[j])
                + haversine_km(&route[i], &route[j + 1])
                - haversine_km(&route[i - 1], &route[i])
                - haversine_km(&route[j], &route[j + 1]);
            if delta < -epsilon_km {
                return Some((i, j));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_crossing() -> Vec<Waypoint> {
        vec![
            Waypoint::new("H", 0.0, 0.0),
            Waypoint::new("a", 0.0, 0.1),
            Waypoint::new("c", 0.1, 0.0),
            Waypoint::new("b", 0.1, 0.1),
            Waypoint::new("H", 0.0, 0.0),
        ]
    }

    #[test]
    fn uncrosses_a_crossed_square() {
        let report = two_opt(&square_with_crossing(), 100, 1e-6);
        assert!(report.improved);
        assert!(report.final_km < report.initial_km);
        let ids: Vec<&str> = report.waypoints.iter().map(Waypoint::id).collect();
        assert_eq!(ids, ["H", "a", "b", "c", "H"]);
    }

    #[test]
    fn never_lengthens_and_keeps_endpoints() {
        let route: Vec<Waypoint> = (0..9)
            .map(|i| {
                let id = if i == 0 || i == 8 {
                    "H".to_string()
                } else {
                    format!("p{i}")
                };
                let angle = (i * 137 % 360) as f64;
                Waypoint::new(id, angle.to_radians().sin() * 0.05, angle.to_radians().cos() * 0.05)
            })
            .collect();
        let report = two_opt(&route, 1000, 1e-6);
        assert!(report.final_km <= report.initial_km + 1e-9);
        assert!(report.waypoints[0].is("H") && report.waypoints[8].is("H"));
        assert_eq!(report.waypoints.len(), route.len());
    }

    #[test]
    fn short_routes_are_untouched() {
        let route = vec![
            Waypoint::new("H", 0.0, 0.0),
            Waypoint::new("a", 0.0, 0.1),
            Waypoint::new("H", 0.0, 0.0),
        ];
        let report = two_opt(&route, 10, 1e-6);
        assert_eq!(report.waypoints, route);
        assert_eq!(report.iterations, 0);
        assert!(!report.improved);
    }
}
