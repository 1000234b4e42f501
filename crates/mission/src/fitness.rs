//! Scalar route score; lower is better and infeasible routes score `+inf`.

use drone_config::FitnessModel;

use crate::route::Route;

pub fn score(route: &Route, model: &FitnessModel) -> f64 {
    if !route.is_feasible() {
        return f64::INFINITY;
    }
    let metrics = route.metrics();
    match *model {
        FitnessModel::CostPenaltyDistance {
            distance_weight,
            distance_normalization,
        } => {
            metrics.cost
                + route.penalties()
                + distance_weight * normalized(metrics.distance_km, distance_normalization)
        }
        FitnessModel::Weighted {
            time_weight,
            cost_weight,
            penalty_weight,
            distance_weight,
            distance_normalization,
            many_days_threshold,
            many_days_multiplier,
        } => {
            let total = time_weight * metrics.flight_minutes
                + cost_weight * metrics.cost
                + penalty_weight * route.penalties()
                + distance_weight * normalized(metrics.distance_km, distance_normalization);
            if metrics.days_used >= many_days_threshold {
                total * many_days_multiplier
            } else {
                total
            }
        }
    }
}

/// Non-positive normalisation constants fall back to the raw distance.
fn normalized(distance_km: f64, normalization: f64) -> f64 {
    if normalization > 0.0 {
        distance_km / normalization
    } else {
        distance_km
    }
}
