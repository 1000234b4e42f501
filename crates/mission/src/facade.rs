//! Re-exported APIs for consumers of the mission crate.

pub use crate::fitness::score;
pub use crate::leg::{Leg, LegOutcome};
pub use crate::route::{
    Alert, RechargeEvent, RechargeKind, Route, RouteMetrics, RouteRules, Violation,
};
pub use crate::simulator::MissionSimulator;
pub use drone_battery::{AutonomyModel, Battery, BatteryError, SpeedLadder};

/// Errors raised while setting up or flying a mission.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    #[error("battery model rejected the request: {0}")]
    Battery(#[from] BatteryError),
}

pub mod catalog {
    use drone_core::Waypoint;
    use thiserror::Error;

    use crate::route::{Route, RouteRules};

    /// Errors surfaced when resolving waypoint identifiers against a catalog.
    #[derive(Debug, Error, PartialEq)]
    pub enum CatalogError {
        #[error("waypoint '{0}' not found in catalog")]
        NotFound(String),
        #[error("home waypoint '{0}' not found in catalog")]
        MissingHome(String),
        #[error("waypoint catalog is empty")]
        EmptyCatalog,
    }

    /// Locate the home waypoint.
    pub fn home<'a>(
        catalog: &'a [Waypoint],
        rules: &RouteRules,
    ) -> Result<&'a Waypoint, CatalogError> {
        if catalog.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        catalog
            .iter()
            .find(|w| rules.is_home(w))
            .ok_or_else(|| CatalogError::MissingHome(rules.home.to_string()))
    }

    /// Every waypoint except home, in catalog order, without repeats.
    pub fn stops(catalog: &[Waypoint], rules: &RouteRules) -> Vec<Waypoint> {
        let mut seen = std::collections::HashSet::new();
        catalog
            .iter()
            .filter(|w| !rules.is_home(w))
            .filter(|w| seen.insert(w.id().to_string()))
            .cloned()
            .collect()
    }

    /// Build `home -> ids... -> home` from identifiers (case-sensitive).
    pub fn route_from_ids<S: AsRef<str>>(
        catalog: &[Waypoint],
        ids: &[S],
        rules: &RouteRules,
    ) -> Result<Route, CatalogError> {
        let home = home(catalog, rules)?.clone();
        let stops = ids
            .iter()
            .map(|id| {
                let id = id.as_ref().trim();
                catalog
                    .iter()
                    .find(|w| w.is(id))
                    .cloned()
                    .ok_or_else(|| CatalogError::NotFound(id.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Route::round_trip(home, stops, rules))
    }
}
