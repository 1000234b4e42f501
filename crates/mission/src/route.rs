//! Candidate route: an ordered waypoint sequence plus the outcome of its most
//! recent simulation.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use drone_config::MissionSettings;
use drone_core::Waypoint;
use drone_core::time::clock;
use drone_geodesy::path_length_km;

use crate::leg::Leg;

/// Structural rules every route is checked against on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRules {
    pub home: Arc<str>,
    pub start_end_penalty: f64,
    pub duplicate_penalty: f64,
}

impl RouteRules {
    pub fn from_settings(settings: &MissionSettings) -> Self {
        Self {
            home: Arc::from(settings.home.as_str()),
            start_end_penalty: settings.penalties.start_end,
            duplicate_penalty: settings.penalties.duplicate,
        }
    }

    pub fn is_home(&self, waypoint: &Waypoint) -> bool {
        waypoint.is(&self.home)
    }
}

/// Reason a route is structurally infeasible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    TooShort,
    StartNotHome,
    EndNotHome,
    Duplicate(Arc<str>),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::TooShort => write!(f, "route has fewer than two waypoints"),
            Violation::StartNotHome => write!(f, "route does not start at home"),
            Violation::EndNotHome => write!(f, "route does not end at home"),
            Violation::Duplicate(id) => write!(f, "waypoint {id} is visited more than once"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RechargeKind {
    /// Forced end-of-day landing; never charged a late fee.
    Overnight,
    /// Landing because the next leg would cut into the reserve.
    Battery,
}

/// A landing to refill the battery.
#[derive(Debug, Clone, PartialEq)]
pub struct RechargeEvent {
    pub day: u32,
    /// Landing time, seconds since midnight.
    pub time_of_day_s: u32,
    pub waypoint: Arc<str>,
    pub late_fee: bool,
    pub kind: RechargeKind,
}

/// Operational warnings raised while simulating.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    LandingAfterHours {
        day: u32,
        time_of_day_s: u32,
        waypoint: Arc<str>,
    },
    LateFee {
        day: u32,
        time_of_day_s: u32,
        waypoint: Arc<str>,
    },
    DaysExceeded {
        days: u32,
        max_days: u32,
    },
    BatteryDepleted {
        leg_index: usize,
        origin: Arc<str>,
        destination: Arc<str>,
    },
    SimulationFault(String),
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::LandingAfterHours {
                day,
                time_of_day_s,
                waypoint,
            } => write!(
                f,
                "landing after hours at {waypoint} on day {day} {}",
                clock(u64::from(*time_of_day_s))
            ),
            Alert::LateFee {
                day,
                time_of_day_s,
                waypoint,
            } => write!(
                f,
                "late fee charged at {waypoint} on day {day} {}",
                clock(u64::from(*time_of_day_s))
            ),
            Alert::DaysExceeded { days, max_days } => {
                write!(f, "mission needs {days} days, limit is {max_days}")
            }
            Alert::BatteryDepleted {
                leg_index,
                origin,
                destination,
            } => write!(
                f,
                "battery depleted on leg {leg_index} ({origin} -> {destination})"
            ),
            Alert::SimulationFault(message) => write!(f, "simulation fault: {message}"),
        }
    }
}

/// Totals of the latest simulation. Every field is reset before each run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteMetrics {
    pub distance_km: f64,
    /// Time in the air, minutes.
    pub flight_minutes: f64,
    /// Elapsed mission time including stops, recharges and nights, minutes.
    pub mission_minutes: f64,
    pub cost: f64,
    pub recharge_landings: u32,
    pub late_fee_landings: u32,
    pub days_used: u32,
    /// Penalties added by the simulation (day limit, late arrivals).
    pub mission_penalties: f64,
    /// Hard day-limit invalidation of the latest run.
    pub invalidated: bool,
}

#[derive(Debug, Clone)]
pub struct Route {
    waypoints: Vec<Waypoint>,
    violations: Vec<Violation>,
    structural_penalty: f64,
    pub(crate) metrics: RouteMetrics,
    pub(crate) legs: Vec<Leg>,
    pub(crate) recharges: Vec<RechargeEvent>,
    pub(crate) alerts: Vec<Alert>,
    fitness: f64,
}

impl Route {
    /// Build a route and check its structure. Violations are permanent for
    /// this value; a modified sequence must go through `new` again.
    pub fn new(waypoints: Vec<Waypoint>, rules: &RouteRules) -> Self {
        let mut violations = Vec::new();
        let mut structural_penalty = 0.0;

        let starts_home = waypoints.first().is_some_and(|w| rules.is_home(w));
        if waypoints.len() < 2 || !starts_home {
            violations.push(if waypoints.len() < 2 {
                Violation::TooShort
            } else {
                Violation::StartNotHome
            });
            structural_penalty += rules.start_end_penalty;
        }
        if let Some(last) = waypoints.last() {
            if !rules.is_home(last) {
                violations.push(Violation::EndNotHome);
                structural_penalty += rules.start_end_penalty;
            }
        }
        if waypoints.len() > 2 {
            let mut seen: HashSet<&str> = HashSet::new();
            for waypoint in &waypoints[1..waypoints.len() - 1] {
                if rules.is_home(waypoint) {
                    continue;
                }
                if !seen.insert(waypoint.id()) {
                    violations.push(Violation::Duplicate(waypoint.shared_id()));
                    structural_penalty += rules.duplicate_penalty;
                    break;
                }
            }
        }

        Self {
            waypoints,
            violations,
            structural_penalty,
            metrics: RouteMetrics::default(),
            legs: Vec::new(),
            recharges: Vec::new(),
            alerts: Vec::new(),
            fitness: f64::INFINITY,
        }
    }

    /// `[home] + stops + [home]`.
    pub fn round_trip(
        home: Waypoint,
        stops: impl IntoIterator<Item = Waypoint>,
        rules: &RouteRules,
    ) -> Self {
        let mut waypoints = vec![home.clone()];
        waypoints.extend(stops);
        waypoints.push(home);
        Self::new(waypoints, rules)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Waypoints between the two endpoints.
    pub fn interior(&self) -> &[Waypoint] {
        if self.waypoints.len() < 2 {
            return &[];
        }
        &self.waypoints[1..self.waypoints.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn is_structurally_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Structurally valid and not invalidated by the latest simulation.
    pub fn is_feasible(&self) -> bool {
        self.is_structurally_valid() && !self.metrics.invalidated
    }

    pub fn structural_penalty(&self) -> f64 {
        self.structural_penalty
    }

    pub fn penalties(&self) -> f64 {
        self.structural_penalty + self.metrics.mission_penalties
    }

    pub fn metrics(&self) -> &RouteMetrics {
        &self.metrics
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn recharges(&self) -> &[RechargeEvent] {
        &self.recharges
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Straight-line length of the waypoint sequence, independent of wind.
    pub fn geometric_distance_km(&self) -> f64 {
        path_length_km(&self.waypoints)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.waypoints.iter().map(Waypoint::id).collect()
    }

    pub(crate) fn reset_run(&mut self) {
        self.metrics = RouteMetrics::default();
        self.legs.clear();
        self.recharges.clear();
        self.alerts.clear();
        self.fitness = f64::INFINITY;
    }
}
