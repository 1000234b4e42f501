//! One hop between consecutive waypoints at a fixed airspeed and departure time.

use drone_battery::{AutonomyModel, BatteryError};
use drone_core::Waypoint;
use drone_core::units::travel_seconds;
use drone_geodesy::{bearing_deg, ground_speed_kmh, haversine_km};
use drone_weather::WindSample;

/// Planned leg. Immutable once computed, apart from the landing flag set by
/// the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub airspeed_kmh: u32,
    /// Mission day (1-based) at departure.
    pub day: u32,
    /// Departure time, seconds since midnight.
    pub departure_s: u32,
    pub wind: WindSample,
    pub distance_km: f64,
    pub course_deg: f64,
    pub ground_speed_kmh: f64,
    /// Whole seconds in the air, at least one.
    pub flight_s: u64,
    /// Battery drawn by the leg (equal to the flight time).
    pub battery_cost_s: f64,
    /// Share of a full charge at this airspeed consumed by the leg (%).
    pub consumption_pct: f64,
    /// The drone landed and recharged at the origin right before departing.
    pub landed_before: bool,
}

/// Result of checking a planned leg against the battery.
#[derive(Debug, Clone, PartialEq)]
pub enum LegOutcome {
    Fits(Leg),
    NeedsRecharge(Leg),
}

impl Leg {
    /// Plan `origin -> destination` at `airspeed_kmh`, departing on `day` at
    /// `departure_s`, under `wind`.
    pub fn plan(
        origin: &Waypoint,
        destination: &Waypoint,
        airspeed_kmh: u32,
        day: u32,
        departure_s: u32,
        wind: &WindSample,
        autonomy: &AutonomyModel,
    ) -> Result<Self, BatteryError> {
        let full_charge_s = autonomy.autonomy_s(airspeed_kmh)?;
        let distance_km = haversine_km(origin, destination);
        let course_deg = bearing_deg(origin, destination);
        let ground_speed =
            ground_speed_kmh(f64::from(airspeed_kmh), course_deg, wind.speed_kmh, wind.toward_deg);
        let flight_s = (travel_seconds(distance_km, ground_speed).ceil() as u64).max(1);
        let battery_cost_s = flight_s as f64;
        Ok(Self {
            origin: origin.clone(),
            destination: destination.clone(),
            airspeed_kmh,
            day,
            departure_s,
            wind: *wind,
            distance_km,
            course_deg,
            ground_speed_kmh: ground_speed,
            flight_s,
            battery_cost_s,
            consumption_pct: battery_cost_s / full_charge_s * 100.0,
            landed_before: false,
        })
    }

    /// Arrival time in seconds since the departure day's midnight (may exceed
    /// one day for late legs).
    pub fn arrival_s(&self) -> u64 {
        u64::from(self.departure_s) + self.flight_s
    }

    pub fn flight_minutes(&self) -> f64 {
        self.flight_s as f64 / 60.0
    }

    /// True when flying the leg would cut into the safety reserve.
    pub fn needs_recharge(&self, battery_s: f64, reserve_s: f64) -> bool {
        self.battery_cost_s + reserve_s > battery_s
    }

    pub fn assess(self, battery_s: f64, reserve_s: f64) -> LegOutcome {
        if self.needs_recharge(battery_s, reserve_s) {
            LegOutcome::NeedsRecharge(self)
        } else {
            LegOutcome::Fits(self)
        }
    }
}
