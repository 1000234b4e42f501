//! Battery autonomy model, discrete speed ladder, and per-flight battery state.

use drone_config::DroneSettings;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BatteryError {
    #[error("invalid speed {speed_kmh} km/h: expected {min}..={max} km/h in steps of {step}")]
    InvalidSpeed {
        speed_kmh: u32,
        min: u32,
        max: u32,
        step: u32,
    },
}

/// Inclusive ladder of commandable airspeeds `{min, min+step, ..., max}` (km/h).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedLadder {
    pub min_kmh: u32,
    pub max_kmh: u32,
    pub step_kmh: u32,
}

impl SpeedLadder {
    pub fn new(min_kmh: u32, max_kmh: u32, step_kmh: u32) -> Self {
        Self {
            min_kmh,
            max_kmh,
            step_kmh: step_kmh.max(1),
        }
    }

    pub fn contains(&self, speed_kmh: u32) -> bool {
        speed_kmh >= self.min_kmh
            && speed_kmh <= self.max_kmh
            && (speed_kmh - self.min_kmh) % self.step_kmh == 0
    }

    /// Ascending list of valid speeds.
    pub fn speeds(&self) -> Vec<u32> {
        (self.min_kmh..=self.max_kmh)
            .step_by(self.step_kmh as usize)
            .collect()
    }

    /// Fastest first, the order the speed search walks.
    pub fn descending(&self) -> Vec<u32> {
        let mut speeds = self.speeds();
        speeds.reverse();
        speeds
    }

    /// Largest speed on the ladder (`max` itself only when it is reachable).
    pub fn top(&self) -> u32 {
        self.min_kmh + (self.max_kmh - self.min_kmh) / self.step_kmh * self.step_kmh
    }
}

/// Empirical inverse-square autonomy law:
/// `autonomy(v) = A0 * (v_ref / v)^2 * correction_factor` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutonomyModel {
    pub reference_autonomy_s: f64,
    pub reference_speed_kmh: f64,
    pub correction_factor: f64,
    pub ladder: SpeedLadder,
}

impl AutonomyModel {
    pub fn from_settings(settings: &DroneSettings) -> Self {
        Self {
            reference_autonomy_s: settings.reference_autonomy_s,
            reference_speed_kmh: settings.reference_speed_kmh,
            correction_factor: settings.correction_factor,
            ladder: SpeedLadder::new(
                settings.min_speed_kmh,
                settings.max_speed_kmh,
                settings.speed_step_kmh,
            ),
        }
    }

    /// Flight time (s) a full battery provides at `speed_kmh`.
    pub fn autonomy_s(&self, speed_kmh: u32) -> Result<f64, BatteryError> {
        if !self.ladder.contains(speed_kmh) {
            return Err(BatteryError::InvalidSpeed {
                speed_kmh,
                min: self.ladder.min_kmh,
                max: self.ladder.max_kmh,
                step: self.ladder.step_kmh,
            });
        }
        let ratio = self.reference_speed_kmh / f64::from(speed_kmh);
        Ok(self.reference_autonomy_s * ratio * ratio * self.correction_factor)
    }

    pub fn valid_speeds(&self) -> Vec<u32> {
        self.ladder.speeds()
    }

    pub fn min_speed(&self) -> u32 {
        self.ladder.min_kmh
    }

    pub fn max_speed(&self) -> u32 {
        self.ladder.top()
    }

    /// Autonomy at the reference speed, `A0 * correction_factor`.
    pub fn reference_charge_s(&self) -> f64 {
        self.reference_autonomy_s * self.correction_factor
    }

    /// Capacity of a full battery: the autonomy at the default cruise speed,
    /// which is the slowest rung of the ladder.
    pub fn full_charge_s(&self) -> f64 {
        let ratio = self.reference_speed_kmh / f64::from(self.ladder.min_kmh);
        self.reference_autonomy_s * ratio * ratio * self.correction_factor
    }
}

impl Default for AutonomyModel {
    fn default() -> Self {
        Self::from_settings(&DroneSettings::default())
    }
}

/// Remaining charge of one simulated flight, in seconds of flight time.
///
/// Each simulation owns its own `Battery`; nothing here is shared between runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Battery {
    capacity_s: f64,
    remaining_s: f64,
}

impl Battery {
    pub fn full(capacity_s: f64) -> Self {
        Self {
            capacity_s,
            remaining_s: capacity_s,
        }
    }

    pub fn recharge(&mut self) {
        self.remaining_s = self.capacity_s;
    }

    /// Draw `seconds` of flight time. Returns `false` once the battery is
    /// depleted.
    pub fn consume(&mut self, seconds: f64) -> bool {
        self.remaining_s -= seconds;
        self.remaining_s > 0.0
    }

    pub fn remaining_s(&self) -> f64 {
        self.remaining_s
    }

    pub fn capacity_s(&self) -> f64 {
        self.capacity_s
    }

    /// Charge level relative to `reference_s`, clamped to `[0, 1]`.
    pub fn fraction_of(&self, reference_s: f64) -> f64 {
        if reference_s <= 0.0 {
            return 0.0;
        }
        (self.remaining_s / reference_s).clamp(0.0, 1.0)
    }
}
