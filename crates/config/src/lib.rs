//! Configuration models and loaders for the drone route optimizer.
//!
//! A single [`MissionSettings`] value is built once (from defaults or a file)
//! and passed by reference to every component that needs parameters.

use std::fs::File;
use std::path::Path;

use log::warn;
use serde::Deserialize;
use thiserror::Error;

/// Complete, immutable parameter set for one optimisation run.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MissionSettings {
    /// Postal code of the mandatory start/end waypoint.
    pub home: String,
    pub drone: DroneSettings,
    pub schedule: ScheduleSettings,
    pub costs: CostSettings,
    pub penalties: PenaltySettings,
    pub heuristic: HeuristicSettings,
    pub fitness: FitnessModel,
    pub genetic: GeneticSettings,
    pub refinement: RefinementSettings,
    pub wind: WindSettings,
}

impl Default for MissionSettings {
    fn default() -> Self {
        Self {
            home: "82821020".to_string(),
            drone: DroneSettings::default(),
            schedule: ScheduleSettings::default(),
            costs: CostSettings::default(),
            penalties: PenaltySettings::default(),
            heuristic: HeuristicSettings::default(),
            fitness: FitnessModel::default(),
            genetic: GeneticSettings::default(),
            refinement: RefinementSettings::default(),
            wind: WindSettings::default(),
        }
    }
}

/// Airframe, battery and ground-handling parameters.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DroneSettings {
    pub reference_speed_kmh: f64,
    pub reference_autonomy_s: f64,
    pub correction_factor: f64,
    pub min_speed_kmh: u32,
    pub max_speed_kmh: u32,
    pub speed_step_kmh: u32,
    /// Charge that must stay in the battery when a leg ends.
    pub battery_reserve_s: f64,
    /// Photo stop taken at every destination.
    pub stop_duration_s: u64,
    pub recharge_duration_s: u64,
    pub speed_policy: SpeedPolicy,
}

impl Default for DroneSettings {
    fn default() -> Self {
        Self {
            reference_speed_kmh: 36.0,
            reference_autonomy_s: 5_000.0,
            correction_factor: 0.93,
            min_speed_kmh: 36,
            max_speed_kmh: 96,
            speed_step_kmh: 4,
            battery_reserve_s: 300.0,
            stop_duration_s: 72,
            recharge_duration_s: 72,
            speed_policy: SpeedPolicy::Heuristic,
        }
    }
}

impl DroneSettings {
    /// Whether `reference_speed_kmh` is one of the ladder's rungs.
    pub fn reference_speed_on_ladder(&self) -> bool {
        let speed = self.reference_speed_kmh;
        if self.speed_step_kmh == 0 || speed.fract() != 0.0 {
            return false;
        }
        let (min, max) = (f64::from(self.min_speed_kmh), f64::from(self.max_speed_kmh));
        (min..=max).contains(&speed) && (speed - min) % f64::from(self.speed_step_kmh) == 0.0
    }
}

/// How the simulator picks the airspeed of each leg.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeedPolicy {
    /// Cost heuristic over the whole speed ladder.
    #[default]
    Heuristic,
    /// Always fly at this speed (km/h).
    Fixed(u32),
}

/// Operating window, expressed in minutes since midnight.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScheduleSettings {
    pub day_start_min: u32,
    pub day_end_min: u32,
    pub late_fee_from_min: u32,
    pub max_days: u32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            day_start_min: 6 * 60,
            day_end_min: 19 * 60,
            late_fee_from_min: 17 * 60,
            max_days: 7,
        }
    }
}

/// Point in a recharge at which the late-fee window is checked.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LateFeeBasis {
    #[default]
    Start,
    End,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CostSettings {
    pub recharge: f64,
    pub late_fee: f64,
    pub per_minute: f64,
    pub late_fee_basis: LateFeeBasis,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            recharge: 80.0,
            late_fee: 80.0,
            per_minute: 0.0,
            late_fee_basis: LateFeeBasis::Start,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PenaltySettings {
    pub start_end: f64,
    pub duplicate: f64,
    /// Invalidate routes that exceed `max_days` instead of scaling a penalty.
    pub hard_day_limit: bool,
    pub day_limit_exceeded: f64,
    pub per_extra_day: f64,
    pub late_arrival: f64,
}

impl Default for PenaltySettings {
    fn default() -> Self {
        Self {
            start_end: 10_000.0,
            duplicate: 5_000.0,
            hard_day_limit: false,
            day_limit_exceeded: 100_000.0,
            per_extra_day: 10_000.0,
            late_arrival: 1_000.0,
        }
    }
}

/// Weights of the per-leg speed heuristic.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HeuristicSettings {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for HeuristicSettings {
    fn default() -> Self {
        Self {
            alpha: 3.0,
            beta: 1.0,
        }
    }
}

/// Fitness formulation (lower is better).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FitnessModel {
    /// `cost + penalties + distance_weight * distance / distance_normalization`.
    CostPenaltyDistance {
        #[serde(default = "default_distance_weight")]
        distance_weight: f64,
        #[serde(default = "default_distance_normalization")]
        distance_normalization: f64,
    },
    /// Weighted sum of time, cost, penalty and distance terms, scaled up for
    /// long missions.
    Weighted {
        #[serde(default = "default_time_weight")]
        time_weight: f64,
        #[serde(default = "one")]
        cost_weight: f64,
        #[serde(default = "default_penalty_weight")]
        penalty_weight: f64,
        #[serde(default)]
        distance_weight: f64,
        #[serde(default = "default_distance_normalization")]
        distance_normalization: f64,
        #[serde(default = "default_many_days_threshold")]
        many_days_threshold: u32,
        #[serde(default = "default_many_days_multiplier")]
        many_days_multiplier: f64,
    },
}

impl Default for FitnessModel {
    fn default() -> Self {
        FitnessModel::CostPenaltyDistance {
            distance_weight: default_distance_weight(),
            distance_normalization: default_distance_normalization(),
        }
    }
}

fn default_distance_weight() -> f64 {
    10.0
}

fn default_distance_normalization() -> f64 {
    8.0
}

fn default_time_weight() -> f64 {
    0.5
}

fn one() -> f64 {
    1.0
}

fn default_penalty_weight() -> f64 {
    10.0
}

fn default_many_days_threshold() -> u32 {
    6
}

fn default_many_days_multiplier() -> f64 {
    1.1
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GeneticSettings {
    pub population_size: usize,
    pub generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub min_mutation_rate: f64,
    pub max_mutation_rate: f64,
    pub mutation_growth: f64,
    pub mutation_decay: f64,
    pub elite_fraction: f64,
    pub elite_polish: ElitePolish,
    pub tournament_size: usize,
    pub seed: Option<u64>,
    /// Evaluate individuals on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GeneticSettings {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.02,
            min_mutation_rate: 0.02,
            max_mutation_rate: 0.2,
            mutation_growth: 1.5,
            mutation_decay: 0.95,
            elite_fraction: 0.1,
            elite_polish: ElitePolish::Always,
            tournament_size: 5,
            seed: None,
            parallel: true,
        }
    }
}

/// Fate of an elite's inverted copy when it enters the next generation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ElitePolish {
    /// The inverted copy always replaces the elite.
    #[default]
    Always,
    /// Keep the inverted copy only when it scores no worse.
    IfNotWorse,
}

/// 2-opt pass applied to the best route after the GA.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RefinementSettings {
    pub enabled: bool,
    pub max_iterations: usize,
    pub epsilon_km: f64,
}

impl Default for RefinementSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: 1_000,
            epsilon_km: 1e-6,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindSettings {
    /// Start hour of each forecast bucket, ascending.
    pub bucket_start_hours: Vec<u32>,
}

impl Default for WindSettings {
    fn default() -> Self {
        Self {
            bucket_start_hours: vec![6, 9, 12, 15, 18, 21],
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl MissionSettings {
    /// Reject parameter combinations the simulator or GA cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let drone = &self.drone;
        if self.home.trim().is_empty() {
            return Err(invalid("home", "home postal code is empty"));
        }
        if drone.speed_step_kmh == 0 {
            return Err(invalid("drone.speed_step_kmh", "step must be positive"));
        }
        if drone.min_speed_kmh == 0 || drone.min_speed_kmh > drone.max_speed_kmh {
            return Err(invalid(
                "drone.min_speed_kmh",
                format!(
                    "speed range {}..={} is empty",
                    drone.min_speed_kmh, drone.max_speed_kmh
                ),
            ));
        }
        if drone.reference_speed_kmh <= 0.0 || drone.reference_autonomy_s <= 0.0 {
            return Err(invalid(
                "drone.reference_autonomy_s",
                "reference speed and autonomy must be positive",
            ));
        }
        if !drone.reference_speed_on_ladder() {
            warn!(
                "reference speed {} km/h is not on the {}..={} km/h ladder",
                drone.reference_speed_kmh, drone.min_speed_kmh, drone.max_speed_kmh
            );
        }
        if let SpeedPolicy::Fixed(speed) = drone.speed_policy {
            let on_ladder = speed >= drone.min_speed_kmh
                && speed <= drone.max_speed_kmh
                && (speed - drone.min_speed_kmh) % drone.speed_step_kmh == 0;
            if !on_ladder {
                return Err(invalid(
                    "drone.speed_policy",
                    format!("fixed speed {speed} km/h is not on the speed ladder"),
                ));
            }
        }
        let schedule = &self.schedule;
        if schedule.day_start_min >= schedule.day_end_min || schedule.day_end_min > 24 * 60 {
            return Err(invalid(
                "schedule.day_end_min",
                "operating window must satisfy start < end <= 1440",
            ));
        }
        if schedule.max_days == 0 {
            return Err(invalid("schedule.max_days", "at least one day is required"));
        }
        let genetic = &self.genetic;
        if genetic.population_size < 2 {
            return Err(invalid("genetic.population_size", "need at least 2 individuals"));
        }
        if genetic.tournament_size == 0 {
            return Err(invalid("genetic.tournament_size", "must be at least 1"));
        }
        for (field, rate) in [
            ("genetic.crossover_rate", genetic.crossover_rate),
            ("genetic.mutation_rate", genetic.mutation_rate),
            ("genetic.min_mutation_rate", genetic.min_mutation_rate),
            ("genetic.max_mutation_rate", genetic.max_mutation_rate),
            ("genetic.elite_fraction", genetic.elite_fraction),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(field, format!("{rate} is outside [0, 1]")));
            }
        }
        if genetic.min_mutation_rate > genetic.max_mutation_rate {
            return Err(invalid(
                "genetic.min_mutation_rate",
                "minimum mutation rate exceeds the maximum",
            ));
        }
        if self.wind.bucket_start_hours.is_empty() {
            return Err(invalid("wind.bucket_start_hours", "no forecast buckets"));
        }
        if self.wind.bucket_start_hours.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid(
                "wind.bucket_start_hours",
                "bucket hours must be strictly ascending",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Load and validate settings from a `.toml` file or a YAML document.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<MissionSettings, ConfigError> {
    let settings: MissionSettings = load_record(path)?;
    settings.validate()?;
    Ok(settings)
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        MissionSettings::default().validate().expect("defaults validate");
    }

    #[test]
    fn off_ladder_reference_speed_is_allowed() {
        let mut settings = MissionSettings::default();
        assert!(settings.drone.reference_speed_on_ladder());
        settings.drone.reference_speed_kmh = 38.0;
        assert!(!settings.drone.reference_speed_on_ladder());
        settings.drone.reference_speed_kmh = 36.5;
        assert!(!settings.drone.reference_speed_on_ladder());
        settings.drone.reference_speed_kmh = 120.0;
        assert!(!settings.drone.reference_speed_on_ladder());
        settings.validate().expect("only logged");
    }

    #[test]
    fn elite_polish_parses_from_yaml() {
        let settings: MissionSettings =
            serde_yaml::from_str("genetic:\n  elite_polish: if_not_worse\n").expect("yaml parses");
        assert_eq!(settings.genetic.elite_polish, ElitePolish::IfNotWorse);
        assert_eq!(MissionSettings::default().genetic.elite_polish, ElitePolish::Always);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let text = r#"
home = "80000000"

[drone]
recharge_duration_s = 1800
speed_policy = { fixed = 48 }

[costs]
late_fee_basis = "end"

[fitness]
model = "weighted"
time_weight = 0.25
"#;
        let settings: MissionSettings = toml::from_str(text).expect("toml parses");
        assert_eq!(settings.home, "80000000");
        assert_eq!(settings.drone.recharge_duration_s, 1_800);
        assert_eq!(settings.drone.speed_policy, SpeedPolicy::Fixed(48));
        assert_eq!(settings.drone.max_speed_kmh, 96);
        assert_eq!(settings.costs.late_fee_basis, LateFeeBasis::End);
        match settings.fitness {
            FitnessModel::Weighted {
                time_weight,
                penalty_weight,
                many_days_multiplier,
                ..
            } => {
                assert!((time_weight - 0.25).abs() < 1e-12);
                assert!((penalty_weight - 10.0).abs() < 1e-12);
                assert!((many_days_multiplier - 1.1).abs() < 1e-12);
            }
            other => panic!("unexpected fitness model {other:?}"),
        }
        settings.validate().expect("valid");
    }

    #[test]
    fn yaml_is_accepted() {
        let text = "schedule:\n  max_days: 3\nwind:\n  bucket_start_hours: [6, 9, 12, 15, 18]\n";
        let settings: MissionSettings = serde_yaml::from_str(text).expect("yaml parses");
        assert_eq!(settings.schedule.max_days, 3);
        assert_eq!(settings.wind.bucket_start_hours.len(), 5);
    }

    #[test]
    fn off_ladder_fixed_speed_is_rejected() {
        let mut settings = MissionSettings::default();
        settings.drone.speed_policy = SpeedPolicy::Fixed(38);
        let err = settings.validate().expect_err("38 km/h is off the ladder");
        assert!(matches!(err, ConfigError::Invalid { field: "drone.speed_policy", .. }));
    }

    #[test]
    fn rates_outside_unit_interval_are_rejected() {
        let mut settings = MissionSettings::default();
        settings.genetic.crossover_rate = 1.5;
        assert!(settings.validate().is_err());
    }
}
