//! Leg-by-leg mission simulation: speed choice, recharges, overnight stops,
//! late fees and day-limit penalties.

use drone_battery::{AutonomyModel, Battery};
use drone_config::{FitnessModel, LateFeeBasis, MissionSettings, SpeedPolicy};
use drone_core::Waypoint;
use drone_core::constants::SECONDS_PER_DAY;
use drone_core::time::{minutes_to_seconds, mission_day_and_time, seconds_to_minutes};
use drone_weather::{WindForecast, WindSample};
use log::{debug, warn};

use crate::MissionError;
use crate::fitness;
use crate::leg::{Leg, LegOutcome};
use crate::route::{Alert, RechargeEvent, RechargeKind, Route};

/// Mutable state of one simulated flight. Owned by a single run.
#[derive(Debug, Clone)]
struct FlightContext {
    elapsed_s: u64,
    battery: Battery,
}

/// Evaluates routes against the drone, schedule and wind model.
///
/// The simulator only holds shared references and copies, so one instance can
/// evaluate many routes concurrently; battery state lives in each run.
#[derive(Debug, Clone)]
pub struct MissionSimulator<'a> {
    settings: &'a MissionSettings,
    forecast: &'a WindForecast,
    autonomy: AutonomyModel,
    day_start_s: u64,
    day_end_s: u64,
    late_fee_from_s: u64,
}

impl<'a> MissionSimulator<'a> {
    pub fn new(
        settings: &'a MissionSettings,
        forecast: &'a WindForecast,
    ) -> Result<Self, MissionError> {
        let autonomy = AutonomyModel::from_settings(&settings.drone);
        autonomy.autonomy_s(autonomy.min_speed())?;
        if let SpeedPolicy::Fixed(speed) = settings.drone.speed_policy {
            autonomy.autonomy_s(speed)?;
        }
        let schedule = &settings.schedule;
        Ok(Self {
            settings,
            forecast,
            autonomy,
            day_start_s: minutes_to_seconds(schedule.day_start_min),
            day_end_s: minutes_to_seconds(schedule.day_end_min),
            late_fee_from_s: minutes_to_seconds(schedule.late_fee_from_min),
        })
    }

    pub fn settings(&self) -> &'a MissionSettings {
        self.settings
    }

    pub fn autonomy(&self) -> &AutonomyModel {
        &self.autonomy
    }

    pub fn forecast(&self) -> &'a WindForecast {
        self.forecast
    }

    /// Simulate and score `route`, storing the fitness on it.
    pub fn evaluate(&self, route: &mut Route, model: &FitnessModel) -> f64 {
        self.simulate(route);
        let score = fitness::score(route, model);
        route.set_fitness(score);
        score
    }

    /// Recompute every run-derived field of `route` from a clean state.
    /// Structurally invalid routes are reset but not flown.
    pub fn simulate(&self, route: &mut Route) {
        route.reset_run();
        if !route.is_structurally_valid() {
            return;
        }
        if let Err(err) = self.fly(route) {
            warn!("route evaluation failed: {err}");
            route.alerts.push(Alert::SimulationFault(err.to_string()));
            route.metrics.invalidated = true;
        }
    }

    fn fly(&self, route: &mut Route) -> Result<(), MissionError> {
        let drone = &self.settings.drone;
        let penalties = &self.settings.penalties;
        let max_days = self.settings.schedule.max_days;
        let mut ctx = FlightContext {
            elapsed_s: 0,
            battery: Battery::full(self.autonomy.full_charge_s()),
        };
        let mut days_alert_raised = false;
        let mut landed_at_origin = false;
        let waypoints = route.waypoints().to_vec();

        for (index, pair) in waypoints.windows(2).enumerate() {
            let (origin, destination) = (&pair[0], &pair[1]);

            if self.after_hours(&ctx) && self.day(&ctx) < max_days {
                self.overnight(&mut ctx, origin, route);
                landed_at_origin = true;
            }

            let wind = self.wind_now(&ctx);
            let speed = self.select_speed(origin, destination, &ctx, &wind)?;
            let mut leg = Leg::plan(
                origin,
                destination,
                speed,
                self.day(&ctx),
                self.time_of_day(&ctx),
                &wind,
                &self.autonomy,
            )?;

            if leg.needs_recharge(ctx.battery.remaining_s(), drone.battery_reserve_s) {
                self.recharge(&mut ctx, origin, route);
                landed_at_origin = true;
                let wind = self.wind_now(&ctx);
                leg = Leg::plan(
                    origin,
                    destination,
                    speed,
                    self.day(&ctx),
                    self.time_of_day(&ctx),
                    &wind,
                    &self.autonomy,
                )?;
            }
            leg.landed_before = landed_at_origin;
            landed_at_origin = false;

            if !ctx.battery.consume(leg.battery_cost_s) {
                route.alerts.push(Alert::BatteryDepleted {
                    leg_index: index,
                    origin: origin.shared_id(),
                    destination: destination.shared_id(),
                });
            }
            ctx.elapsed_s += leg.flight_s + drone.stop_duration_s;
            route.metrics.distance_km += leg.distance_km;
            route.metrics.flight_minutes += leg.flight_minutes();
            let arrival_s = leg.arrival_s();
            route.legs.push(leg);

            let (days_elapsed, _) = mission_day_and_time(ctx.elapsed_s, self.day_start_s);
            if days_elapsed > max_days {
                if !days_alert_raised {
                    route.alerts.push(Alert::DaysExceeded {
                        days: days_elapsed,
                        max_days,
                    });
                    days_alert_raised = true;
                }
                if penalties.hard_day_limit {
                    route.metrics.invalidated = true;
                    route.metrics.mission_penalties += penalties.day_limit_exceeded;
                    break;
                }
                route.metrics.mission_penalties +=
                    penalties.per_extra_day * f64::from(days_elapsed - max_days);
            }
            if arrival_s > self.day_end_s {
                route.metrics.mission_penalties += penalties.late_arrival;
            }
        }

        self.finalize(&ctx, route);
        Ok(())
    }

    fn finalize(&self, ctx: &FlightContext, route: &mut Route) {
        let costs = &self.settings.costs;
        let metrics = &mut route.metrics;
        metrics.recharge_landings = route.recharges.len() as u32;
        metrics.late_fee_landings = route.recharges.iter().filter(|r| r.late_fee).count() as u32;
        metrics.cost = metrics.flight_minutes * costs.per_minute
            + f64::from(metrics.recharge_landings) * costs.recharge
            + f64::from(metrics.late_fee_landings) * costs.late_fee;
        metrics.days_used = mission_day_and_time(ctx.elapsed_s, self.day_start_s).0;
        metrics.mission_minutes = seconds_to_minutes(ctx.elapsed_s);
    }

    /// Heuristic airspeed for the next leg, or the configured fixed speed.
    fn select_speed(
        &self,
        origin: &Waypoint,
        destination: &Waypoint,
        ctx: &FlightContext,
        wind: &WindSample,
    ) -> Result<u32, MissionError> {
        if let SpeedPolicy::Fixed(speed) = self.settings.drone.speed_policy {
            return Ok(speed);
        }
        let heuristic = &self.settings.heuristic;
        let reserve_s = self.settings.drone.battery_reserve_s;
        let beta = heuristic.beta
            * (1.0 - ctx.battery.fraction_of(self.autonomy.reference_charge_s()));
        let (day, departure_s) = mission_day_and_time(ctx.elapsed_s, self.day_start_s);

        let mut best: Option<(u32, f64)> = None;
        for speed in self.autonomy.ladder.descending() {
            let leg = Leg::plan(
                origin,
                destination,
                speed,
                day,
                departure_s,
                wind,
                &self.autonomy,
            )?;
            let leg = match leg.assess(ctx.battery.remaining_s(), reserve_s) {
                LegOutcome::Fits(leg) => leg,
                LegOutcome::NeedsRecharge(_) => continue,
            };
            let score = heuristic.alpha * leg.flight_minutes() + beta * leg.consumption_pct;
            // strict comparison keeps the faster speed on ties
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((speed, score)),
            }
        }
        Ok(best.map_or(self.autonomy.min_speed(), |(speed, _)| speed))
    }

    fn recharge(&self, ctx: &mut FlightContext, at: &Waypoint, route: &mut Route) {
        let drone = &self.settings.drone;
        let (day, time_of_day) = mission_day_and_time(ctx.elapsed_s, self.day_start_s);
        let checked_at = match self.settings.costs.late_fee_basis {
            LateFeeBasis::Start => u64::from(time_of_day),
            LateFeeBasis::End => u64::from(time_of_day) + drone.recharge_duration_s,
        };
        let late_fee = checked_at >= self.late_fee_from_s;

        ctx.battery.recharge();
        route.recharges.push(RechargeEvent {
            day,
            time_of_day_s: time_of_day,
            waypoint: at.shared_id(),
            late_fee,
            kind: RechargeKind::Battery,
        });
        if u64::from(time_of_day) >= self.day_end_s {
            route.alerts.push(Alert::LandingAfterHours {
                day,
                time_of_day_s: time_of_day,
                waypoint: at.shared_id(),
            });
        }
        if late_fee {
            route.alerts.push(Alert::LateFee {
                day,
                time_of_day_s: time_of_day,
                waypoint: at.shared_id(),
            });
        }
        debug!(
            "recharge at {} on day {day} ({}s after start, late fee: {late_fee})",
            at.id(),
            ctx.elapsed_s
        );

        ctx.elapsed_s += drone.recharge_duration_s;
        if self.after_hours(ctx) && self.day(ctx) < self.settings.schedule.max_days {
            self.overnight(ctx, at, route);
        }
    }

    /// Land for the night: full battery, clock jumps to the next day's start.
    fn overnight(&self, ctx: &mut FlightContext, at: &Waypoint, route: &mut Route) {
        let (day, time_of_day) = mission_day_and_time(ctx.elapsed_s, self.day_start_s);
        ctx.battery.recharge();
        route.recharges.push(RechargeEvent {
            day,
            time_of_day_s: time_of_day,
            waypoint: at.shared_id(),
            late_fee: false,
            kind: RechargeKind::Overnight,
        });
        ctx.elapsed_s += SECONDS_PER_DAY - u64::from(time_of_day) + self.day_start_s;
        debug!("overnight stop at {} before day {}", at.id(), day + 1);
    }

    /// Calendar day of the mission clock, past midnight included.
    fn day(&self, ctx: &FlightContext) -> u32 {
        mission_day_and_time(ctx.elapsed_s, self.day_start_s).0
    }

    fn time_of_day(&self, ctx: &FlightContext) -> u32 {
        mission_day_and_time(ctx.elapsed_s, self.day_start_s).1
    }

    fn after_hours(&self, ctx: &FlightContext) -> bool {
        u64::from(self.time_of_day(ctx)) >= self.day_end_s
    }

    fn wind_now(&self, ctx: &FlightContext) -> WindSample {
        self.forecast.get_wind(self.day(ctx), self.time_of_day(ctx) / 60)
    }
}
