//! Core units, constants, and shared primitives for the drone route optimizer workspace.

mod waypoint;

pub use waypoint::Waypoint;

/// Physical and calendar constants.
pub mod constants {
    /// Mean Earth radius used by the haversine formula (km).
    pub const EARTH_RADIUS_KM: f64 = 6_371.0;
    /// Seconds per minute.
    pub const SECONDS_PER_MINUTE: u64 = 60;
    /// Seconds per civil day.
    pub const SECONDS_PER_DAY: u64 = 86_400;
    /// Seconds per hour, as a float for speed conversions.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::SECONDS_PER_HOUR;

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v.to_radians()
    }

    /// Normalise an angle in degrees into `[0, 360)`.
    #[inline]
    pub fn normalize_deg(v: f64) -> f64 {
        let wrapped = v.rem_euclid(360.0);
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }

    /// Seconds needed to cover `distance_km` at `speed_kmh`.
    #[inline]
    pub fn travel_seconds(distance_km: f64, speed_kmh: f64) -> f64 {
        distance_km / speed_kmh * SECONDS_PER_HOUR
    }
}

/// Mission clock helpers. The mission clock counts elapsed seconds from the
/// operational start of day 1.
pub mod time {
    use super::constants::{SECONDS_PER_DAY, SECONDS_PER_MINUTE};

    /// Convert whole minutes to seconds.
    #[inline]
    pub fn minutes_to_seconds(minutes: u32) -> u64 {
        u64::from(minutes) * SECONDS_PER_MINUTE
    }

    /// Convert seconds to fractional minutes.
    #[inline]
    pub fn seconds_to_minutes(seconds: u64) -> f64 {
        seconds as f64 / SECONDS_PER_MINUTE as f64
    }

    /// Map elapsed mission seconds onto `(day, seconds_of_day)`. Day numbering
    /// starts at 1 and the clock starts at `day_start_s` on that day.
    #[inline]
    pub fn mission_day_and_time(elapsed_s: u64, day_start_s: u64) -> (u32, u32) {
        let absolute = day_start_s + elapsed_s;
        let day = absolute / SECONDS_PER_DAY + 1;
        let time_of_day = absolute % SECONDS_PER_DAY;
        (day as u32, time_of_day as u32)
    }

    /// Render seconds since midnight as `HH:MM:SS`, wrapping past midnight.
    pub fn clock(seconds_of_day: u64) -> String {
        let wrapped = seconds_of_day % SECONDS_PER_DAY;
        let hours = wrapped / 3_600;
        let minutes = (wrapped % 3_600) / 60;
        let seconds = wrapped % 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Planar east/north vectors used for wind composition.
pub mod vector {
    /// `[east, north]` components.
    pub type Vector2 = [f64; 2];

    /// Vector of length `magnitude` pointing along a compass bearing
    /// (degrees clockwise from north).
    #[inline]
    pub fn from_bearing(magnitude: f64, bearing_deg: f64) -> Vector2 {
        let theta = bearing_deg.to_radians();
        [magnitude * theta.sin(), magnitude * theta.cos()]
    }

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector2) -> f64 {
        v[0].hypot(v[1])
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector2, b: &Vector2) -> Vector2 {
        [a[0] + b[0], a[1] + b[1]]
    }
}
