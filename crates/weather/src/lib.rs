//! Wind forecast lookup keyed by mission day and time-of-day bucket.
//!
//! The table is immutable once built and shared by every simulation of a run.

use std::collections::BTreeMap;

use thiserror::Error;

pub mod cardinal;
pub mod weekly;

pub use cardinal::{Cardinal, toward};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeatherError {
    #[error("unknown compass direction `{0}`")]
    UnknownCardinal(String),
    #[error("forecast buckets must be non-empty and strictly ascending")]
    InvalidBuckets,
    #[error("forecast hour {hour} is not a bucket start (buckets: {buckets:?})")]
    UnknownBucket { hour: u32, buckets: Vec<u32> },
    #[error("wind speed must be finite and non-negative, got {0}")]
    InvalidSpeed(f64),
}

/// Fixed, non-overlapping forecast windows identified by their start hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindBuckets {
    starts: Vec<u32>,
}

impl WindBuckets {
    pub fn new(starts: Vec<u32>) -> Result<Self, WeatherError> {
        if starts.is_empty() || starts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(WeatherError::InvalidBuckets);
        }
        Ok(Self { starts })
    }

    pub fn starts(&self) -> &[u32] {
        &self.starts
    }

    /// Bucket covering `minute_of_day`: the last start at or before the hour,
    /// or the first bucket for earlier times.
    pub fn bucket_for(&self, minute_of_day: u32) -> u32 {
        let hour = minute_of_day / 60;
        self.starts
            .iter()
            .rev()
            .copied()
            .find(|start| *start <= hour)
            .unwrap_or(self.starts[0])
    }
}

impl Default for WindBuckets {
    fn default() -> Self {
        Self {
            starts: weekly::BUCKET_HOURS.to_vec(),
        }
    }
}

/// Forecast value for one (day, bucket) cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindReading {
    pub speed_kmh: f64,
    /// Bearing the wind comes from.
    pub from_deg: f64,
    pub cardinal: Cardinal,
}

/// One row of a forecast table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindEntry {
    pub day: u32,
    pub hour: u32,
    pub reading: WindReading,
}

impl WindEntry {
    pub fn cardinal(day: u32, hour: u32, speed_kmh: f64, cardinal: Cardinal) -> Self {
        Self {
            day,
            hour,
            reading: WindReading {
                speed_kmh,
                from_deg: cardinal.from_deg(),
                cardinal,
            },
        }
    }

    /// Entry from a numeric "blows from" bearing; the label is the nearest
    /// compass point.
    pub fn from_degrees(day: u32, hour: u32, speed_kmh: f64, from_deg: f64) -> Self {
        let from_deg = from_deg.rem_euclid(360.0);
        Self {
            day,
            hour,
            reading: WindReading {
                speed_kmh,
                from_deg,
                cardinal: Cardinal::nearest(from_deg),
            },
        }
    }
}

/// Wind as consumed by leg planning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    pub speed_kmh: f64,
    pub cardinal: Cardinal,
    /// Bearing the wind blows towards, ready for vector composition.
    pub toward_deg: f64,
}

impl WindSample {
    pub const CALM: WindSample = WindSample {
        speed_kmh: 0.0,
        cardinal: Cardinal::N,
        toward_deg: 0.0,
    };

    pub fn label(&self) -> &'static str {
        self.cardinal.label()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindForecast {
    buckets: WindBuckets,
    table: BTreeMap<(u32, u32), WindReading>,
}

impl WindForecast {
    /// Build a forecast; every entry hour must be one of the bucket starts.
    pub fn new(
        buckets: WindBuckets,
        entries: impl IntoIterator<Item = WindEntry>,
    ) -> Result<Self, WeatherError> {
        let mut table = BTreeMap::new();
        for entry in entries {
            if !buckets.starts().contains(&entry.hour) {
                return Err(WeatherError::UnknownBucket {
                    hour: entry.hour,
                    buckets: buckets.starts().to_vec(),
                });
            }
            let speed = entry.reading.speed_kmh;
            if !speed.is_finite() || speed < 0.0 {
                return Err(WeatherError::InvalidSpeed(speed));
            }
            table.insert((entry.day, entry.hour), entry.reading);
        }
        Ok(Self { buckets, table })
    }

    /// A forecast with no entries: every lookup is calm.
    pub fn calm() -> Self {
        Self {
            buckets: WindBuckets::default(),
            table: BTreeMap::new(),
        }
    }

    /// The built-in seven-day forecast of the survey area.
    pub fn weekly_default() -> Self {
        let mut table = BTreeMap::new();
        for (day_index, day) in weekly::WEEK.iter().enumerate() {
            for (hour, (speed_kmh, cardinal)) in weekly::BUCKET_HOURS.iter().zip(day.iter()) {
                table.insert(
                    (day_index as u32 + 1, *hour),
                    WindReading {
                        speed_kmh: *speed_kmh,
                        from_deg: cardinal.from_deg(),
                        cardinal: *cardinal,
                    },
                );
            }
        }
        Self {
            buckets: WindBuckets::default(),
            table,
        }
    }

    /// Re-bucket the built-in table onto a different bucket set, keeping the
    /// hours both sets share.
    pub fn weekly_with_buckets(buckets: WindBuckets) -> Self {
        let weekly = Self::weekly_default();
        let table = weekly
            .table
            .into_iter()
            .filter(|((_, hour), _)| buckets.starts().contains(hour))
            .collect();
        Self { buckets, table }
    }

    pub fn buckets(&self) -> &WindBuckets {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn days(&self) -> Vec<u32> {
        let mut days: Vec<u32> = self.table.keys().map(|(day, _)| *day).collect();
        days.dedup();
        days
    }

    /// Wind for a mission day (1-based) at `minute_of_day`. Missing cells are
    /// calm from due north.
    pub fn get_wind(&self, day: u32, minute_of_day: u32) -> WindSample {
        let bucket = self.buckets.bucket_for(minute_of_day);
        match self.table.get(&(day, bucket)) {
            Some(reading) => WindSample {
                speed_kmh: reading.speed_kmh,
                cardinal: reading.cardinal,
                toward_deg: toward(reading.from_deg),
            },
            None => WindSample::CALM,
        }
    }
}

impl Default for WindForecast {
    fn default() -> Self {
        Self::weekly_default()
    }
}
