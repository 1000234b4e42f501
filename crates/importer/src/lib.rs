//! CSV loaders for the waypoint catalog and the wind forecast table.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use drone_core::Waypoint;
use drone_weather::{Cardinal, WeatherError, WindBuckets, WindEntry, WindForecast};
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: String, column: &'static str },
    #[error("{path}, line {line}: {reason}")]
    InvalidRecord {
        path: String,
        line: u64,
        reason: String,
    },
    #[error("{0}: no waypoints")]
    Empty(String),
    #[error("home waypoint `{0}` is not in the catalog")]
    MissingHome(String),
    #[error(transparent)]
    Weather(#[from] WeatherError),
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ImportError> {
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)?)
}

fn column(
    headers: &StringRecord,
    path: &Path,
    names: &[&'static str],
) -> Result<usize, ImportError> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
        .ok_or_else(|| ImportError::MissingColumn {
            path: path.display().to_string(),
            column: names[0],
        })
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

/// Load a waypoint catalog: a `cep` column plus `latitude`/`longitude`
/// (or `lat`/`lon`). Blank ids and unparsable coordinates are errors.
pub fn load_waypoints<P: AsRef<Path>>(path: P) -> Result<Vec<Waypoint>, ImportError> {
    let path = path.as_ref();
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.clone();
    let id_idx = column(&headers, path, &["cep", "id"])?;
    let lat_idx = column(&headers, path, &["latitude", "lat"])?;
    let lon_idx = column(&headers, path, &["longitude", "lon", "lng"])?;

    let mut waypoints = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let invalid = |reason: String| ImportError::InvalidRecord {
            path: path.display().to_string(),
            line: line_of(&record),
            reason,
        };
        let id = record.get(id_idx).unwrap_or("");
        if id.is_empty() {
            return Err(invalid("empty waypoint id".to_string()));
        }
        let coordinate = |idx: usize, name: &str| -> Result<f64, ImportError> {
            let raw = record.get(idx).unwrap_or("");
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(format!("invalid {name} `{raw}` for {id}")))
        };
        let latitude = coordinate(lat_idx, "latitude")?;
        let longitude = coordinate(lon_idx, "longitude")?;
        waypoints.push(Waypoint::new(id, latitude, longitude));
    }

    if waypoints.is_empty() {
        return Err(ImportError::Empty(path.display().to_string()));
    }
    info!("loaded {} waypoints from {}", waypoints.len(), path.display());
    Ok(waypoints)
}

/// Fail unless `home` is one of the catalog ids.
pub fn ensure_home(waypoints: &[Waypoint], home: &str) -> Result<(), ImportError> {
    if waypoints.iter().any(|w| w.is(home)) {
        Ok(())
    } else {
        Err(ImportError::MissingHome(home.to_string()))
    }
}

/// Load a forecast table with columns `day,hour,speed_kmh,direction`. The
/// direction is a compass label (`NE`, `SSW`) or a numeric bearing the wind
/// blows from. Rows that cannot be read, or whose hour is not a bucket start,
/// are skipped with a warning.
pub fn load_wind_table<P: AsRef<Path>>(
    path: P,
    buckets: WindBuckets,
) -> Result<WindForecast, ImportError> {
    let path = path.as_ref();
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.clone();
    let day_idx = column(&headers, path, &["day", "dia"])?;
    let hour_idx = column(&headers, path, &["hour", "hora"])?;
    let speed_idx = column(&headers, path, &["speed_kmh", "speed", "velocidade"])?;
    let dir_idx = column(&headers, path, &["direction", "direcao"])?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for record in rdr.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!("{}: skipping unreadable row: {err}", path.display());
                skipped += 1;
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        match parse_wind_row(&record, day_idx, hour_idx, speed_idx, dir_idx) {
            Ok(entry) if buckets.starts().contains(&entry.hour) => entries.push(entry),
            Ok(entry) => {
                warn!(
                    "{}, line {}: hour {} is not a bucket start, skipped",
                    path.display(),
                    line_of(&record),
                    entry.hour
                );
                skipped += 1;
            }
            Err(reason) => {
                warn!(
                    "{}, line {}: {reason}, skipped",
                    path.display(),
                    line_of(&record)
                );
                skipped += 1;
            }
        }
    }

    info!(
        "loaded {} wind entries from {} ({skipped} skipped)",
        entries.len(),
        path.display()
    );
    Ok(WindForecast::new(buckets, entries)?)
}

fn parse_wind_row(
    record: &StringRecord,
    day_idx: usize,
    hour_idx: usize,
    speed_idx: usize,
    dir_idx: usize,
) -> Result<WindEntry, String> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let day: u32 = field(day_idx)
        .parse()
        .map_err(|_| format!("invalid day `{}`", field(day_idx)))?;
    if day == 0 {
        return Err("days are numbered from 1".to_string());
    }
    let hour: u32 = field(hour_idx)
        .parse()
        .map_err(|_| format!("invalid hour `{}`", field(hour_idx)))?;
    let speed: f64 = field(speed_idx)
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| format!("invalid wind speed `{}`", field(speed_idx)))?;
    let direction = field(dir_idx);
    if let Ok(from_deg) = direction.parse::<f64>() {
        if from_deg.is_finite() {
            return Ok(WindEntry::from_degrees(day, hour, speed, from_deg));
        }
    }
    let cardinal: Cardinal = direction.parse().map_err(|e: WeatherError| e.to_string())?;
    Ok(WindEntry::cardinal(day, hour, speed, cardinal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn reads_waypoints_with_either_header_style() {
        let long = csv_file("cep,latitude,longitude\n82821020,-25.4080,-49.2920\n80010000,-25.43,-49.27\n");
        let short = csv_file("CEP,lat,lon\n82821020,-25.4080,-49.2920\n");
        let waypoints = load_waypoints(long.path()).expect("long headers");
        assert_eq!(waypoints.len(), 2);
        assert_eq!(waypoints[0].id(), "82821020");
        assert!((waypoints[1].longitude + 49.27).abs() < 1e-12);
        assert_eq!(load_waypoints(short.path()).expect("short headers").len(), 1);
    }

    #[test]
    fn bad_coordinates_name_the_line() {
        let file = csv_file("cep,lat,lon\n1,-25.4,-49.2\n2,north,-49.2\n");
        let err = load_waypoints(file.path()).expect_err("bad latitude");
        match err {
            ImportError::InvalidRecord { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("north"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn missing_column_is_reported() {
        let file = csv_file("cep,lat\n1,-25.4\n");
        assert!(matches!(
            load_waypoints(file.path()),
            Err(ImportError::MissingColumn {
                column: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn home_must_be_present() {
        let waypoints = vec![Waypoint::new("a", 0.0, 0.0)];
        assert!(ensure_home(&waypoints, "a").is_ok());
        assert!(matches!(
            ensure_home(&waypoints, "b"),
            Err(ImportError::MissingHome(_))
        ));
    }

    #[test]
    fn wind_table_skips_comments_and_bad_rows() {
        let file = csv_file(
            "day,hour,speed_kmh,direction\n\
             # header note\n\
             1,6,17,ENE\n\
             1,9,abc,N\n\
             1,7,10,N\n\
             1,12,20,225\n\
             2,6,5,XYZ\n",
        );
        let forecast =
            load_wind_table(file.path(), WindBuckets::default()).expect("wind table");
        assert_eq!(forecast.len(), 2);
        let morning = forecast.get_wind(1, 6 * 60);
        assert_eq!(morning.cardinal, Cardinal::Ene);
        assert_eq!(morning.speed_kmh, 17.0);
        let noon = forecast.get_wind(1, 12 * 60 + 30);
        assert_eq!(noon.cardinal, Cardinal::Sw);
        assert!((noon.toward_deg - 45.0).abs() < 1e-9);
        assert_eq!(forecast.get_wind(2, 6 * 60).speed_kmh, 0.0);
    }
}
