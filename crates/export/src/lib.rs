//! Export helpers for mission artifacts: the flight plan CSV, the summary CSV
//! and the JSON history sidecar.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod flight_plan {
    use std::io::{self, Write};

    use drone_core::time::clock;
    use drone_mission::{Leg, Route};

    pub const HEADER: &str = "CEP inicial,Latitude inicial,Longitude inicial,Dia do voo,Hora inicial,Velocidade,CEP final,Latitude final,Longitude final,Pouso,Hora final";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One leg, matching the header ordering.
    pub fn write_leg(writer: &mut dyn Write, leg: &Leg) -> io::Result<()> {
        writeln!(
            writer,
            "{},{:.6},{:.6},{},{},{},{},{:.6},{:.6},{},{}",
            leg.origin.id(),
            leg.origin.latitude,
            leg.origin.longitude,
            leg.day,
            clock(u64::from(leg.departure_s)),
            leg.airspeed_kmh,
            leg.destination.id(),
            leg.destination.latitude,
            leg.destination.longitude,
            if leg.landed_before { "SIM" } else { "NAO" },
            clock(leg.arrival_s()),
        )
    }

    /// Header plus every leg of the latest simulation of `route`.
    pub fn write_route(writer: &mut dyn Write, route: &Route) -> io::Result<()> {
        write_header(writer)?;
        for leg in route.legs() {
            write_leg(writer, leg)?;
        }
        writer.flush()
    }
}

pub mod summary {
    use std::io::Write;

    use chrono::Local;
    use drone_mission::{AutonomyModel, Route};

    use crate::ExportError;

    /// Two-column report rows for a simulated route.
    pub fn rows(route: &Route, autonomy: &AutonomyModel) -> Vec<(String, String)> {
        let metrics = route.metrics();
        let avg_ground_speed = if metrics.flight_minutes > 0.0 {
            metrics.distance_km / (metrics.flight_minutes / 60.0)
        } else {
            0.0
        };
        let mut rows = vec![
            (
                "Gerado em".to_string(),
                Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
            ("Rota".to_string(), route.ids().join(" -> ")),
            ("Pontos visitados".to_string(), route.interior().len().to_string()),
            (
                "Rota viavel".to_string(),
                if route.is_feasible() { "SIM" } else { "NAO" }.to_string(),
            ),
            ("Distancia total (km)".to_string(), format!("{:.3}", metrics.distance_km)),
            ("Tempo de voo (min)".to_string(), format!("{:.1}", metrics.flight_minutes)),
            ("Tempo de missao (min)".to_string(), format!("{:.1}", metrics.mission_minutes)),
            ("Dias utilizados".to_string(), metrics.days_used.to_string()),
            ("Pousos para recarga".to_string(), metrics.recharge_landings.to_string()),
            ("Pousos com taxa tardia".to_string(), metrics.late_fee_landings.to_string()),
            ("Custo (R$)".to_string(), format!("{:.2}", metrics.cost)),
            ("Penalidades".to_string(), format!("{:.2}", route.penalties())),
            ("Fitness".to_string(), format!("{:.2}", route.fitness())),
            (
                "Autonomia (min)".to_string(),
                format!("{:.1}", autonomy.full_charge_s() / 60.0),
            ),
            (
                "Velocidade media em solo (km/h)".to_string(),
                format!("{avg_ground_speed:.2}"),
            ),
            ("Alertas".to_string(), route.alerts().len().to_string()),
        ];
        rows.extend(
            route
                .alerts()
                .iter()
                .map(|alert| ("Alerta".to_string(), alert.to_string())),
        );
        rows.extend(
            route
                .violations()
                .iter()
                .map(|violation| ("Violacao".to_string(), violation.to_string())),
        );
        rows
    }

    pub fn write_summary<W: Write>(
        writer: W,
        rows: &[(String, String)],
    ) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["PARAMETRO", "VALOR"])?;
        for (key, value) in rows {
            csv.write_record([key, value])?;
        }
        csv.flush()?;
        Ok(())
    }
}

pub mod history {
    use std::io::Write;

    use chrono::Local;
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    use crate::ExportError;

    #[derive(Serialize)]
    struct HistorySidecar<'a, S: Serialize> {
        generated_at: String,
        best_route: &'a [&'a str],
        /// `null` when the best route is infeasible.
        best_fitness: f64,
        generations: &'a [S],
    }

    /// Per-generation statistics and the winning route as pretty JSON.
    pub fn write_history<W: Write, S: Serialize>(
        writer: W,
        best_route: &[&str],
        best_fitness: f64,
        generations: &[S],
    ) -> Result<(), ExportError> {
        let sidecar = HistorySidecar {
            generated_at: Local::now().to_rfc3339(),
            best_route,
            best_fitness,
            generations,
        };
        to_writer_pretty(writer, &sidecar)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Stat {
        generation: usize,
        best_fitness: f64,
    }

    #[test]
    fn history_serialises_non_finite_values_as_null() {
        let mut out = Vec::new();
        let stats = [
            Stat {
                generation: 0,
                best_fitness: f64::INFINITY,
            },
            Stat {
                generation: 1,
                best_fitness: 12.5,
            },
        ];
        history::write_history(&mut out, &["H", "a", "H"], 12.5, &stats).expect("json");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("parse");
        assert_eq!(value["best_route"][1], "a");
        assert!(value["generations"][0]["best_fitness"].is_null());
        assert_eq!(value["generations"][1]["best_fitness"], 12.5);
    }

    #[test]
    fn summary_quotes_values_with_commas() {
        let mut out = Vec::new();
        let rows = vec![
            ("Rota".to_string(), "H -> a".to_string()),
            ("Alerta".to_string(), "x, y".to_string()),
        ];
        summary::write_summary(&mut out, &rows).expect("csv");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "PARAMETRO,VALOR\nRota,H -> a\nAlerta,\"x, y\"\n");
    }

    #[test]
    fn writer_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("drone_export_{}", std::process::id()));
        let path = dir.join("nested").join("plan.csv");
        {
            let mut writer = writer_for_path(&path).expect("writer");
            flight_plan::write_header(&mut writer).expect("header");
            writer.flush().expect("flush");
        }
        let text = fs::read_to_string(&path).expect("read back");
        assert!(text.starts_with("CEP inicial,"));
        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
