use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use clap::Parser;
use csv::ReaderBuilder;
use env_logger::Env;
use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a flight plan CSV (and optionally the GA history) to PNG"
)]
struct Cli {
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value = "artifacts/route.png")]
    output: PathBuf,
    /// history.json written by the optimizer; adds an evolution panel
    #[arg(long)]
    history: Option<PathBuf>,
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 900)]
    height: u32,
}

/// Plot coordinates are `(longitude, latitude)`.
#[derive(Debug, Clone)]
struct PlotLeg {
    day: u32,
    from: (f64, f64),
    to: (f64, f64),
    landed_before: bool,
}

#[derive(Debug, Deserialize)]
struct HistoryFile {
    generations: Vec<GenerationPoint>,
}

#[derive(Debug, Deserialize)]
struct GenerationPoint {
    generation: usize,
    best_fitness: Option<f64>,
    #[serde(default)]
    mean_feasible_fitness: Option<f64>,
}

const DAY_COLORS: [RGBColor; 7] = [
    RGBColor(31, 119, 180),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(23, 190, 207),
    RGBColor(255, 127, 14),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
];

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let legs = read_legs(&cli.input)?;
    if legs.is_empty() {
        return Err(anyhow!("flight plan {} has no legs", cli.input.display()));
    }
    let history = cli.history.as_deref().map(read_history).transpose()?;

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    match &history {
        Some(history) => {
            let (map_area, history_area) =
                root.split_vertically((cli.height as i32 * 2 / 3).max(100));
            draw_route(&map_area, &legs)?;
            draw_history(&history_area, history)?;
        }
        None => draw_route(&root, &legs)?,
    }

    root.present()?;
    info!("route plot written to {}", cli.output.display());
    Ok(())
}

fn draw_route(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    legs: &[PlotLeg],
) -> anyhow::Result<()> {
    let area = titled(area, "Survey route");
    let (mut lon_min, mut lon_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut lat_min, mut lat_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (lon, lat) in legs.iter().flat_map(|leg| [leg.from, leg.to]) {
        lon_min = lon_min.min(lon);
        lon_max = lon_max.max(lon);
        lat_min = lat_min.min(lat);
        lat_max = lat_max.max(lat);
    }
    let lon_pad = ((lon_max - lon_min) * 0.05).max(0.001);
    let lat_pad = ((lat_max - lat_min) * 0.05).max(0.001);

    let mut chart = ChartBuilder::on(&area)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (lon_min - lon_pad)..(lon_max + lon_pad),
            (lat_min - lat_pad)..(lat_max + lat_pad),
        )?;

    if let Err(err) = chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&|v| format!("{v:.3}"))
        .y_label_formatter(&|v| format!("{v:.3}"))
        .draw()
    {
        warn!("axis labels skipped: {err}");
    }

    for leg in legs {
        let color = DAY_COLORS[leg.day.saturating_sub(1) as usize % DAY_COLORS.len()];
        chart.draw_series(std::iter::once(PathElement::new(
            vec![leg.from, leg.to],
            ShapeStyle::from(&color).stroke_width(2),
        )))?;
    }
    chart.draw_series(legs.iter().map(|leg| Circle::new(leg.to, 4, BLACK.filled())))?;
    chart.draw_series(
        legs.iter()
            .filter(|leg| leg.landed_before)
            .map(|leg| TriangleMarker::new(leg.from, 8, RED.filled())),
    )?;
    chart.draw_series(std::iter::once(Cross::new(
        legs[0].from,
        9,
        ShapeStyle::from(&BLACK).stroke_width(3),
    )))?;
    Ok(())
}

fn draw_history(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    history: &HistoryFile,
) -> anyhow::Result<()> {
    let best: Vec<(f64, f64)> = history
        .generations
        .iter()
        .filter_map(|g| g.best_fitness.map(|v| (g.generation as f64, v)))
        .filter(|(_, v)| v.is_finite())
        .collect();
    let mean: Vec<(f64, f64)> = history
        .generations
        .iter()
        .filter_map(|g| g.mean_feasible_fitness.map(|v| (g.generation as f64, v)))
        .filter(|(_, v)| v.is_finite())
        .collect();
    if best.is_empty() {
        warn!("history has no finite fitness values; evolution panel skipped");
        return Ok(());
    }

    let area = titled(area, "Fitness per generation");
    let last_generation = history
        .generations
        .iter()
        .map(|g| g.generation)
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, v) in best.iter().chain(mean.iter()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let pad = ((hi - lo) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(&area)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..last_generation, (lo - pad)..(hi + pad))?;

    if let Err(err) = chart
        .configure_mesh()
        .x_desc("Generation")
        .y_desc("Fitness")
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()
    {
        warn!("axis labels skipped: {err}");
    }

    chart.draw_series(LineSeries::new(best, ShapeStyle::from(&BLUE).stroke_width(2)))?;
    chart.draw_series(LineSeries::new(
        mean,
        ShapeStyle::from(&RGBColor(255, 127, 14)).stroke_width(1),
    ))?;
    Ok(())
}

/// Add a title when a font is available; otherwise draw untitled.
fn titled<'a>(
    area: &DrawingArea<BitMapBackend<'a>, Shift>,
    title: &str,
) -> DrawingArea<BitMapBackend<'a>, Shift> {
    let font = FontDesc::new(select_font_family(), 22.0, FontStyle::Bold);
    match area.titled(title, font) {
        Ok(inner) => inner,
        Err(err) => {
            warn!("title '{title}' skipped: {err}");
            area.clone()
        }
    }
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

fn read_legs(path: &Path) -> anyhow::Result<Vec<PlotLeg>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("CSV missing '{}' column", name))
    };
    let from_lat = column("Latitude inicial")?;
    let from_lon = column("Longitude inicial")?;
    let to_lat = column("Latitude final")?;
    let to_lon = column("Longitude final")?;
    let day_idx = column("Dia do voo")?;
    let landed_idx = column("Pouso")?;

    let mut legs = Vec::new();
    for rec in rdr.records() {
        let r = rec?;
        let number = |idx: usize| -> f64 {
            r.get(idx).unwrap_or("").trim().parse().unwrap_or(f64::NAN)
        };
        let from = (number(from_lon), number(from_lat));
        let to = (number(to_lon), number(to_lat));
        if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
            warn!("skipping flight plan row with invalid coordinates");
            continue;
        }
        legs.push(PlotLeg {
            day: r.get(day_idx).unwrap_or("1").trim().parse().unwrap_or(1),
            from,
            to,
            landed_before: r
                .get(landed_idx)
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("SIM"),
        });
    }
    Ok(legs)
}

fn read_history(path: &Path) -> anyhow::Result<HistoryFile> {
    let reader = File::open(path)?;
    Ok(serde_json::from_reader(reader)?)
}
