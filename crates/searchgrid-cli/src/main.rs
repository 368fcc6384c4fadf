//! Search path generator for fixed-wing survey missions.
//!
//! Reads the mission, search-grid and boundary point files, plans a
//! coverage path over the search grid, and writes the combined waypoint
//! stream for the autopilot.

mod io;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use searchgrid_core::{plan_mission, MissionInput, PlannerConfig, SweepMode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "searchgrid", about = "Coverage search path generator")]
struct Args {
    /// Traversal strategy for the search grid.
    #[arg(value_enum, default_value = "decomp")]
    mode: Mode,

    /// Mission points file (the last record is the inbound position).
    #[arg(long, default_value = "mission/MissionPointsParsed.txt")]
    mission: PathBuf,

    /// Search grid polygon file; the first record anchors the local frame.
    #[arg(long, default_value = "mission/SearchGridParsed.txt")]
    search: PathBuf,

    /// Flight boundary polygon file.
    #[arg(long, default_value = "mission/BoundaryPoints.txt")]
    bounds: PathBuf,

    /// Output waypoint file.
    #[arg(long, default_value = "mission/MissionPointsWithSearch.txt")]
    out: PathBuf,

    /// Turn radius in meters.
    #[arg(long, default_value_t = 36.6)]
    radius: f64,

    /// Sweep spacing in meters; defaults to the turn radius, which is
    /// also its lower bound.
    #[arg(long)]
    offset: Option<f64>,

    /// Inward endpoint correction in meters; defaults to the turn radius.
    #[arg(long)]
    correction: Option<f64>,

    /// Output altitude for search waypoints, in feet.
    #[arg(long, default_value_t = 150.0)]
    altitude: f64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// Single east-west sweep, no decomposition.
    Naive,
    /// Convex decomposition with width-aligned sweeps.
    Decomp,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Argument errors exit 1; help and version print and exit 0.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    let mode = match args.mode {
        Mode::Naive => SweepMode::Naive,
        Mode::Decomp => SweepMode::Decompose,
    };
    let cfg = PlannerConfig {
        turn_radius_m: args.radius,
        sweep_offset_m: args.offset.unwrap_or(args.radius),
        correction_m: args.correction.unwrap_or(args.radius),
        altitude_ft: args.altitude,
        ..PlannerConfig::default()
    };

    let mission = read_records(&args.mission, "mission file")?;
    let search = read_records(&args.search, "search grid file")?;
    let bounds = read_records(&args.bounds, "boundary points file")?;
    tracing::info!(
        mission = mission.len(),
        search = search.len(),
        bounds = bounds.len(),
        "input records read"
    );

    let input = MissionInput {
        mission: mission.iter().map(io::MissionRecord::gps).collect(),
        search: search.iter().map(io::MissionRecord::gps).collect(),
        boundary: bounds.iter().map(io::MissionRecord::gps).collect(),
    };
    let plan = plan_mission(&input, mode, &cfg)?;
    tracing::info!(
        transit = plan.transit.len(),
        search = plan.search.len(),
        "search path planned"
    );

    let mut writer = io::WaypointWriter::new();
    for record in &mission {
        writer.push_mission(record);
    }
    for waypoint in plan.transit.iter().chain(&plan.search) {
        writer.push_waypoint(waypoint, cfg.altitude_ft);
    }
    let total = writer.record_count();
    fs::write(&args.out, writer.finish())
        .with_context(|| format!("could not create output file {}", args.out.display()))?;
    tracing::info!(records = total, out = %args.out.display(), "waypoints written");

    Ok(())
}

fn read_records(path: &Path, label: &str) -> Result<Vec<io::MissionRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not open {label} {}", path.display()))?;
    io::parse_records(&text, label)
}
