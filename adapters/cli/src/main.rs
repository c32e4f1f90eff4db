#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays pointer scripts against the Doors Maze.

mod config;
mod report;
mod script;
mod session;

use std::{fs, io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use doors_maze_core::ReleasePolicy;
use doors_maze_levels::{level_for, load_level_str, DoorSide};
use doors_maze_system_progression::Vehicle;
use log::info;

use crate::{config::AppConfig, report::Reporter, session::Session};

/// Replays a pointer script against the Doors Maze and prints what happens.
#[derive(Debug, Parser)]
#[command(name = "doors-maze", version)]
struct Args {
    /// TOML file with `[session]`, `[movement]` and `[progression]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Play a built-in task directly instead of selecting a vehicle first.
    #[arg(long, value_enum, conflicts_with = "level")]
    task: Option<TaskArg>,
    /// Play a level read from a TOML file.
    #[arg(long)]
    level: Option<PathBuf>,
    /// TOML script of `[[step]]` gestures to replay.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Vehicle picked on the start screen when neither a task nor a level is given.
    #[arg(long, value_enum, default_value = "car")]
    vehicle: VehicleArg,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
    /// Overrides what releasing the pointer does to a move in flight.
    #[arg(long, value_enum)]
    release_policy: Option<ReleasePolicyArg>,
    /// Print one JSON record per line instead of text.
    #[arg(long)]
    json: bool,
    /// Include per-frame tick and position events in the output.
    #[arg(long)]
    all_events: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TaskArg {
    Left,
    Middle,
    Right,
}

impl From<TaskArg> for DoorSide {
    fn from(task: TaskArg) -> Self {
        match task {
            TaskArg::Left => Self::Left,
            TaskArg::Middle => Self::Middle,
            TaskArg::Right => Self::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VehicleArg {
    Car,
    Bus,
    Train,
    Plane,
}

impl From<VehicleArg> for Vehicle {
    fn from(vehicle: VehicleArg) -> Self {
        match vehicle {
            VehicleArg::Car => Self::Car,
            VehicleArg::Bus => Self::Bus,
            VehicleArg::Train => Self::Train,
            VehicleArg::Plane => Self::Plane,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReleasePolicyArg {
    CompleteInFlight,
    CancelInFlight,
}

impl From<ReleasePolicyArg> for ReleasePolicy {
    fn from(policy: ReleasePolicyArg) -> Self {
        match policy {
            ReleasePolicyArg::CompleteInFlight => Self::CompleteInFlight,
            ReleasePolicyArg::CancelInFlight => Self::CancelInFlight,
        }
    }
}

/// Entry point for the Doors Maze command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(policy) = args.release_policy {
        config.movement.release_policy = policy.into();
    }

    let actions = match &args.script {
        Some(path) => script::load(path)?,
        None => Vec::new(),
    };

    let reporter = Reporter::new(io::stdout().lock(), args.json, args.all_events);
    let mut session = Session::new(&config, Duration::from_millis(args.frame_ms), reporter);

    if let Some(path) = &args.level {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level {}", path.display()))?;
        let level = load_level_str(&contents)
            .with_context(|| format!("invalid level {}", path.display()))?;
        session.load(level)?;
    } else if let Some(task) = args.task {
        session.load(level_for(task.into()))?;
    } else {
        session.select_vehicle(args.vehicle.into())?;
    }

    info!("replaying {} scripted steps", actions.len());
    for action in actions {
        session.perform(action)?;
    }

    let _ = session.finish()?;
    Ok(())
}
