use std::{fs, path::Path};

use anyhow::{Context, Result};
use doors_maze_system_movement::Config as MovementConfig;
use doors_maze_system_progression::Config as ProgressionConfig;
use doors_maze_world::SessionConfig;
use serde::Deserialize;

/// Settings read from the optional configuration file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AppConfig {
    /// World tunables.
    pub(crate) session: SessionConfig,
    /// Pointer handling.
    pub(crate) movement: MovementConfig,
    /// Screen flow timing.
    pub(crate) progression: ProgressionConfig,
}

impl AppConfig {
    /// Loads the file at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
