//! TOML level files.

use doors_maze_core::{CellCoord, DoorDef, ItemDef, LevelDefinition, SwitchDef};
use serde::Deserialize;

use crate::{find_start, parse_grid, validate, LevelError};

/// On-disk layout of a level.
///
/// ```toml
/// id = "corridor"
/// rows = ["#####", "#S.G#", "#####"]
/// target_door = "left"
///
/// [[doors]]
/// id = "left"
/// cell = { column = 3, row = 1 }
/// icon = "🔑"
/// condition = { has_item = "key-red" }
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelFile {
    /// Identifier of the level.
    pub id: String,
    /// ASCII grid rows.
    pub rows: Vec<String>,
    /// Explicit start cell; defaults to the grid's `S` tile.
    #[serde(default)]
    pub start: Option<CellCoord>,
    /// Identifier of the door that completes the level.
    pub target_door: String,
    /// Collectibles.
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// Floor switches.
    #[serde(default)]
    pub switches: Vec<SwitchDef>,
    /// Doors.
    #[serde(default)]
    pub doors: Vec<DoorDef>,
}

impl LevelFile {
    /// Resolves the file into a validated level definition.
    pub fn into_level(self) -> Result<LevelDefinition, LevelError> {
        let grid = parse_grid(self.rows.as_slice())?;
        let start = match self.start {
            Some(start) => start,
            None => find_start(&grid)?,
        };

        let level = LevelDefinition {
            id: self.id,
            grid,
            start,
            items: self.items,
            switches: self.switches,
            doors: self.doors,
            target_door: self.target_door,
        };
        validate(&level)?;
        Ok(level)
    }
}

/// Parses and validates a TOML level description.
pub fn load_level_str(contents: &str) -> Result<LevelDefinition, LevelError> {
    let file: LevelFile = toml::from_str(contents)?;
    file.into_level()
}
