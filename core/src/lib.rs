#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Doors Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod millis;
mod timeline;

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use timeline::Timeline;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active level, resetting inventory and the actor.
    LoadLevel {
        /// Level layout and interactables to activate.
        level: LevelDefinition,
    },
    /// Returns the actor to the level's start cell and clears any move target.
    ResetActor,
    /// Requests that the actor ease toward the provided cell.
    RequestMove {
        /// Destination cell resolved from the input gesture.
        target: CellCoord,
    },
    /// Abandons the move currently in flight, leaving the actor where it is.
    StopMove,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Confirms that a new level became active.
    LevelLoaded {
        /// Identifier of the loaded level.
        level: String,
    },
    /// Reports that a level was refused because its start cell is not walkable.
    ///
    /// The previously active level, if any, stays in place.
    LevelRejected {
        /// Identifier of the refused level.
        level: String,
        /// Start cell that failed the check.
        start: CellCoord,
    },
    /// Confirms that the actor was placed on the start cell.
    ActorReset {
        /// Cell the actor occupies after the reset.
        cell: CellCoord,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a move request passed validation.
    MoveAccepted {
        /// Cell the actor occupied when the request was validated.
        from: CellCoord,
        /// Cell the actor is now easing toward.
        to: CellCoord,
    },
    /// Reports that a move request was ignored.
    MoveRejected {
        /// Cell that was requested.
        target: CellCoord,
        /// Specific reason the request failed validation.
        reason: MoveRejection,
    },
    /// Confirms that an in-flight move was abandoned.
    MoveStopped {
        /// Continuous position at which the actor came to rest.
        position: Vec2,
    },
    /// Render-update request carrying the actor's new continuous position.
    ActorMoved {
        /// Position measured in grid-cell units.
        position: Vec2,
    },
    /// Confirms that the actor reached its move target.
    ActorArrived {
        /// Cell the actor snapped onto.
        cell: CellCoord,
    },
    /// Confirms that an item was picked up.
    ItemCollected {
        /// Identifier of the collected item.
        item: String,
        /// Collection the item was filed under.
        category: ItemCategory,
    },
    /// Confirms that a switch changed state.
    SwitchToggled {
        /// Identifier of the toggled switch.
        switch: String,
        /// State after toggling.
        state: SwitchState,
    },
    /// Announces that a switch left its post-toggle cooldown.
    SwitchCooledDown {
        /// Identifier of the switch that can be toggled again.
        switch: String,
    },
    /// Announces that the target door was opened.
    DoorOpened {
        /// Identifier of the opened door.
        door: String,
        /// Narration text describing how the door opened.
        message: String,
    },
    /// Reports that an unlockable door other than the target was reached.
    WrongDoor {
        /// Identifier of the door that was reached.
        door: String,
        /// Narration text prompting the player to check the task again.
        message: String,
    },
    /// Reports that a door was reached without meeting its unlock condition.
    DoorLocked {
        /// Identifier of the door that was reached.
        door: String,
        /// Human-readable reason describing the unmet condition.
        reason: String,
    },
    /// Requests playback of an audio or haptic cue.
    CuePlayed {
        /// Cue that should be played.
        cue: Cue,
    },
    /// Signals that the current level was completed.
    LevelCompleted {
        /// Identifier of the door that completed the level.
        door: String,
    },
}

/// Reasons a move request may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// No level has been loaded yet.
    NoLevel,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is a wall.
    Wall,
    /// The straight path to the requested cell passes through a wall.
    Occluded,
    /// A move is already in flight and cannot be retargeted.
    Busy,
}

/// Audio and haptic cue identifiers understood by presentation adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// A vehicle was selected.
    Select,
    /// A game started.
    Start,
    /// An item was picked up.
    Pickup,
    /// A switch was toggled.
    Switch,
    /// The target door opened.
    Success,
    /// An unlockable but incorrect door was reached.
    Wrong,
    /// A door condition was not met.
    Fail,
}

impl Cue {
    /// Stable identifier used by sound tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Start => "start",
            Self::Pickup => "pickup",
            Self::Switch => "switch",
            Self::Success => "success",
            Self::Wrong => "wrong",
            Self::Fail => "fail",
        }
    }
}

/// Whether releasing the pointer abandons a move that is already in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// The actor keeps easing toward the committed target after release.
    #[default]
    CompleteInFlight,
    /// Releasing the pointer stops the actor where it is.
    CancelInFlight,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Largest per-axis distance between two cells.
    ///
    /// Two distinct cells are 8-directionally adjacent exactly when this is one.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// Continuous position of the cell's origin in grid-cell units.
    #[must_use]
    pub fn to_position(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.column, self.row)
    }
}

/// Converts a pointer coordinate in canvas pixels into the cell beneath it.
///
/// Returns `None` for coordinates left of or above the canvas origin, for
/// non-finite input, and for a non-positive cell size. Upper bounds are not
/// checked here because the grid size is owned by the world.
#[must_use]
pub fn cell_from_pixel(pixel: Vec2, cell_size_px: f32) -> Option<CellCoord> {
    if !pixel.is_finite() || !cell_size_px.is_finite() || cell_size_px <= 0.0 {
        return None;
    }
    if pixel.x < 0.0 || pixel.y < 0.0 {
        return None;
    }

    let column = (pixel.x / cell_size_px).floor();
    let row = (pixel.y / cell_size_px).floor();
    if column > u32::MAX as f32 || row > u32::MAX as f32 {
        return None;
    }

    Some(CellCoord::new(column as u32, row as u32))
}

/// Kinds of terrain a grid cell can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Impassable terrain.
    Wall,
    /// Open corridor.
    Floor,
    /// The level's start cell.
    Start,
    /// Part of the goal area in front of the doors.
    Goal,
}

impl CellKind {
    /// Reports whether the actor may stand on cells of this kind.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

/// Fixed-size grid of cell kinds stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates a grid with every cell set to `fill`.
    #[must_use]
    pub fn new(columns: u32, rows: u32, fill: CellKind) -> Self {
        let count = (columns as usize).saturating_mul(rows as usize);
        Self {
            columns,
            rows,
            cells: vec![fill; count],
        }
    }

    /// Builds a grid from explicit rows, rejecting empty or ragged input.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Option<Self> {
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }

        let columns = u32::try_from(width).ok()?;
        let row_count = u32::try_from(rows.len()).ok()?;
        Some(Self {
            columns,
            rows: row_count,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Dense cell storage in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Kind of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Kind of the cell at signed coordinates, if it lies inside the grid.
    #[must_use]
    pub fn kind_at(&self, column: i64, row: i64) -> Option<CellKind> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        self.kind(CellCoord::new(column, row))
    }

    /// Reports whether the cell at signed coordinates blocks movement.
    ///
    /// Cells outside the grid count as walls.
    #[must_use]
    pub fn is_wall_at(&self, column: i64, row: i64) -> bool {
        self.kind_at(column, row)
            .map_or(true, |kind| !kind.is_traversable())
    }

    /// Overwrites the kind of a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = kind;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Collection an item is filed under once picked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    /// Plain item such as a key.
    Item,
    /// Badge collected toward a badge condition.
    Badge,
}

impl ItemCategory {
    /// Classifies an item by its identifier; identifiers mentioning `badge`
    /// are badges.
    #[must_use]
    pub fn classify(id: &str) -> Self {
        if id.contains("badge") {
            Self::Badge
        } else {
            Self::Item
        }
    }
}

/// ON/OFF state of a floor switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchState {
    /// The switch is on.
    On,
    /// The switch is off.
    #[default]
    Off,
}

impl SwitchState {
    /// Opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
        }
    }
}

/// Collectible placed on a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Unique identifier, e.g. `key-red`.
    pub id: String,
    /// Cell the item rests on.
    pub cell: CellCoord,
    /// Icon shown by presentation adapters.
    pub icon: String,
    /// Display name used in narration.
    pub name: String,
}

/// Floor switch placed on a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchDef {
    /// Unique identifier, e.g. `switch-green`.
    pub id: String,
    /// Cell the switch occupies.
    pub cell: CellCoord,
    /// Icon shown by presentation adapters.
    pub icon: String,
    /// Display name used in narration.
    pub name: String,
    /// State at level start.
    #[serde(default)]
    pub initial: SwitchState,
}

/// Unlock requirement attached to a door.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorCondition {
    /// The plain item with this identifier must be collected.
    HasItem(String),
    /// The switch with this identifier must be ON.
    SwitchOn(String),
    /// The badge with this identifier must be collected.
    HasBadge(String),
}

impl DoorCondition {
    /// Identifier of the item, switch or badge referenced by the condition.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::HasItem(id) | Self::SwitchOn(id) | Self::HasBadge(id) => id,
        }
    }
}

/// Door placed on a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorDef {
    /// Unique identifier, e.g. `left`.
    pub id: String,
    /// Cell the door occupies.
    pub cell: CellCoord,
    /// Icon hinting at the unlock condition.
    pub icon: String,
    /// Requirement that must hold for the door to open.
    pub condition: DoorCondition,
}

/// Complete description of a playable level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Identifier of the level.
    pub id: String,
    /// Terrain layout.
    pub grid: Grid,
    /// Cell the actor starts on.
    pub start: CellCoord,
    /// Collectibles placed in the maze.
    pub items: Vec<ItemDef>,
    /// Floor switches placed in the maze.
    pub switches: Vec<SwitchDef>,
    /// Doors placed in the maze.
    pub doors: Vec<DoorDef>,
    /// Identifier of the door that completes the level.
    pub target_door: String,
}
