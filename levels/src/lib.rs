#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Built-in teaching levels and level-file loading for the Doors Maze.
//!
//! Grids are written as ASCII rows: `#` is a wall, `.` a floor cell, `S` the
//! start cell and `G` part of the goal area in front of the doors.

mod file;

use doors_maze_core::{
    CellCoord, CellKind, DoorCondition, DoorDef, Grid, ItemDef, LevelDefinition, SwitchDef,
    SwitchState,
};
use thiserror::Error;

pub use file::{load_level_str, LevelFile};

/// Layout of the fixed 10×15 teaching maze with two-cell wide corridors.
const SAMPLE_ROWS: [&str; 15] = [
    "##########",
    "#S.#######",
    "#..#######",
    "#..#######",
    "#....#####",
    "#....#####",
    "#....#####",
    "#..#.....#",
    "#..#.....#",
    "#........#",
    "#.....####",
    "#.....####",
    "#..##....#",
    "#####.GGG#",
    "##########",
];

const DOOR_CELL: CellCoord = CellCoord::new(7, 13);
const SAMPLE_START: CellCoord = CellCoord::new(1, 1);

/// Errors raised while building or validating a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file is not valid TOML or does not match the schema.
    #[error("could not parse level file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The grid has no rows or an empty first row.
    #[error("level grid is empty")]
    EmptyGrid,
    /// A grid row differs in width from the first row.
    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A grid row contains a character that is not a known tile.
    #[error("unknown tile '{symbol}' at column {column}, row {row}")]
    UnknownTile {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Offending character.
        symbol: char,
    },
    /// No start cell was given and the grid contains no `S` tile.
    #[error("level has no start cell")]
    MissingStart,
    /// More than one `S` tile appears in the grid.
    #[error("level has more than one start tile")]
    AmbiguousStart,
    /// An entity was placed outside the grid or on a wall.
    #[error("{entity} is placed on non-traversable cell {cell}")]
    Misplaced {
        /// Identifier of the misplaced entity.
        entity: String,
        /// Cell the entity was placed on.
        cell: CellCoord,
    },
    /// Two interactables share an identifier.
    #[error("identifier '{0}' is used more than once")]
    DuplicateId(String),
    /// The target door does not exist in the level.
    #[error("target door '{0}' is not defined")]
    UnknownTargetDoor(String),
}

/// Parses ASCII grid rows into a [`Grid`].
pub fn parse_grid<S: AsRef<str>>(rows: &[S]) -> Result<Grid, LevelError> {
    let expected = rows.first().map_or(0, |row| row.as_ref().chars().count());
    if expected == 0 {
        return Err(LevelError::EmptyGrid);
    }

    let mut parsed = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(expected);
        for (column, symbol) in row.as_ref().chars().enumerate() {
            let kind = match symbol {
                '#' => CellKind::Wall,
                '.' => CellKind::Floor,
                'S' => CellKind::Start,
                'G' => CellKind::Goal,
                _ => {
                    return Err(LevelError::UnknownTile {
                        row: row_index,
                        column,
                        symbol,
                    })
                }
            };
            cells.push(kind);
        }
        if cells.len() != expected {
            return Err(LevelError::RaggedRow {
                row: row_index,
                expected,
                found: cells.len(),
            });
        }
        parsed.push(cells);
    }

    Grid::from_rows(parsed).ok_or(LevelError::EmptyGrid)
}

/// Locates the single start tile of a grid.
pub fn find_start(grid: &Grid) -> Result<CellCoord, LevelError> {
    let columns = grid.columns();
    let mut starts = grid
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, kind)| **kind == CellKind::Start)
        .filter_map(|(index, _)| {
            let index = u32::try_from(index).ok()?;
            Some(CellCoord::new(index % columns, index / columns))
        });

    let start = starts.next().ok_or(LevelError::MissingStart)?;
    if starts.next().is_some() {
        return Err(LevelError::AmbiguousStart);
    }
    Ok(start)
}

/// Checks that the start and every interactable sit on traversable cells,
/// that identifiers are unique, and that the target door exists.
pub fn validate(level: &LevelDefinition) -> Result<(), LevelError> {
    let traversable = |cell: CellCoord| {
        level
            .grid
            .kind(cell)
            .is_some_and(|kind| kind.is_traversable())
    };

    if !traversable(level.start) {
        return Err(LevelError::Misplaced {
            entity: "start".to_owned(),
            cell: level.start,
        });
    }

    let placements = level
        .items
        .iter()
        .map(|item| (&item.id, item.cell))
        .chain(level.switches.iter().map(|switch| (&switch.id, switch.cell)))
        .chain(level.doors.iter().map(|door| (&door.id, door.cell)));

    let mut seen: Vec<&String> = Vec::new();
    for (id, cell) in placements {
        if !traversable(cell) {
            return Err(LevelError::Misplaced {
                entity: id.clone(),
                cell,
            });
        }
        if seen.contains(&id) {
            return Err(LevelError::DuplicateId(id.clone()));
        }
        seen.push(id);
    }

    if !level.doors.iter().any(|door| door.id == level.target_door) {
        return Err(LevelError::UnknownTargetDoor(level.target_door.clone()));
    }

    Ok(())
}

/// The fixed teaching maze shared by every built-in task.
#[must_use]
pub fn sample_grid() -> Grid {
    match parse_grid(&SAMPLE_ROWS) {
        Ok(grid) => grid,
        Err(_) => Grid::new(10, 15, CellKind::Wall),
    }
}

/// Which of the three exits a task asks the player to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DoorSide {
    /// Opened with the red key.
    Left,
    /// Opened by turning the green switch on.
    Middle,
    /// Opened with the star badge.
    Right,
}

impl DoorSide {
    /// Identifier of the door in level data.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
        }
    }

    /// Parses a door identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "left" => Some(Self::Left),
            "middle" => Some(Self::Middle),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// A logic task presented before the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Task {
    /// Door the task asks the player to open.
    pub door: DoorSide,
    /// Instruction read out on the task screen.
    pub prompt: &'static str,
    /// Hint shown when the player is stuck.
    pub hint: &'static str,
    /// Message shown on the success screen.
    pub success_message: &'static str,
}

const CATALOG: [Task; 3] = [
    Task {
        door: DoorSide::Left,
        prompt: "Find the red key and open the left door!",
        hint: "You need the red key",
        success_message: "The red key opened the door! Level 1 clear!",
    },
    Task {
        door: DoorSide::Middle,
        prompt: "Turn the green switch ON and open the middle door!",
        hint: "Turn the green switch ON",
        success_message: "The green switch opened the door! Level 2 clear!",
    },
    Task {
        door: DoorSide::Right,
        prompt: "Collect the star badge and open the right door!",
        hint: "You need the shiny star",
        success_message: "The star badge opened the door! Level 3 clear!",
    },
];

/// Built-in tasks in teaching order, easiest first.
#[must_use]
pub fn catalog() -> &'static [Task] {
    &CATALOG
}

/// Builds the maze for a task, holding only the interactables it needs.
#[must_use]
pub fn level_for(door: DoorSide) -> LevelDefinition {
    let mut items = Vec::new();
    let mut switches = Vec::new();

    let (icon, condition) = match door {
        DoorSide::Left => {
            items.push(ItemDef {
                id: "key-red".to_owned(),
                cell: CellCoord::new(3, 5),
                icon: "🔑".to_owned(),
                name: "Red key".to_owned(),
            });
            ("🔑", DoorCondition::HasItem("key-red".to_owned()))
        }
        DoorSide::Middle => {
            switches.push(SwitchDef {
                id: "switch-green".to_owned(),
                cell: CellCoord::new(5, 10),
                icon: "🔘".to_owned(),
                name: "Green switch".to_owned(),
                initial: SwitchState::Off,
            });
            ("🔘", DoorCondition::SwitchOn("switch-green".to_owned()))
        }
        DoorSide::Right => {
            items.push(ItemDef {
                id: "badge-star".to_owned(),
                cell: CellCoord::new(7, 8),
                icon: "⭐".to_owned(),
                name: "Star badge".to_owned(),
            });
            ("⭐", DoorCondition::HasBadge("badge-star".to_owned()))
        }
    };

    LevelDefinition {
        id: format!("sample-{}", door.id()),
        grid: sample_grid(),
        start: SAMPLE_START,
        items,
        switches,
        doors: vec![DoorDef {
            id: door.id().to_owned(),
            cell: DOOR_CELL,
            icon: icon.to_owned(),
            condition,
        }],
        target_door: door.id().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rows_parse() {
        let grid = parse_grid(&SAMPLE_ROWS).expect("sample grid parses");
        assert_eq!(grid.columns(), 10);
        assert_eq!(grid.rows(), 15);
        assert_eq!(find_start(&grid).expect("start"), SAMPLE_START);
    }

    #[test]
    fn unknown_tiles_are_reported_with_position() {
        let error = parse_grid(&["#.#", "#x#"]).expect_err("x is not a tile");
        assert!(matches!(
            error,
            LevelError::UnknownTile {
                row: 1,
                column: 1,
                symbol: 'x'
            }
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = parse_grid(&["###", "##"]).expect_err("ragged");
        assert!(matches!(
            error,
            LevelError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let rows: [&str; 0] = [];
        assert!(matches!(parse_grid(&rows), Err(LevelError::EmptyGrid)));
    }

    #[test]
    fn two_start_tiles_are_ambiguous() {
        let grid = parse_grid(&["S.S"]).expect("parses");
        assert!(matches!(find_start(&grid), Err(LevelError::AmbiguousStart)));
    }

    #[test]
    fn door_ids_round_trip() {
        for task in catalog() {
            assert_eq!(DoorSide::from_id(task.door.id()), Some(task.door));
        }
        assert_eq!(DoorSide::from_id("back"), None);
    }
}
