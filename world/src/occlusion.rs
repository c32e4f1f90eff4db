//! Line-of-sight test that keeps commanded moves from passing through walls.

use doors_maze_core::{CellCoord, Grid};
use serde::{Deserialize, Serialize};

/// How single diagonal steps between 8-adjacent cells are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerRule {
    /// Adjacent cells are always reachable, even past a wall corner.
    #[default]
    AllowAdjacent,
    /// A single diagonal step is blocked when either flanking cell is a wall.
    SealAdjacent,
}

/// Reports whether the straight path between two cells is blocked by a wall.
///
/// Identical and 8-directionally adjacent cells are never blocked. Longer paths
/// are rasterised with Bresenham's algorithm and blocked by any wall cell they
/// visit. Perfect diagonals use a stricter rule: every diagonal step also
/// samples the two cells flanking the corner it crosses, so a sprite cannot
/// slip between two walls that only touch at a corner. Cells outside the grid
/// count as walls throughout.
#[must_use]
pub fn has_wall_between(grid: &Grid, from: CellCoord, to: CellCoord) -> bool {
    has_wall_between_with(grid, from, to, CornerRule::AllowAdjacent)
}

/// [`has_wall_between`] with an explicit rule for single diagonal steps.
#[must_use]
pub fn has_wall_between_with(
    grid: &Grid,
    from: CellCoord,
    to: CellCoord,
    corner_rule: CornerRule,
) -> bool {
    let x1 = i64::from(from.column());
    let y1 = i64::from(from.row());
    let x2 = i64::from(to.column());
    let y2 = i64::from(to.row());

    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    if from.chebyshev_distance(to) <= 1 {
        return corner_rule == CornerRule::SealAdjacent
            && dx == 1
            && dy == 1
            && diagonal_blocked(grid, (x1, y1), (x2, y2));
    }

    if dx == dy {
        return diagonal_blocked(grid, (x1, y1), (x2, y2));
    }

    raster_blocked(grid, (x1, y1), (x2, y2))
}

/// Cells visited by Bresenham's line between two cells, endpoints included.
#[must_use]
pub fn raster_line(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    let _ = walk_line(
        (i64::from(from.column()), i64::from(from.row())),
        (i64::from(to.column()), i64::from(to.row())),
        |x, y| {
            if let (Ok(column), Ok(row)) = (u32::try_from(x), u32::try_from(y)) {
                cells.push(CellCoord::new(column, row));
            }
            false
        },
    );
    cells
}

fn raster_blocked(grid: &Grid, from: (i64, i64), to: (i64, i64)) -> bool {
    walk_line(from, to, |x, y| grid.is_wall_at(x, y))
}

/// Visits every rasterised cell until `visit` returns true or the end is
/// reached. Returns whether the walk was interrupted.
fn walk_line<F>(from: (i64, i64), to: (i64, i64), mut visit: F) -> bool
where
    F: FnMut(i64, i64) -> bool,
{
    let (x2, y2) = to;
    let dx = (x2 - from.0).abs();
    let dy = (y2 - from.1).abs();
    let sx = if from.0 < x2 { 1 } else { -1 };
    let sy = if from.1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = from;

    loop {
        if visit(x, y) {
            return true;
        }
        if x == x2 && y == y2 {
            return false;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

fn diagonal_blocked(grid: &Grid, from: (i64, i64), to: (i64, i64)) -> bool {
    let step_x = if from.0 < to.0 { 1 } else { -1 };
    let step_y = if from.1 < to.1 { 1 } else { -1 };
    let (mut x, mut y) = from;

    while (x, y) != to {
        let next_x = x + step_x;
        let next_y = y + step_y;

        if grid.is_wall_at(next_x, next_y) {
            return true;
        }
        // sealed corner
        if grid.is_wall_at(next_x, y) || grid.is_wall_at(x, next_y) {
            return true;
        }

        x = next_x;
        y = next_y;
    }

    false
}
