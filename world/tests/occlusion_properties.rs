use doors_maze_core::{CellCoord, CellKind, Grid};
use doors_maze_world::{has_wall_between, has_wall_between_with, raster_line, CornerRule};
use proptest::prelude::*;

fn grid_with_walls() -> impl Strategy<Value = Grid> {
    (2u32..12, 2u32..12).prop_flat_map(|(columns, rows)| {
        prop::collection::vec(prop::bool::weighted(0.3), (columns * rows) as usize).prop_map(
            move |walls| {
                let mut grid = Grid::new(columns, rows, CellKind::Floor);
                for (index, wall) in walls.into_iter().enumerate() {
                    if wall {
                        let index = index as u32;
                        grid.set(
                            CellCoord::new(index % columns, index / columns),
                            CellKind::Wall,
                        );
                    }
                }
                grid
            },
        )
    })
}

fn cell_in(grid: &Grid, seed: (u32, u32)) -> CellCoord {
    CellCoord::new(seed.0 % grid.columns(), seed.1 % grid.rows())
}

fn is_wall(grid: &Grid, cell: CellCoord) -> bool {
    grid.kind(cell).map_or(true, |kind| !kind.is_traversable())
}

proptest! {
    #[test]
    fn adjacent_cells_are_never_occluded(
        grid in grid_with_walls(),
        seed in any::<(u32, u32)>(),
        offset in (-1i64..=1, -1i64..=1),
    ) {
        let from = cell_in(&grid, seed);
        let column = i64::from(from.column()) + offset.0;
        let row = i64::from(from.row()) + offset.1;
        prop_assume!(column >= 0 && row >= 0);
        let to = CellCoord::new(column as u32, row as u32);

        prop_assert!(!has_wall_between(&grid, from, to));
    }

    #[test]
    fn open_grids_never_occlude(
        columns in 1u32..16,
        rows in 1u32..16,
        a in any::<(u32, u32)>(),
        b in any::<(u32, u32)>(),
    ) {
        let grid = Grid::new(columns, rows, CellKind::Floor);
        let from = cell_in(&grid, a);
        let to = cell_in(&grid, b);

        prop_assert!(!has_wall_between(&grid, from, to));
        prop_assert!(!has_wall_between_with(&grid, from, to, CornerRule::SealAdjacent));
    }

    #[test]
    fn non_diagonal_paths_follow_the_raster(
        grid in grid_with_walls(),
        a in any::<(u32, u32)>(),
        b in any::<(u32, u32)>(),
    ) {
        let from = cell_in(&grid, a);
        let to = cell_in(&grid, b);
        let dx = from.column().abs_diff(to.column());
        let dy = from.row().abs_diff(to.row());
        prop_assume!(dx.max(dy) > 1 && dx != dy);

        let crosses_wall = raster_line(from, to)
            .into_iter()
            .any(|cell| is_wall(&grid, cell));
        prop_assert_eq!(has_wall_between(&grid, from, to), crosses_wall);
    }

    #[test]
    fn diagonal_walls_past_the_start_always_block(
        grid in grid_with_walls(),
        a in any::<(u32, u32)>(),
        length_seed in any::<u32>(),
    ) {
        let span = grid.columns().min(grid.rows());
        prop_assume!(span >= 3);
        let length = 2 + length_seed % (span - 2);
        let from = CellCoord::new(
            a.0 % (grid.columns() - length),
            a.1 % (grid.rows() - length),
        );
        let to = CellCoord::new(from.column() + length, from.row() + length);

        let crosses_wall = raster_line(from, to)
            .into_iter()
            .skip(1)
            .any(|cell| is_wall(&grid, cell));
        if crosses_wall {
            prop_assert!(has_wall_between(&grid, from, to));
        }
    }
}

#[test]
fn two_walls_touching_at_a_corner_seal_the_diagonal() {
    let mut grid = Grid::new(2, 2, CellKind::Floor);
    grid.set(CellCoord::new(1, 0), CellKind::Wall);
    grid.set(CellCoord::new(0, 1), CellKind::Wall);

    assert!(has_wall_between_with(
        &grid,
        CellCoord::new(0, 0),
        CellCoord::new(1, 1),
        CornerRule::SealAdjacent,
    ));
}
