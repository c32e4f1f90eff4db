#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement system that turns pointer drags into move commands.
//!
//! While the pointer is held the system aims the actor at the cell beneath it,
//! but only once the previous move has finished: a move in flight is never
//! retargeted. A held pointer that stays on the cell it last aimed at sends
//! nothing more; lifting and pressing again aims anew. What happens on release
//! is governed by [`ReleasePolicy`].

use doors_maze_core::{cell_from_pixel, CellCoord, Command, Event, ReleasePolicy};
use glam::Vec2;
use log::trace;
use serde::{Deserialize, Serialize};

const DEFAULT_CELL_SIZE_PX: f32 = 32.0;

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Edge length of one grid cell on the canvas, in pixels.
    pub cell_size_px: f32,
    /// Whether releasing the pointer abandons a move in flight.
    pub release_policy: ReleasePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size_px: DEFAULT_CELL_SIZE_PX,
            release_policy: ReleasePolicy::default(),
        }
    }
}

/// Pointer state sampled once per frame by the adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Whether a pointer, touch or mouse button is held down.
    pub pressed: bool,
    /// Pointer location in canvas pixels, if known.
    pub position: Option<Vec2>,
}

impl PointerInput {
    /// Pointer held down at the provided canvas location.
    #[must_use]
    pub const fn held_at(position: Vec2) -> Self {
        Self {
            pressed: true,
            position: Some(position),
        }
    }

    /// Pointer released.
    #[must_use]
    pub const fn released() -> Self {
        Self {
            pressed: false,
            position: None,
        }
    }
}

/// Pure system that reacts to world events and pointer input with move commands.
#[derive(Debug)]
pub struct Movement {
    config: Config,
    moving: bool,
    was_pressed: bool,
    aimed_at: Option<CellCoord>,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            moving: false,
            was_pressed: false,
            aimed_at: None,
        }
    }

    /// Reports whether the system believes a move is in flight.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Consumes world events and the frame's pointer sample to emit commands.
    pub fn handle(&mut self, events: &[Event], input: PointerInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::MoveAccepted { .. } => self.moving = true,
                Event::ActorArrived { .. } | Event::MoveStopped { .. } => self.moving = false,
                Event::ActorReset { .. } | Event::LevelLoaded { .. } => {
                    self.moving = false;
                    self.aimed_at = None;
                }
                _ => {}
            }
        }

        if input.pressed {
            let target = input
                .position
                .and_then(|pixel| cell_from_pixel(pixel, self.config.cell_size_px));
            if let Some(target) = target {
                if !self.moving && self.aimed_at != Some(target) {
                    trace!("aiming at {target}");
                    self.aimed_at = Some(target);
                    out.push(Command::RequestMove { target });
                }
            }
        } else {
            if self.was_pressed
                && self.moving
                && self.config.release_policy == ReleasePolicy::CancelInFlight
            {
                out.push(Command::StopMove);
            }
            self.aimed_at = None;
        }

        self.was_pressed = input.pressed;
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_pointer_aims_at_cell_under_it() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();

        movement.handle(&[], PointerInput::held_at(Vec2::new(100.0, 170.0)), &mut commands);

        assert_eq!(
            commands,
            vec![Command::RequestMove {
                target: CellCoord::new(3, 5)
            }]
        );
    }

    #[test]
    fn pointer_outside_canvas_is_ignored() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();

        movement.handle(&[], PointerInput::held_at(Vec2::new(-4.0, 20.0)), &mut commands);
        movement.handle(
            &[],
            PointerInput {
                pressed: true,
                position: None,
            },
            &mut commands,
        );

        assert!(commands.is_empty());
    }

    #[test]
    fn accepted_move_tracks_flight_until_arrival() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        let accepted = Event::MoveAccepted {
            from: CellCoord::new(1, 1),
            to: CellCoord::new(1, 4),
        };

        movement.handle(&[accepted], PointerInput::released(), &mut commands);
        assert!(movement.is_moving());

        movement.handle(
            &[Event::ActorArrived {
                cell: CellCoord::new(1, 4),
            }],
            PointerInput::released(),
            &mut commands,
        );
        assert!(!movement.is_moving());
        assert!(commands.is_empty());
    }

    #[test]
    fn held_pointer_aims_once_per_cell() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        let held = PointerInput::held_at(Vec2::new(100.0, 170.0));

        movement.handle(&[], held, &mut commands);
        movement.handle(
            &[Event::MoveAccepted {
                from: CellCoord::new(1, 1),
                to: CellCoord::new(3, 5),
            }],
            held,
            &mut commands,
        );
        movement.handle(
            &[Event::ActorArrived {
                cell: CellCoord::new(3, 5),
            }],
            held,
            &mut commands,
        );
        movement.handle(&[], held, &mut commands);
        assert_eq!(commands.len(), 1);

        movement.handle(&[], PointerInput::released(), &mut commands);
        movement.handle(&[], held, &mut commands);
        assert_eq!(
            commands,
            vec![
                Command::RequestMove {
                    target: CellCoord::new(3, 5)
                };
                2
            ]
        );
    }

    #[test]
    fn level_load_forgets_previous_aim() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        let held = PointerInput::held_at(Vec2::new(48.0, 48.0));

        movement.handle(&[], held, &mut commands);
        movement.handle(
            &[Event::LevelLoaded {
                level: "sample-left".to_owned(),
            }],
            held,
            &mut commands,
        );

        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn custom_cell_size_changes_resolution() {
        let mut movement = Movement::new(Config {
            cell_size_px: 64.0,
            ..Config::default()
        });
        let mut commands = Vec::new();

        movement.handle(&[], PointerInput::held_at(Vec2::new(100.0, 170.0)), &mut commands);

        assert_eq!(
            commands,
            vec![Command::RequestMove {
                target: CellCoord::new(1, 2)
            }]
        );
    }
}
