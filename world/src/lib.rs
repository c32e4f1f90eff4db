#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for the Doors Maze.
//!
//! The [`World`] owns the grid, the actor and the interactables of the active
//! level. It is only mutated through [`apply`], which validates move requests,
//! interpolates the actor on every tick and evaluates the cell the actor comes
//! to rest on. Everything the presentation layer needs to react to is reported
//! through the emitted [`Event`] list.

mod arrival;
mod occlusion;

use std::time::Duration;

use doors_maze_core::{
    CellCoord, CellKind, Command, Cue, Event, LevelDefinition, MoveRejection, SwitchState,
    Timeline,
};
use glam::Vec2;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

pub use arrival::Inventory;
pub use occlusion::{has_wall_between, has_wall_between_with, raster_line, CornerRule};

use arrival::{judge_door, DoorVerdict, WRONG_DOOR_MESSAGE};

const DEFAULT_MOVE_SPEED: f32 = 4.0;
const DEFAULT_ARRIVAL_EPSILON: f32 = 0.05;
const DEFAULT_SWITCH_COOLDOWN: Duration = Duration::from_millis(500);

/// Tunables of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Traversal speed in cells per second.
    pub move_speed: f32,
    /// Remaining distance, in cells, below which the actor snaps onto its target.
    pub arrival_epsilon: f32,
    /// Time a switch ignores the actor after toggling.
    #[serde(rename = "switch_cooldown_ms", with = "doors_maze_core::millis")]
    pub switch_cooldown: Duration,
    /// Whether single diagonal steps may pass a wall corner.
    pub corner_rule: CornerRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            arrival_epsilon: DEFAULT_ARRIVAL_EPSILON,
            switch_cooldown: DEFAULT_SWITCH_COOLDOWN,
            corner_rule: CornerRule::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKey {
    SwitchCooldown(usize),
}

#[derive(Clone, Debug)]
struct Actor {
    position: Vec2,
    target: Option<CellCoord>,
    last_progress: Duration,
}

impl Actor {
    fn at(cell: CellCoord) -> Self {
        Self {
            position: cell.to_position(),
            target: None,
            last_progress: Duration::ZERO,
        }
    }

    fn cell(&self) -> CellCoord {
        CellCoord::new(
            self.position.x.floor().max(0.0) as u32,
            self.position.y.floor().max(0.0) as u32,
        )
    }
}

#[derive(Clone, Debug)]
struct ActiveLevel {
    definition: LevelDefinition,
    collected: Vec<bool>,
    switch_states: Vec<SwitchState>,
    cooling: Vec<bool>,
}

impl ActiveLevel {
    fn new(definition: LevelDefinition) -> Self {
        Self {
            collected: vec![false; definition.items.len()],
            switch_states: definition
                .switches
                .iter()
                .map(|switch| switch.initial)
                .collect(),
            cooling: vec![false; definition.switches.len()],
            definition,
        }
    }

    fn switch_state(&self, id: &str) -> Option<SwitchState> {
        self.definition
            .switches
            .iter()
            .position(|switch| switch.id == id)
            .and_then(|index| self.switch_states.get(index).copied())
    }
}

/// Represents the authoritative state of one play session.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    level: Option<ActiveLevel>,
    actor: Actor,
    inventory: Inventory,
    timers: Timeline<TimerKey>,
    completed: bool,
}

impl World {
    /// Creates an empty session; a level must be loaded before moves are accepted.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            level: None,
            actor: Actor::at(CellCoord::new(0, 0)),
            inventory: Inventory::default(),
            timers: Timeline::new(),
            completed: false,
        }
    }

    fn load_level(&mut self, level: LevelDefinition, out_events: &mut Vec<Event>) {
        let id = level.id.clone();
        let start = level.start;
        if !level.grid.kind(start).is_some_and(CellKind::is_traversable) {
            warn!("refusing level {id}: start {start} is not walkable");
            out_events.push(Event::LevelRejected { level: id, start });
            return;
        }
        info!("loading level {id}");
        self.level = Some(ActiveLevel::new(level));
        self.inventory.clear();
        self.timers.clear();
        self.completed = false;
        out_events.push(Event::LevelLoaded { level: id });
        self.reset_actor(start, out_events);
    }

    fn reset_actor(&mut self, start: CellCoord, out_events: &mut Vec<Event>) {
        self.actor = Actor::at(start);
        self.actor.last_progress = self.timers.now();
        out_events.push(Event::ActorReset { cell: start });
    }

    fn validate_move(&self, target: CellCoord) -> Result<CellCoord, MoveRejection> {
        let level = self.level.as_ref().ok_or(MoveRejection::NoLevel)?;
        if self.actor.target.is_some() {
            return Err(MoveRejection::Busy);
        }

        let grid = &level.definition.grid;
        let kind = grid.kind(target).ok_or(MoveRejection::OutOfBounds)?;
        if !kind.is_traversable() {
            return Err(MoveRejection::Wall);
        }

        let from = self.actor.cell();
        if has_wall_between_with(grid, from, target, self.config.corner_rule) {
            return Err(MoveRejection::Occluded);
        }

        Ok(from)
    }

    fn request_move(&mut self, target: CellCoord, out_events: &mut Vec<Event>) {
        match self.validate_move(target) {
            Ok(from) => {
                debug!("moving from {from} toward {target}");
                self.actor.target = Some(target);
                self.actor.last_progress = self.timers.now();
                out_events.push(Event::MoveAccepted { from, to: target });
            }
            Err(reason) => {
                debug!("ignoring move to {target}: {reason:?}");
                out_events.push(Event::MoveRejected { target, reason });
            }
        }
    }

    fn expire_timers(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for key in self.timers.advance(dt) {
            match key {
                TimerKey::SwitchCooldown(index) => {
                    let Some(level) = self.level.as_mut() else {
                        continue;
                    };
                    if let Some(cooling) = level.cooling.get_mut(index) {
                        *cooling = false;
                    }
                    if let Some(switch) = level.definition.switches.get(index) {
                        out_events.push(Event::SwitchCooledDown {
                            switch: switch.id.clone(),
                        });
                    }
                }
            }
        }
    }

    fn advance_actor(&mut self, out_events: &mut Vec<Event>) {
        let Some(target) = self.actor.target else {
            return;
        };

        let now = self.timers.now();
        let elapsed = now.saturating_sub(self.actor.last_progress).as_secs_f32();
        self.actor.last_progress = now;

        let goal = target.to_position();
        let delta = goal - self.actor.position;
        let distance = delta.length();

        if distance < self.config.arrival_epsilon {
            self.actor.position = goal;
            self.actor.target = None;
            out_events.push(Event::ActorMoved { position: goal });
            out_events.push(Event::ActorArrived { cell: target });
            self.evaluate_arrival(target, out_events);
            return;
        }

        let progress = (self.config.move_speed * elapsed / distance).min(1.0);
        if progress > 0.0 {
            self.actor.position += delta * progress;
            trace!("actor at {:?}", self.actor.position);
            out_events.push(Event::ActorMoved {
                position: self.actor.position,
            });
        }
    }

    fn evaluate_arrival(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(level) = self.level.as_mut() else {
            return;
        };

        for (index, item) in level.definition.items.iter().enumerate() {
            if item.cell != cell || level.collected[index] {
                continue;
            }
            level.collected[index] = true;
            let category = self.inventory.collect(&item.id);
            info!("collected {}", item.id);
            out_events.push(Event::ItemCollected {
                item: item.id.clone(),
                category,
            });
            out_events.push(Event::CuePlayed { cue: Cue::Pickup });
        }

        for (index, switch) in level.definition.switches.iter().enumerate() {
            if switch.cell != cell || level.cooling[index] {
                continue;
            }
            let state = level.switch_states[index].toggled();
            level.switch_states[index] = state;
            level.cooling[index] = true;
            self.inventory.record_switch(&switch.id, state);
            self.timers
                .schedule(self.config.switch_cooldown, TimerKey::SwitchCooldown(index));
            info!("switch {} turned {state}", switch.id);
            out_events.push(Event::SwitchToggled {
                switch: switch.id.clone(),
                state,
            });
            out_events.push(Event::CuePlayed { cue: Cue::Switch });
        }

        let level = &*level;
        for door in level.definition.doors.iter().filter(|door| door.cell == cell) {
            let verdict = judge_door(&level.definition, &door.condition, &self.inventory, |id| {
                level.switch_state(id)
            });
            match verdict {
                DoorVerdict::Open { message } if door.id == level.definition.target_door => {
                    info!("door {} opened", door.id);
                    out_events.push(Event::DoorOpened {
                        door: door.id.clone(),
                        message,
                    });
                    out_events.push(Event::CuePlayed { cue: Cue::Success });
                    if !self.completed {
                        self.completed = true;
                        out_events.push(Event::LevelCompleted {
                            door: door.id.clone(),
                        });
                    }
                }
                DoorVerdict::Open { .. } => {
                    info!("door {} is not the target", door.id);
                    out_events.push(Event::WrongDoor {
                        door: door.id.clone(),
                        message: WRONG_DOOR_MESSAGE.to_owned(),
                    });
                    out_events.push(Event::CuePlayed { cue: Cue::Wrong });
                }
                DoorVerdict::Locked { reason } => {
                    info!("door {} locked: {reason}", door.id);
                    out_events.push(Event::DoorLocked {
                        door: door.id.clone(),
                        reason,
                    });
                    out_events.push(Event::CuePlayed { cue: Cue::Fail });
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => world.load_level(level, out_events),
        Command::ResetActor => {
            if let Some(start) = world.level.as_ref().map(|level| level.definition.start) {
                world.reset_actor(start, out_events);
            }
        }
        Command::RequestMove { target } => world.request_move(target, out_events),
        Command::StopMove => {
            if world.actor.target.take().is_some() {
                debug!("move stopped at {:?}", world.actor.position);
                out_events.push(Event::MoveStopped {
                    position: world.actor.position,
                });
            }
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.expire_timers(dt, out_events);
            world.advance_actor(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use doors_maze_core::{CellCoord, Grid, LevelDefinition, SwitchState};
    use glam::Vec2;

    use super::{Inventory, SessionConfig, World};

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Definition of the active level, if one is loaded.
    #[must_use]
    pub fn level(world: &World) -> Option<&LevelDefinition> {
        world.level.as_ref().map(|level| &level.definition)
    }

    /// Terrain of the active level, if one is loaded.
    #[must_use]
    pub fn grid(world: &World) -> Option<&Grid> {
        level(world).map(|level| &level.grid)
    }

    /// Continuous actor position in grid-cell units.
    #[must_use]
    pub fn actor_position(world: &World) -> Vec2 {
        world.actor.position
    }

    /// Cell currently occupied by the actor.
    #[must_use]
    pub fn actor_cell(world: &World) -> CellCoord {
        world.actor.cell()
    }

    /// Cell the actor is easing toward, if a move is in flight.
    #[must_use]
    pub fn move_target(world: &World) -> Option<CellCoord> {
        world.actor.target
    }

    /// Reports whether a move is in flight.
    #[must_use]
    pub fn is_moving(world: &World) -> bool {
        world.actor.target.is_some()
    }

    /// Items, badges and switch states gathered in the active level.
    #[must_use]
    pub fn inventory(world: &World) -> &Inventory {
        &world.inventory
    }

    /// Reports whether the item with the identifier was picked up.
    #[must_use]
    pub fn item_collected(world: &World, id: &str) -> bool {
        world.level.as_ref().is_some_and(|level| {
            level
                .definition
                .items
                .iter()
                .zip(&level.collected)
                .any(|(item, collected)| item.id == id && *collected)
        })
    }

    /// Current state of the switch with the identifier.
    #[must_use]
    pub fn switch_state(world: &World, id: &str) -> Option<SwitchState> {
        world.level.as_ref().and_then(|level| level.switch_state(id))
    }

    /// Reports whether the target door has been opened.
    #[must_use]
    pub fn is_completed(world: &World) -> bool {
        world.completed
    }

    /// Simulated time elapsed since the session was created.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.timers.now()
    }
}
