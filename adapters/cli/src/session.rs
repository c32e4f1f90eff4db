use std::{io::Write, mem, time::Duration};

use anyhow::Result;
use doors_maze_core::{Command, Event, LevelDefinition};
use doors_maze_system_movement::{Movement, PointerInput};
use doors_maze_system_progression::{FlowInput, FlowSignal, Progression, Screen, Vehicle};
use doors_maze_world::{self as world, query, World};

use crate::{config::AppConfig, report::Reporter, script::Action};

/// Fixed-step loop wiring the world to the movement and progression systems.
pub(crate) struct Session<W> {
    world: World,
    movement: Movement,
    progression: Progression,
    pointer: PointerInput,
    pending: Vec<Event>,
    frame: Duration,
    reporter: Reporter<W>,
    flow_driven: bool,
}

impl<W: Write> Session<W> {
    pub(crate) fn new(config: &AppConfig, frame: Duration, reporter: Reporter<W>) -> Self {
        Self {
            world: World::new(config.session),
            movement: Movement::new(config.movement),
            progression: Progression::new(config.progression),
            pointer: PointerInput::released(),
            pending: Vec::new(),
            frame,
            reporter,
            flow_driven: false,
        }
    }

    /// Loads a level straight into the world, bypassing the start screen.
    pub(crate) fn load(&mut self, level: LevelDefinition) -> Result<()> {
        self.submit(Command::LoadLevel { level })
    }

    /// Picks a vehicle on the start screen; the flow enters the maze on its own.
    ///
    /// From then on the pointer only reaches the maze while the game screen is shown.
    pub(crate) fn select_vehicle(&mut self, vehicle: Vehicle) -> Result<()> {
        self.flow_driven = true;
        self.flow(&[FlowInput::SelectVehicle(vehicle)])
    }

    pub(crate) fn perform(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Press(position) => {
                self.pointer = PointerInput::held_at(position);
                self.step(self.frame)
            }
            Action::Release => {
                self.pointer = PointerInput::released();
                self.step(self.frame)
            }
            Action::Wait(duration) => {
                let mut left = duration;
                while !left.is_zero() {
                    let dt = left.min(self.frame);
                    left -= dt;
                    self.step(dt)?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn finish(mut self) -> Result<W> {
        let inventory = query::inventory(&self.world);
        let mut collected: Vec<&str> = inventory
            .items()
            .iter()
            .chain(inventory.badges())
            .map(String::as_str)
            .collect();
        collected.sort_unstable();
        let switches: Vec<String> = inventory
            .switches()
            .iter()
            .map(|(id, state)| format!("{id}={state}"))
            .collect();

        let level = query::level(&self.world)
            .map_or_else(|| "none".to_owned(), |level| level.id.clone());
        let vehicle = self
            .progression
            .vehicle()
            .map_or_else(|| "none".to_owned(), |vehicle| format!("{} {vehicle:?}", vehicle.icon()));
        let screen = if self.flow_driven {
            format!("{:?}", self.progression.screen())
        } else {
            "bypassed".to_owned()
        };

        let lines = [
            ("level", level),
            ("vehicle", vehicle),
            ("actor", query::actor_cell(&self.world).to_string()),
            ("collected", collected.join(", ")),
            ("switches", switches.join(", ")),
            ("completed", query::is_completed(&self.world).to_string()),
            ("screen", screen),
        ];
        self.reporter.summary(&lines)?;
        Ok(self.reporter.into_inner())
    }

    fn step(&mut self, dt: Duration) -> Result<()> {
        let events = mem::take(&mut self.pending);
        let mut commands = Vec::new();
        let pointer = if self.flow_driven && self.progression.screen() != Screen::Game {
            PointerInput::released()
        } else {
            self.pointer
        };
        self.movement.handle(&events, pointer, &mut commands);

        let mut signals = Vec::new();
        self.progression
            .handle(&events, &[FlowInput::Elapsed(dt)], &mut commands, &mut signals);
        self.report_signals(&signals)?;

        for command in commands {
            self.submit(command)?;
        }
        self.submit(Command::Tick { dt })
    }

    fn flow(&mut self, inputs: &[FlowInput]) -> Result<()> {
        let mut commands = Vec::new();
        let mut signals = Vec::new();
        self.progression
            .handle(&[], inputs, &mut commands, &mut signals);
        self.report_signals(&signals)?;
        for command in commands {
            self.submit(command)?;
        }
        Ok(())
    }

    fn submit(&mut self, command: Command) -> Result<()> {
        let mut produced = Vec::new();
        world::apply(&mut self.world, command, &mut produced);
        let now = query::now(&self.world);
        for event in &produced {
            self.reporter.event(now, event)?;
        }
        self.pending.extend(produced);
        Ok(())
    }

    fn report_signals(&mut self, signals: &[FlowSignal]) -> Result<()> {
        let now = query::now(&self.world);
        for signal in signals {
            self.reporter.signal(now, signal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use doors_maze_levels::{level_for, DoorSide};
    use glam::Vec2;

    use super::*;

    const LEFT_ROUTE: [(f32, f32); 5] = [
        (112.0, 176.0),
        (144.0, 272.0),
        (176.0, 368.0),
        (176.0, 432.0),
        (240.0, 432.0),
    ];

    fn session() -> Session<Vec<u8>> {
        Session::new(
            &AppConfig::default(),
            Duration::from_millis(16),
            Reporter::new(Vec::new(), false, false),
        )
    }

    fn drive_left_route(session: &mut Session<Vec<u8>>) {
        for (x, y) in LEFT_ROUTE {
            session
                .perform(Action::Press(Vec2::new(x, y)))
                .expect("press");
            session.perform(Action::Release).expect("release");
            session
                .perform(Action::Wait(Duration::from_millis(1_500)))
                .expect("wait");
        }
    }

    fn output(session: Session<Vec<u8>>) -> String {
        String::from_utf8(session.finish().expect("summary")).expect("utf-8 output")
    }

    #[test]
    fn scripted_route_opens_left_door() {
        let mut session = session();
        session.load(level_for(DoorSide::Left)).expect("load");
        drive_left_route(&mut session);

        let text = output(session);
        assert!(text.contains("collected key-red (Item)"), "{text}");
        assert!(text.contains("level complete through door left"), "{text}");
        assert!(text.contains("completed: true"), "{text}");
        assert!(text.contains("actor: (7,13)"), "{text}");
    }

    #[test]
    fn vehicle_selection_enters_maze_after_delay() {
        let mut session = session();
        session.select_vehicle(Vehicle::Train).expect("select");
        session
            .perform(Action::Wait(Duration::from_millis(900)))
            .expect("wait");
        drive_left_route(&mut session);

        let text = output(session);
        assert!(text.contains("cue select"), "{text}");
        assert!(text.contains("level sample-left loaded"), "{text}");
        assert!(text.contains("screen Success"), "{text}");
        assert!(text.contains("vehicle: 🚂 Train"), "{text}");
        assert!(text.contains("screen: Success"), "{text}");
    }

    #[test]
    fn pointer_is_ignored_once_the_success_screen_is_up() {
        let mut session = session();
        session.select_vehicle(Vehicle::Car).expect("select");
        session
            .perform(Action::Wait(Duration::from_millis(900)))
            .expect("wait");
        drive_left_route(&mut session);

        session
            .perform(Action::Press(Vec2::new(176.0, 432.0)))
            .expect("press");
        session
            .perform(Action::Wait(Duration::from_millis(1_500)))
            .expect("wait");

        let text = output(session);
        let after_success = text
            .split("screen Success")
            .nth(1)
            .expect("success screen shown");
        assert!(!after_success.contains("move "), "{text}");
        assert!(text.contains("actor: (7,13)"), "{text}");
    }

    #[test]
    fn direct_play_reports_bypassed_flow() {
        let mut session = session();
        session.load(level_for(DoorSide::Left)).expect("load");
        drive_left_route(&mut session);

        let text = output(session);
        assert!(text.contains("screen: bypassed"), "{text}");
        assert!(text.contains("vehicle: none"), "{text}");
    }

    #[test]
    fn pressing_before_a_level_is_rejected() {
        let mut session = session();
        session
            .perform(Action::Press(Vec2::new(48.0, 48.0)))
            .expect("press");

        let text = output(session);
        assert!(text.contains("rejected: NoLevel"), "{text}");
        assert!(text.contains("level: none"), "{text}");
    }
}
