#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Screen flow for the Doors Maze: vehicle selection, task briefing, the maze
//! itself and the success screen.
//!
//! The system never touches the world directly. It reacts to world events and
//! to [`FlowInput`] values from the adapter, answers with world [`Command`]s,
//! and reports presentation changes as [`FlowSignal`]s.

use std::{collections::BTreeSet, time::Duration};

use doors_maze_core::{Command, Cue, Event, Timeline};
use doors_maze_levels::{catalog, level_for, DoorSide, Task};
use log::{debug, info};
use serde::{Deserialize, Serialize};

const DEFAULT_SELECTION_DELAY: Duration = Duration::from_millis(800);
const DEFAULT_HINT_DELAY: Duration = Duration::from_secs(30);
const DEFAULT_HINT_DISPLAY: Duration = Duration::from_secs(3);

/// Timing parameters of the screen flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pause between picking a vehicle and entering the maze.
    #[serde(rename = "selection_delay_ms", with = "doors_maze_core::millis")]
    pub selection_delay: Duration,
    /// Time without progress in the maze before the hint appears.
    #[serde(rename = "hint_delay_ms", with = "doors_maze_core::millis")]
    pub hint_delay: Duration,
    /// How long a hint stays on screen.
    #[serde(rename = "hint_display_ms", with = "doors_maze_core::millis")]
    pub hint_display: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selection_delay: DEFAULT_SELECTION_DELAY,
            hint_delay: DEFAULT_HINT_DELAY,
            hint_display: DEFAULT_HINT_DISPLAY,
        }
    }
}

/// Screens the player moves between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Vehicle selection.
    #[default]
    Start,
    /// Briefing that reads out the current task.
    Task,
    /// The maze.
    Game,
    /// Shown after the target door opened.
    Success,
}

/// Vehicles the player can drive through the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vehicle {
    /// Car.
    Car,
    /// Bus.
    Bus,
    /// Train.
    Train,
    /// Plane.
    Plane,
}

impl Vehicle {
    /// Emoji drawn for the actor.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Car => "🚗",
            Self::Bus => "🚌",
            Self::Train => "🚂",
            Self::Plane => "✈️",
        }
    }
}

/// Player and clock input delivered by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowInput {
    /// A vehicle was picked on the start screen.
    SelectVehicle(Vehicle),
    /// The start button on the task screen was pressed.
    StartGame,
    /// The hint button was pressed.
    RequestHint,
    /// The next-game button on the success screen was pressed.
    NextGame,
    /// The home button was pressed.
    GoHome,
    /// Wall-clock time passed.
    Elapsed(Duration),
}

/// Presentation changes produced by the flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowSignal {
    /// A different screen became visible.
    ScreenChanged(Screen),
    /// A sound cue should be played.
    Cue(Cue),
    /// A line should be read aloud.
    Narrate(String),
    /// The hint bubble appeared with the provided text.
    HintShown(String),
    /// The hint bubble disappeared.
    HintHidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKey {
    EnterGame,
    ShowHint,
    HideHint,
}

/// Pure system that drives the screen flow.
#[derive(Debug)]
pub struct Progression {
    config: Config,
    screen: Screen,
    vehicle: Option<Vehicle>,
    task: Option<&'static Task>,
    completed: BTreeSet<DoorSide>,
    hint_visible: bool,
    timers: Timeline<TimerKey>,
}

impl Progression {
    /// Creates the flow on the start screen with no task completed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            screen: Screen::Start,
            vehicle: None,
            task: None,
            completed: BTreeSet::new(),
            hint_visible: false,
            timers: Timeline::new(),
        }
    }

    /// Screen currently shown.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Vehicle picked on the start screen, if any.
    #[must_use]
    pub fn vehicle(&self) -> Option<Vehicle> {
        self.vehicle
    }

    /// Task being played or briefed.
    #[must_use]
    pub fn current_task(&self) -> Option<&'static Task> {
        self.task
    }

    /// Doors whose tasks have been solved.
    #[must_use]
    pub fn completed(&self) -> &BTreeSet<DoorSide> {
        &self.completed
    }

    /// Reports whether the hint bubble is visible.
    #[must_use]
    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    /// Consumes world events and adapter inputs, emitting world commands and
    /// presentation signals.
    pub fn handle(
        &mut self,
        events: &[Event],
        inputs: &[FlowInput],
        out_commands: &mut Vec<Command>,
        out_signals: &mut Vec<FlowSignal>,
    ) {
        for event in events {
            match event {
                Event::MoveAccepted { .. } if self.screen == Screen::Game => {
                    self.timers.schedule(self.config.hint_delay, TimerKey::ShowHint);
                }
                Event::LevelCompleted { door } if self.screen == Screen::Game => {
                    self.complete(door, out_signals);
                }
                _ => {}
            }
        }

        for input in inputs {
            match *input {
                FlowInput::SelectVehicle(vehicle) => self.select_vehicle(vehicle, out_signals),
                FlowInput::StartGame => {
                    if self.screen == Screen::Task {
                        self.start_game(out_commands, out_signals);
                    } else {
                        debug!("start ignored on {:?}", self.screen);
                    }
                }
                FlowInput::RequestHint => {
                    if self.screen == Screen::Game {
                        self.show_hint(out_signals);
                    }
                }
                FlowInput::NextGame => {
                    if self.screen == Screen::Success {
                        self.setup_task();
                        self.show(Screen::Task, out_signals);
                        if let Some(task) = self.task {
                            out_signals.push(FlowSignal::Narrate(task.prompt.to_owned()));
                        }
                    }
                }
                FlowInput::GoHome => self.go_home(out_signals),
                FlowInput::Elapsed(dt) => self.elapse(dt, out_commands, out_signals),
            }
        }
    }

    fn select_vehicle(&mut self, vehicle: Vehicle, out_signals: &mut Vec<FlowSignal>) {
        if self.screen != Screen::Start {
            debug!("vehicle selection ignored on {:?}", self.screen);
            return;
        }
        info!("selected {vehicle:?}");
        self.vehicle = Some(vehicle);
        out_signals.push(FlowSignal::Cue(Cue::Select));
        self.timers
            .schedule(self.config.selection_delay, TimerKey::EnterGame);
    }

    fn setup_task(&mut self) {
        let tasks = catalog();
        self.task = tasks
            .iter()
            .find(|task| !self.completed.contains(&task.door))
            .or_else(|| tasks.first());
    }

    fn start_game(&mut self, out_commands: &mut Vec<Command>, out_signals: &mut Vec<FlowSignal>) {
        if self.task.is_none() {
            self.setup_task();
        }
        let Some(task) = self.task else {
            return;
        };

        info!("starting task {}", task.door.id());
        out_commands.push(Command::LoadLevel {
            level: level_for(task.door),
        });
        self.show(Screen::Game, out_signals);
        out_signals.push(FlowSignal::Cue(Cue::Start));
        out_signals.push(FlowSignal::Narrate(task.prompt.to_owned()));
        self.timers.schedule(self.config.hint_delay, TimerKey::ShowHint);
    }

    fn show_hint(&mut self, out_signals: &mut Vec<FlowSignal>) {
        let Some(task) = self.task else {
            return;
        };
        let _ = self.timers.cancel(&TimerKey::ShowHint);
        self.hint_visible = true;
        out_signals.push(FlowSignal::HintShown(task.hint.to_owned()));
        out_signals.push(FlowSignal::Narrate(task.hint.to_owned()));
        self.timers
            .schedule(self.config.hint_display, TimerKey::HideHint);
    }

    fn hide_hint(&mut self, out_signals: &mut Vec<FlowSignal>) {
        let _ = self.timers.cancel(&TimerKey::HideHint);
        if self.hint_visible {
            self.hint_visible = false;
            out_signals.push(FlowSignal::HintHidden);
        }
    }

    fn complete(&mut self, door: &str, out_signals: &mut Vec<FlowSignal>) {
        let Some(task) = self.task else {
            return;
        };
        if task.door.id() != door {
            debug!("door {door} does not belong to the current task");
            return;
        }
        let _ = self.completed.insert(task.door);
        info!("task {door} complete");
        self.show(Screen::Success, out_signals);
        out_signals.push(FlowSignal::Narrate(task.success_message.to_owned()));
    }

    fn go_home(&mut self, out_signals: &mut Vec<FlowSignal>) {
        self.hide_hint(out_signals);
        self.timers.clear();
        self.vehicle = None;
        self.task = None;
        self.show(Screen::Start, out_signals);
    }

    fn elapse(
        &mut self,
        dt: Duration,
        out_commands: &mut Vec<Command>,
        out_signals: &mut Vec<FlowSignal>,
    ) {
        for key in self.timers.advance(dt) {
            match key {
                TimerKey::EnterGame => {
                    self.setup_task();
                    self.start_game(out_commands, out_signals);
                }
                TimerKey::ShowHint => self.show_hint(out_signals),
                TimerKey::HideHint => self.hide_hint(out_signals),
            }
        }
    }

    fn show(&mut self, screen: Screen, out_signals: &mut Vec<FlowSignal>) {
        if self.screen == Screen::Game && screen != Screen::Game {
            let _ = self.timers.cancel(&TimerKey::ShowHint);
            self.hide_hint(out_signals);
        }
        self.screen = screen;
        out_signals.push(FlowSignal::ScreenChanged(screen));
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
