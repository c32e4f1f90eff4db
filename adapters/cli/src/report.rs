use std::{io::Write, time::Duration};

use anyhow::Result;
use doors_maze_core::Event;
use doors_maze_system_progression::FlowSignal;
use serde::Serialize;

/// Writes world events and flow signals as text lines or JSON records.
#[derive(Debug)]
pub(crate) struct Reporter<W> {
    out: W,
    json: bool,
    all_events: bool,
}

#[derive(Serialize)]
struct Record<'a> {
    at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    world: Option<&'a Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flow: Option<&'a FlowSignal>,
}

impl<W: Write> Reporter<W> {
    pub(crate) fn new(out: W, json: bool, all_events: bool) -> Self {
        Self {
            out,
            json,
            all_events,
        }
    }

    pub(crate) fn event(&mut self, at: Duration, event: &Event) -> Result<()> {
        if self.json {
            return self.record(Record {
                at_ms: millis(at),
                world: Some(event),
                flow: None,
            });
        }
        match describe_event(event, self.all_events) {
            Some(text) => self.line(at, &text),
            None => Ok(()),
        }
    }

    pub(crate) fn signal(&mut self, at: Duration, signal: &FlowSignal) -> Result<()> {
        if self.json {
            return self.record(Record {
                at_ms: millis(at),
                world: None,
                flow: Some(signal),
            });
        }
        self.line(at, &describe_signal(signal))
    }

    pub(crate) fn summary(&mut self, lines: &[(&str, String)]) -> Result<()> {
        if self.json {
            let summary: serde_json::Map<String, serde_json::Value> = lines
                .iter()
                .map(|(key, value)| ((*key).to_owned(), serde_json::Value::from(value.as_str())))
                .collect();
            serde_json::to_writer(&mut self.out, &serde_json::json!({ "summary": summary }))?;
            writeln!(self.out)?;
            return Ok(());
        }
        for (key, value) in lines {
            writeln!(self.out, "{key}: {value}")?;
        }
        Ok(())
    }

    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn record(&mut self, record: Record<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, &record)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn line(&mut self, at: Duration, text: &str) -> Result<()> {
        writeln!(self.out, "{:>8.3}s  {text}", at.as_secs_f64())?;
        Ok(())
    }
}

fn millis(at: Duration) -> u64 {
    u64::try_from(at.as_millis()).unwrap_or(u64::MAX)
}

fn describe_event(event: &Event, all_events: bool) -> Option<String> {
    let text = match event {
        Event::LevelLoaded { level } => format!("level {level} loaded"),
        Event::LevelRejected { level, start } => {
            format!("level {level} rejected: start {start} is not walkable")
        }
        Event::ActorReset { cell } => format!("actor placed at {cell}"),
        Event::TimeAdvanced { dt } if all_events => format!("tick {} ms", dt.as_millis()),
        Event::TimeAdvanced { .. } => return None,
        Event::MoveAccepted { from, to } => format!("move {from} -> {to}"),
        Event::MoveRejected { target, reason } => format!("move to {target} rejected: {reason:?}"),
        Event::MoveStopped { position } => {
            format!("stopped at ({:.2},{:.2})", position.x, position.y)
        }
        Event::ActorMoved { position } if all_events => {
            format!("actor at ({:.2},{:.2})", position.x, position.y)
        }
        Event::ActorMoved { .. } => return None,
        Event::ActorArrived { cell } => format!("arrived at {cell}"),
        Event::ItemCollected { item, category } => format!("collected {item} ({category:?})"),
        Event::SwitchToggled { switch, state } => format!("switch {switch} turned {state}"),
        Event::SwitchCooledDown { switch } => format!("switch {switch} ready"),
        Event::DoorOpened { door, message } => format!("door {door} opened: {message}"),
        Event::WrongDoor { door, message } => format!("door {door}: {message}"),
        Event::DoorLocked { door, reason } => format!("door {door} locked: {reason}"),
        Event::CuePlayed { cue } => format!("cue {}", cue.as_str()),
        Event::LevelCompleted { door } => format!("level complete through door {door}"),
    };
    Some(text)
}

fn describe_signal(signal: &FlowSignal) -> String {
    match signal {
        FlowSignal::ScreenChanged(screen) => format!("screen {screen:?}"),
        FlowSignal::Cue(cue) => format!("cue {}", cue.as_str()),
        FlowSignal::Narrate(text) => format!("say \"{text}\""),
        FlowSignal::HintShown(text) => format!("hint: {text}"),
        FlowSignal::HintHidden => "hint hidden".to_owned(),
    }
}
