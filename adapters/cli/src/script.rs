use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use serde::Deserialize;

/// One scripted pointer gesture or pause.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    /// Hold the pointer down at a canvas location in pixels.
    Press(Vec2),
    /// Lift the pointer.
    Release,
    /// Let time pass with the pointer unchanged.
    Wait(Duration),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    #[serde(default)]
    step: Vec<StepFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepFile {
    press: Option<[f32; 2]>,
    #[serde(default)]
    release: bool,
    wait_ms: Option<u64>,
}

impl StepFile {
    fn into_action(self, index: usize) -> Result<Action> {
        match (self.press, self.release, self.wait_ms) {
            (Some([x, y]), false, None) => Ok(Action::Press(Vec2::new(x, y))),
            (None, true, None) => Ok(Action::Release),
            (None, false, Some(ms)) => Ok(Action::Wait(Duration::from_millis(ms))),
            _ => bail!("step {index} must set exactly one of press, release or wait_ms"),
        }
    }
}

/// Reads a gesture script from disk.
pub(crate) fn load(path: &Path) -> Result<Vec<Action>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid script {}", path.display()))
}

fn parse(contents: &str) -> Result<Vec<Action>> {
    let file: ScriptFile = toml::from_str(contents)?;
    file.step
        .into_iter()
        .enumerate()
        .map(|(index, step)| step.into_action(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_keep_their_order() {
        let actions = parse(
            r#"
            [[step]]
            press = [112.0, 176.0]

            [[step]]
            release = true

            [[step]]
            wait_ms = 1500
            "#,
        )
        .expect("script parses");

        assert_eq!(
            actions,
            vec![
                Action::Press(Vec2::new(112.0, 176.0)),
                Action::Release,
                Action::Wait(Duration::from_millis(1500)),
            ]
        );
    }

    #[test]
    fn empty_script_has_no_actions() {
        assert!(parse("").expect("parses").is_empty());
    }

    #[test]
    fn step_with_two_gestures_is_rejected() {
        let error = parse("[[step]]\npress = [1.0, 2.0]\nwait_ms = 5").expect_err("ambiguous step");
        assert!(error.to_string().contains("step 0"));
    }

    #[test]
    fn blank_step_is_rejected() {
        assert!(parse("[[step]]\nrelease = false").is_err());
    }
}
