//! Scripted input for demo sessions.
//!
//! A script is a list of keyframes. Each keyframe sets the horizontal axis
//! from its timestamp onward and may press buttons, land a hit, or release a
//! charge on that one tick.

use std::time::Duration;

use arena_core::clock::duration_ms;
use arena_fsm::{Button, InputFrame, InputHandle, StateTag};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    #[serde(with = "duration_ms")]
    pub at: Duration,
    /// New axis value. `None` keeps the previous one.
    #[serde(default)]
    pub horizontal: Option<f32>,
    #[serde(default)]
    pub press: Vec<Button>,
    /// Damage landed on the fighter by an outside attacker.
    #[serde(default)]
    pub hit: Option<u32>,
    /// Ends a held charge by switching the fighter to this state.
    #[serde(default)]
    pub release: Option<StateTag>,
}

impl Keyframe {
    #[must_use]
    pub fn at(at: Duration) -> Self {
        Self {
            at,
            horizontal: None,
            press: Vec::new(),
            hit: None,
            release: None,
        }
    }

    #[must_use]
    pub fn axis(mut self, horizontal: f32) -> Self {
        self.horizontal = Some(horizontal);
        self
    }

    #[must_use]
    pub fn press(mut self, button: Button) -> Self {
        self.press.push(button);
        self
    }

    #[must_use]
    pub fn hit(mut self, damage: u32) -> Self {
        self.hit = Some(damage);
        self
    }

    #[must_use]
    pub fn release(mut self, into: StateTag) -> Self {
        self.release = Some(into);
        self
    }
}

/// What the script asks of the world on one tick, beyond plain input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cue {
    /// Total damage landed this tick.
    pub hit: Option<u32>,
    /// State to release a charge into. The last keyframe wins.
    pub release: Option<StateTag>,
}

/// Keyframes in time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputScript(Vec<Keyframe>);

impl InputScript {
    #[must_use]
    pub fn new(mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by_key(|k| k.at);
        Self(keyframes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Plays an [`InputScript`] into an [`InputHandle`] shared with a state
/// machine.
#[derive(Debug)]
pub struct ScriptedDriver {
    keyframes: Vec<Keyframe>,
    cursor: usize,
    handle: InputHandle,
    horizontal: f32,
}

impl ScriptedDriver {
    #[must_use]
    pub fn new(script: InputScript) -> Self {
        // Deserialised scripts skip `InputScript::new`.
        let InputScript(mut keyframes) = script;
        keyframes.sort_by_key(|k| k.at);
        Self {
            keyframes,
            cursor: 0,
            handle: InputHandle::new(),
            horizontal: 0.0,
        }
    }

    /// The handle to give to the machine.
    #[must_use]
    pub fn handle(&self) -> InputHandle {
        self.handle.clone()
    }

    /// Publish the input for the tick at `now`. Returns the hits and charge
    /// release due on this tick.
    pub fn advance(&mut self, now: Duration) -> Cue {
        let mut presses = Vec::new();
        let mut cue = Cue::default();
        while let Some(key) = self.keyframes.get(self.cursor).filter(|k| k.at <= now) {
            if let Some(horizontal) = key.horizontal {
                self.horizontal = horizontal;
            }
            presses.extend_from_slice(&key.press);
            if let Some(damage) = key.hit {
                cue.hit = Some(cue.hit.unwrap_or(0).saturating_add(damage));
            }
            if key.release.is_some() {
                cue.release = key.release;
            }
            self.cursor += 1;
        }
        let frame = presses
            .into_iter()
            .fold(InputFrame::new(self.horizontal), InputFrame::with_press);
        self.handle.set(frame);
        cue
    }

    #[must_use]
    pub fn finished(&self) -> bool {
        self.cursor >= self.keyframes.len()
    }
}

#[cfg(test)]
mod tests {
    use arena_fsm::InputProvider;

    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_axis_holds_until_next_keyframe() {
        let script = InputScript::new(vec![
            Keyframe::at(ms(200)).axis(0.8),
            Keyframe::at(ms(500)).axis(0.0),
        ]);
        let mut driver = ScriptedDriver::new(script);
        let handle = driver.handle();

        driver.advance(ms(100));
        assert_eq!(handle.sample().horizontal(), 0.0);
        driver.advance(ms(200));
        assert_eq!(handle.sample().horizontal(), 0.8);
        driver.advance(ms(400));
        assert_eq!(handle.sample().horizontal(), 0.8);
        driver.advance(ms(500));
        assert_eq!(handle.sample().horizontal(), 0.0);
        assert!(driver.finished());
    }

    #[test]
    fn test_press_lasts_one_tick() {
        let script = InputScript::new(vec![Keyframe::at(ms(100)).press(Button::Dodge)]);
        let mut driver = ScriptedDriver::new(script);
        let handle = driver.handle();

        driver.advance(ms(100));
        assert!(handle.sample().pressed(Button::Dodge));
        driver.advance(ms(200));
        assert!(!handle.sample().pressed(Button::Dodge));
    }

    #[test]
    fn test_keyframes_between_ticks_are_merged() {
        let script = InputScript::new(vec![
            Keyframe::at(ms(110)).press(Button::Throw),
            Keyframe::at(ms(120)).axis(-1.0).hit(7),
            Keyframe::at(ms(150)).hit(3),
        ]);
        let mut driver = ScriptedDriver::new(script);
        let handle = driver.handle();

        assert_eq!(driver.advance(ms(100)).hit, None);
        assert_eq!(driver.advance(ms(200)).hit, Some(10));
        let frame = handle.sample();
        assert!(frame.pressed(Button::Throw));
        assert_eq!(frame.horizontal(), -1.0);
    }

    #[test]
    fn test_stacked_hits_saturate() {
        let script = InputScript::new(vec![
            Keyframe::at(ms(100)).hit(u32::MAX),
            Keyframe::at(ms(100)).hit(u32::MAX),
        ]);
        let mut driver = ScriptedDriver::new(script);
        assert_eq!(driver.advance(ms(100)).hit, Some(u32::MAX));
    }

    #[test]
    fn test_release_is_reported_once() {
        let script = InputScript::new(vec![
            Keyframe::at(ms(100)).press(Button::Charge),
            Keyframe::at(ms(400)).release(StateTag::Throwing),
        ]);
        let mut driver = ScriptedDriver::new(script);

        assert_eq!(driver.advance(ms(100)).release, None);
        assert_eq!(driver.advance(ms(400)).release, Some(StateTag::Throwing));
        assert_eq!(driver.advance(ms(500)), Cue::default());
    }

    #[test]
    fn test_script_from_json() {
        let script: InputScript = serde_json::from_str(
            r#"[
                { "at": 1500, "press": ["ultimate"] },
                { "at": 500, "horizontal": 0.5 },
                { "at": 1000, "release": "Throwing" }
            ]"#,
        )
        .unwrap();
        let mut driver = ScriptedDriver::new(script);
        let handle = driver.handle();

        driver.advance(ms(500));
        assert_eq!(handle.sample().horizontal(), 0.5);
        assert_eq!(driver.advance(ms(1000)).release, Some(StateTag::Throwing));
        driver.advance(ms(1500));
        assert!(handle.sample().pressed(Button::Ultimate));
    }
}
