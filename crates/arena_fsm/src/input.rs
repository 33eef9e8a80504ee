//! Input capability.
//!
//! States never reach for a global input manager. The machine is given an
//! [`InputProvider`] at construction and samples it once per tick; the sample
//! is handed to the active state as an [`InputFrame`].

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Discrete action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Jump,
    Throw,
    Dodge,
    Charge,
    Ultimate,
}

impl Button {
    pub const ALL: [Button; 5] = [
        Button::Jump,
        Button::Throw,
        Button::Dodge,
        Button::Charge,
        Button::Ultimate,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// One tick's worth of input: the horizontal axis and the buttons whose press
/// edge happened this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    horizontal: f32,
    pressed: u8,
}

impl InputFrame {
    /// A frame with the given horizontal axis, clamped to `[-1, 1]`.
    /// Non-finite values read as zero.
    #[must_use]
    pub fn new(horizontal: f32) -> Self {
        let horizontal = if horizontal.is_finite() {
            horizontal.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Self {
            horizontal,
            pressed: 0,
        }
    }

    /// No axis input, no presses.
    #[must_use]
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Add a press edge for `button`.
    #[must_use]
    pub fn with_press(mut self, button: Button) -> Self {
        self.pressed |= button.bit();
        self
    }

    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.horizontal
    }

    /// `true` if `button` was pressed this tick.
    #[must_use]
    pub fn pressed(&self, button: Button) -> bool {
        self.pressed & button.bit() != 0
    }

}

/// Source of per-tick input. The core only reads it.
pub trait InputProvider {
    fn sample(&self) -> InputFrame;
}

impl InputProvider for InputFrame {
    fn sample(&self) -> InputFrame {
        *self
    }
}

/// A shared input slot. The driver writes a frame each tick, the machine
/// reads it. Cloning shares the slot.
#[derive(Debug, Clone, Default)]
pub struct InputHandle(Rc<Cell<InputFrame>>);

impl InputHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame.
    pub fn set(&self, frame: InputFrame) {
        self.0.set(frame);
    }
}

impl InputProvider for InputHandle {
    fn sample(&self) -> InputFrame {
        self.0.get()
    }
}
