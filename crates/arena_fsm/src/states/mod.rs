//! The standard state catalog.
//!
//! | State    | Movement | Ends when                                  |
//! |----------|----------|--------------------------------------------|
//! | Idle     | free     | input above threshold, or an action button |
//! | Moving   | free     | input at or below threshold, or a button   |
//! | Jumping  | free     | grounded and minimum airtime elapsed       |
//! | Charging | caller   | an explicit external transition            |
//! | Throwing | locked   | throw duration elapsed                     |
//! | Dodging  | locked   | dodge duration elapsed                     |
//! | Hit      | locked   | hit-stun elapsed                           |
//! | Ultimate | locked   | ultimate duration elapsed                  |
//!
//! Every timed state measures from its own enter timestamp, and every locked
//! state picks Idle or Moving from the input sampled on the tick it ends.

mod actions;
mod dodge;
mod hit;
mod locomotion;

use std::time::Duration;

use arena_core::Facing;

pub use actions::{Charging, Throwing, Ultimate};
pub use dodge::{Dodging, resolve_dodge_direction};
pub use hit::Hit;
pub use locomotion::{Idle, Jumping, Moving};

use crate::input::Button;
use crate::state::{StateContext, StateTag};

/// The action a free state should start this tick, by button priority.
fn requested_action(ctx: &StateContext<'_>) -> Option<StateTag> {
    let input = ctx.input;
    if input.pressed(Button::Ultimate) {
        Some(StateTag::Ultimate)
    } else if input.pressed(Button::Dodge) {
        Some(StateTag::Dodging)
    } else if input.pressed(Button::Throw) {
        Some(StateTag::Throwing)
    } else if input.pressed(Button::Charge) {
        Some(StateTag::Charging)
    } else if input.pressed(Button::Jump) && ctx.character.grounded {
        Some(StateTag::Jumping)
    } else {
        None
    }
}

/// Horizontal kinematic step, skipped while movement is locked.
fn locomote(ctx: &mut StateContext<'_>) {
    if !ctx.character.can_move {
        return;
    }
    let horizontal = ctx.input.horizontal();
    if let Some(facing) = Facing::from_axis(horizontal) {
        ctx.character.facing = facing;
    }
    ctx.character.position.x += horizontal * ctx.timings.move_speed * ctx.time.dt_secs();
}

/// Enter timestamp and movement lock shared by the fixed-duration states.
#[derive(Debug, Default, Clone, Copy)]
struct Lock {
    entered_at: Duration,
}

impl Lock {
    fn engage(&mut self, ctx: &mut StateContext<'_>) {
        self.entered_at = ctx.now();
        ctx.character.can_move = false;
    }

    fn elapsed(&self, ctx: &StateContext<'_>) -> Duration {
        ctx.elapsed_since(self.entered_at)
    }

    fn release(ctx: &mut StateContext<'_>) {
        ctx.character.can_move = true;
    }
}
