//! Free states: Idle, Moving, Jumping.

use std::time::Duration;

use super::{locomote, requested_action};
use crate::state::{CharacterState, StateContext, StateTag};

#[derive(Debug, Default, Clone, Copy)]
pub struct Idle;

impl CharacterState for Idle {
    fn tag(&self) -> StateTag {
        StateTag::Idle
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.collaborators.trigger(StateTag::Idle.name());
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        if let Some(action) = requested_action(ctx) {
            ctx.change_state(action);
        } else if ctx.wants_to_move() {
            ctx.change_state(StateTag::Moving);
        }
    }

    fn exit(&mut self, _ctx: &mut StateContext<'_>) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Moving;

impl CharacterState for Moving {
    fn tag(&self) -> StateTag {
        StateTag::Moving
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.collaborators.trigger(StateTag::Moving.name());
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        if let Some(action) = requested_action(ctx) {
            ctx.change_state(action);
        } else if !ctx.wants_to_move() {
            ctx.change_state(StateTag::Idle);
        } else {
            locomote(ctx);
        }
    }

    fn exit(&mut self, _ctx: &mut StateContext<'_>) {}
}

/// Airborne. Landing is reported by the physics step through
/// [`Character::grounded`](arena_core::Character::grounded); the state only
/// ends once the minimum airtime has also passed, so the launch tick (still
/// grounded) does not end the jump immediately.
///
/// The state neither launches nor lands the character. The caller owns both:
/// it clears `grounded` on takeoff and sets it again on touchdown. With no
/// physics step attached, `grounded` never changes and every jump ends as
/// soon as the minimum airtime has passed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Jumping {
    entered_at: Duration,
}

impl CharacterState for Jumping {
    fn tag(&self) -> StateTag {
        StateTag::Jumping
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        self.entered_at = ctx.now();
        ctx.collaborators.trigger(StateTag::Jumping.name());
        ctx.collaborators.play("jump");
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        locomote(ctx);
        let landed = ctx.character.grounded
            && ctx.elapsed_since(self.entered_at) >= ctx.timings.jump_min_airtime;
        if landed {
            ctx.settle();
        }
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        if ctx.character.grounded {
            ctx.collaborators.play("land");
        }
    }
}
