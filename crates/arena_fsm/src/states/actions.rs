//! Charging, Throwing and Ultimate.

use super::{Lock, locomote};
use crate::state::{CharacterState, StateContext, StateTag};

/// Winding up a throw. Has no duration of its own: whoever started the charge
/// ends it with an explicit transition, and that caller also decides whether
/// movement is locked meanwhile.
#[derive(Debug, Default, Clone, Copy)]
pub struct Charging;

impl CharacterState for Charging {
    fn tag(&self) -> StateTag {
        StateTag::Charging
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.collaborators.trigger(StateTag::Charging.name());
        ctx.collaborators.play("charge");
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        locomote(ctx);
    }

    fn exit(&mut self, _ctx: &mut StateContext<'_>) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Throwing {
    lock: Lock,
}

impl CharacterState for Throwing {
    fn tag(&self) -> StateTag {
        StateTag::Throwing
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        self.lock.engage(ctx);
        ctx.collaborators.trigger(StateTag::Throwing.name());
        ctx.collaborators.play("throw");
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        if self.lock.elapsed(ctx) >= ctx.timings.throw_duration {
            ctx.settle();
        }
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        Lock::release(ctx);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Ultimate {
    lock: Lock,
}

impl CharacterState for Ultimate {
    fn tag(&self) -> StateTag {
        StateTag::Ultimate
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        self.lock.engage(ctx);
        ctx.collaborators.trigger(StateTag::Ultimate.name());
        ctx.collaborators.play("ultimate");
        ctx.collaborators.shake(
            ctx.timings.ultimate_shake_intensity,
            ctx.timings.ultimate_shake_duration,
        );
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        if self.lock.elapsed(ctx) >= ctx.timings.ultimate_duration {
            ctx.settle();
        }
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        Lock::release(ctx);
    }
}
