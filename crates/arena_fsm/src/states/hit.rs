//! Hit-stun.

use super::Lock;
use crate::effects::TimedAction;
use crate::state::{CharacterState, StateContext, StateTag};

/// Locked for the stun duration after taking a hit.
///
/// The damage flash runs for a fixed number of cycles on the timed-effect
/// scheduler, so it may outlast the stun. It is cut short only when the stun
/// itself is cut short (a forced transition out, or a fresh hit).
#[derive(Debug, Default, Clone, Copy)]
pub struct Hit {
    lock: Lock,
}

impl Hit {
    fn stop_flash(ctx: &mut StateContext<'_>) {
        if ctx.effects.cancel(StateTag::Hit) > 0 {
            ctx.collaborators.flash(false);
        }
    }

    fn start_flash(ctx: &mut StateContext<'_>) {
        let cycles = ctx.timings.flash_cycles;
        if cycles == 0 {
            return;
        }
        let now = ctx.now();
        let interval = ctx.timings.flash_interval;
        ctx.collaborators.flash(true);
        // Alternating off/on edges, ending on off. Edges past the end of
        // representable time are never reached, so they are not queued.
        for step in 1..cycles.saturating_mul(2) {
            let Some(deadline) = interval
                .checked_mul(step)
                .and_then(|offset| now.checked_add(offset))
            else {
                break;
            };
            ctx.effects
                .schedule(deadline, StateTag::Hit, TimedAction::Flash(step % 2 == 0));
        }
    }
}

impl CharacterState for Hit {
    fn tag(&self) -> StateTag {
        StateTag::Hit
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        Self::stop_flash(ctx);
        self.lock.engage(ctx);
        ctx.collaborators.trigger(StateTag::Hit.name());
        ctx.collaborators.play("hit");
        ctx.collaborators
            .shake(ctx.timings.hit_shake_intensity, ctx.timings.hit_shake_duration);
        Self::start_flash(ctx);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        if self.lock.elapsed(ctx) >= ctx.timings.hit_duration {
            ctx.settle();
        }
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        if self.lock.elapsed(ctx) < ctx.timings.hit_duration {
            Self::stop_flash(ctx);
        }
        Lock::release(ctx);
    }
}
