//! Dodging: a short locked dash along a direction chosen at entry.

use arena_core::Facing;

use super::Lock;
use crate::state::{CharacterState, StateContext, StateTag};

/// Direction of a dodge started with the given horizontal input.
///
/// Any non-zero input picks its own sign. With no input the entity dodges
/// backwards, away from where it is facing.
#[must_use]
pub fn resolve_dodge_direction(horizontal: f32, facing: Facing) -> Facing {
    Facing::from_axis(horizontal).unwrap_or(facing.opposite())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Dodging {
    lock: Lock,
    direction: Option<Facing>,
}

impl CharacterState for Dodging {
    fn tag(&self) -> StateTag {
        StateTag::Dodging
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        self.direction = Some(resolve_dodge_direction(
            ctx.input.horizontal(),
            ctx.character.facing,
        ));
        self.lock.engage(ctx);
        ctx.collaborators.trigger(StateTag::Dodging.name());
        ctx.collaborators.play("dodge");
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        if self.lock.elapsed(ctx) >= ctx.timings.dodge_duration {
            ctx.settle();
            return;
        }
        if let Some(direction) = self.direction {
            ctx.character.position.x +=
                direction.sign() * ctx.timings.dodge_speed * ctx.time.dt_secs();
        }
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        self.direction = None;
        Lock::release(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_sign_wins() {
        assert_eq!(resolve_dodge_direction(0.7, Facing::Left), Facing::Right);
        assert_eq!(resolve_dodge_direction(-0.05, Facing::Right), Facing::Left);
    }

    #[test]
    fn test_no_input_dodges_backwards() {
        assert_eq!(resolve_dodge_direction(0.0, Facing::Right), Facing::Left);
        assert_eq!(resolve_dodge_direction(0.0, Facing::Left), Facing::Right);
    }
}
