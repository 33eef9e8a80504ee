//! The per-entity state machine.
//!
//! A [`StateMachine`] owns one [`Character`] and exactly one active state.
//! Each tick it fires due timed effects, samples input once, and runs the
//! active state's update hook. If the hook asked for a transition the machine
//! performs it before returning: the old state's exit hook runs to completion,
//! then the new state's enter hook.

use std::time::Duration;

use arena_core::{Character, DamageSink, EntityId, TickTime};
use tracing::{debug, info};

use crate::config::StateTimings;
use crate::effects::{Collaborators, TimedEffects};
use crate::input::{InputFrame, InputProvider};
use crate::state::{StateContext, StateTable, StateTag};

/// Drives one entity through the state catalog.
pub struct StateMachine {
    table: StateTable,
    current: StateTag,
    entered_at: Duration,
    character: Character,
    input: Box<dyn InputProvider>,
    collaborators: Collaborators,
    effects: TimedEffects,
    timings: StateTimings,
    transitions: u64,
}

impl StateMachine {
    /// Bind a machine to `character` with the standard states and enter Idle.
    #[must_use]
    pub fn initialize(
        character: Character,
        input: Box<dyn InputProvider>,
        collaborators: Collaborators,
        timings: StateTimings,
        time: TickTime,
    ) -> Self {
        Self::with_table(
            StateTable::standard(),
            character,
            input,
            collaborators,
            timings,
            time,
        )
    }

    /// Like [`StateMachine::initialize`] with a custom, already validated table.
    #[must_use]
    pub fn with_table(
        table: StateTable,
        character: Character,
        input: Box<dyn InputProvider>,
        collaborators: Collaborators,
        timings: StateTimings,
        time: TickTime,
    ) -> Self {
        let mut machine = Self {
            table,
            current: StateTag::Idle,
            entered_at: time.now,
            character,
            input,
            collaborators,
            effects: TimedEffects::new(),
            timings,
            transitions: 0,
        };
        let input = machine.input.sample();
        let (table, mut ctx) = machine.split(time, input);
        table.get_mut(StateTag::Idle).enter(&mut ctx);
        if let Some(ignored) = ctx.take_request() {
            debug!(target_state = %ignored, "transition requested from enter hook ignored");
        }
        info!(entity = %machine.character.id(), name = machine.character.display_name(), "state machine initialised");
        machine
    }

    /// Borrow the table and a hook context over the rest of the machine.
    fn split(&mut self, time: TickTime, input: InputFrame) -> (&mut StateTable, StateContext<'_>) {
        let ctx = StateContext::new(
            &mut self.character,
            input,
            &mut self.collaborators,
            &mut self.effects,
            &self.timings,
            time,
        );
        (&mut self.table, ctx)
    }

    /// Run one tick.
    pub fn update(&mut self, time: TickTime) {
        self.effects.run_due(time.now, &mut self.collaborators);

        let input = self.input.sample();
        let current = self.current;
        let (table, mut ctx) = self.split(time, input);
        table.get_mut(current).update(&mut ctx);
        let requested = ctx.take_request();

        if let Some(target) = requested {
            self.transition(target, time, input);
        }
    }

    /// Leave the active state and enter `target`, even if it is the active
    /// state already. Used by callers outside the tick (damage, charge
    /// release, scripted sequences).
    pub fn change_state(&mut self, target: StateTag, time: TickTime) {
        let input = self.input.sample();
        self.transition(target, time, input);
    }

    fn transition(&mut self, target: StateTag, time: TickTime, input: InputFrame) {
        let from = self.current;
        let (table, mut ctx) = self.split(time, input);
        table.get_mut(from).exit(&mut ctx);
        table.get_mut(target).enter(&mut ctx);
        if let Some(ignored) = ctx.take_request() {
            debug!(target_state = %ignored, "transition requested from enter/exit hook ignored");
        }

        self.current = target;
        self.entered_at = time.now;
        self.transitions += 1;
        debug!(
            entity = %self.character.id(),
            tick_id = time.tick_id,
            from = %from,
            to = %target,
            "state transition"
        );
    }

    /// Apply combat damage and force hit-stun. A hit while already stunned
    /// restarts the stun.
    pub fn take_hit(&mut self, amount: u32, source: Option<EntityId>, time: TickTime) {
        self.character.apply_damage(amount, source);
        self.change_state(StateTag::Hit, time);
    }

    #[must_use]
    pub fn current(&self) -> StateTag {
        self.current
    }

    /// Time spent in the active state.
    #[must_use]
    pub fn elapsed_in_state(&self, now: Duration) -> Duration {
        now.saturating_sub(self.entered_at)
    }

    /// Number of transitions performed since initialisation.
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    #[must_use]
    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    #[must_use]
    pub fn timings(&self) -> &StateTimings {
        &self.timings
    }

    /// Pending timed effects.
    #[must_use]
    pub fn effects(&self) -> &TimedEffects {
        &self.effects
    }
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("entity", &self.character.id())
            .field("current", &self.current)
            .field("entered_at", &self.entered_at)
            .field("transitions", &self.transitions)
            .field("pending_effects", &self.effects.len())
            .finish_non_exhaustive()
    }
}
