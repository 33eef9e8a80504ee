//! The state catalog and the strategy every state implements.

use std::time::Duration;

use arena_core::{Character, TickTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::StateTimings;
use crate::effects::{Collaborators, TimedEffects};
use crate::error::FsmError;
use crate::input::InputFrame;
use crate::states;

/// The closed set of action states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateTag {
    Idle,
    Moving,
    Jumping,
    Charging,
    Throwing,
    Dodging,
    Hit,
    Ultimate,
}

impl StateTag {
    pub const COUNT: usize = 8;

    /// Every tag, in table order.
    pub const ALL: [StateTag; Self::COUNT] = [
        StateTag::Idle,
        StateTag::Moving,
        StateTag::Jumping,
        StateTag::Charging,
        StateTag::Throwing,
        StateTag::Dodging,
        StateTag::Hit,
        StateTag::Ultimate,
    ];

    /// Slot of this tag in a [`StateTable`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Animation trigger name, also used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Moving => "Moving",
            Self::Jumping => "Jumping",
            Self::Charging => "Charging",
            Self::Throwing => "Throwing",
            Self::Dodging => "Dodging",
            Self::Hit => "Hit",
            Self::Ultimate => "Ultimate",
        }
    }

    /// `true` for the states that disable movement while active.
    #[must_use]
    pub const fn locks_movement(self) -> bool {
        matches!(
            self,
            Self::Throwing | Self::Dodging | Self::Hit | Self::Ultimate
        )
    }
}

impl std::fmt::Display for StateTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a state hook may touch during one call.
///
/// A state asks for a transition with [`StateContext::change_state`]; the
/// machine performs it as soon as the update hook returns, in the same tick.
pub struct StateContext<'a> {
    pub character: &'a mut Character,
    /// The input sampled for this tick.
    pub input: InputFrame,
    pub collaborators: &'a mut Collaborators,
    pub effects: &'a mut TimedEffects,
    pub timings: &'a StateTimings,
    pub time: TickTime,
    requested: Option<StateTag>,
}

impl<'a> StateContext<'a> {
    pub(crate) fn new(
        character: &'a mut Character,
        input: InputFrame,
        collaborators: &'a mut Collaborators,
        effects: &'a mut TimedEffects,
        timings: &'a StateTimings,
        time: TickTime,
    ) -> Self {
        Self {
            character,
            input,
            collaborators,
            effects,
            timings,
            time,
            requested: None,
        }
    }

    /// Request a transition to `target`. A later request in the same hook
    /// replaces an earlier one.
    pub fn change_state(&mut self, target: StateTag) {
        if let Some(previous) = self.requested.replace(target) {
            warn!(
                entity = %self.character.id(),
                previous = %previous,
                target = %target,
                "transition request replaced"
            );
        }
    }

    /// The pending transition request, if any.
    #[must_use]
    pub fn requested(&self) -> Option<StateTag> {
        self.requested
    }

    pub(crate) fn take_request(&mut self) -> Option<StateTag> {
        self.requested.take()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.time.now
    }

    /// Time since `anchor`.
    #[must_use]
    pub fn elapsed_since(&self, anchor: Duration) -> Duration {
        self.time.since(anchor)
    }

    /// `true` when the horizontal input is strong enough to walk.
    #[must_use]
    pub fn wants_to_move(&self) -> bool {
        self.input.horizontal().abs() > self.timings.move_threshold
    }

    /// Idle or Moving, decided from the input sampled this tick.
    #[must_use]
    pub fn settled_state(&self) -> StateTag {
        if self.wants_to_move() {
            StateTag::Moving
        } else {
            StateTag::Idle
        }
    }

    /// Request the Idle/Moving state matching current input.
    pub fn settle(&mut self) {
        let target = self.settled_state();
        self.change_state(target);
    }
}

/// One state of the catalog.
///
/// Instances may keep per-activation fields; `enter` must reset them so that
/// re-entering the state starts from scratch.
pub trait CharacterState: std::fmt::Debug {
    fn tag(&self) -> StateTag;

    fn enter(&mut self, ctx: &mut StateContext<'_>);

    /// Called exactly once per tick while this state is active.
    fn update(&mut self, ctx: &mut StateContext<'_>);

    /// Release anything `enter` acquired.
    fn exit(&mut self, ctx: &mut StateContext<'_>);
}

/// One state instance per tag, indexed by [`StateTag::index`].
#[derive(Debug)]
pub struct StateTable {
    slots: Vec<Box<dyn CharacterState>>,
}

impl StateTable {
    /// Build a table from arbitrary state instances.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::DuplicateState`] if two instances report the same
    /// tag, or [`FsmError::MissingState`] if any tag has no instance.
    pub fn new(
        states: impl IntoIterator<Item = Box<dyn CharacterState>>,
    ) -> Result<Self, FsmError> {
        let mut slots: [Option<Box<dyn CharacterState>>; StateTag::COUNT] = Default::default();
        for state in states {
            let tag = state.tag();
            let slot = &mut slots[tag.index()];
            if slot.is_some() {
                return Err(FsmError::DuplicateState(tag));
            }
            *slot = Some(state);
        }
        if let Some(tag) = StateTag::ALL
            .into_iter()
            .find(|tag| slots[tag.index()].is_none())
        {
            return Err(FsmError::MissingState(tag));
        }
        Ok(Self {
            slots: slots.into_iter().flatten().collect(),
        })
    }

    /// The eight standard states.
    #[must_use]
    pub fn standard() -> Self {
        let slots: Vec<Box<dyn CharacterState>> = vec![
            Box::new(states::Idle),
            Box::new(states::Moving),
            Box::new(states::Jumping::default()),
            Box::new(states::Charging),
            Box::new(states::Throwing::default()),
            Box::new(states::Dodging::default()),
            Box::new(states::Hit::default()),
            Box::new(states::Ultimate::default()),
        ];
        debug_assert!(
            slots
                .iter()
                .enumerate()
                .all(|(index, state)| state.tag().index() == index)
        );
        Self { slots }
    }

    pub(crate) fn get_mut(&mut self, tag: StateTag) -> &mut dyn CharacterState {
        &mut *self.slots[tag.index()]
    }

    #[must_use]
    pub fn get(&self, tag: StateTag) -> &dyn CharacterState {
        &*self.slots[tag.index()]
    }
}
