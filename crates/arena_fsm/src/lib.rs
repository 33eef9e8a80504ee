//! # arena_fsm
//!
//! The action-state machine that sequences one combat entity through its
//! mutually-exclusive states.
//!
//! This crate provides:
//!
//! - [`StateTag`] and [`CharacterState`]: the closed state catalog and the
//!   enter/update/exit strategy every state implements.
//! - [`StateTable`]: the enum-indexed table, validated when it is built.
//! - [`StateMachine`]: owns the current state and performs transitions.
//! - [`states`]: the eight standard states.
//! - [`InputProvider`]: the injected input capability.
//! - [`Collaborators`] and [`TimedEffects`]: optional animation, audio and
//!   camera hooks, and the per-tick timed-effect scheduler.
//! - [`StateTimings`]: tunable durations and speeds.
//! - [`FsmError`]: configuration errors.

pub mod config;
pub mod effects;
pub mod error;
pub mod input;
pub mod machine;
pub mod state;
pub mod states;

pub use config::StateTimings;
pub use effects::{Animator, AudioSink, CameraRig, Collaborators, TimedAction, TimedEffects};
pub use error::FsmError;
pub use input::{Button, InputFrame, InputHandle, InputProvider};
pub use machine::StateMachine;
pub use state::{CharacterState, StateContext, StateTable, StateTag};
