//! Log-backed presentation hooks.
//!
//! The headless runner has no renderer or mixer, so animation, audio and
//! camera requests are written to the trace log under the fighter's entity.

use std::time::Duration;

use arena_core::EntityId;
use arena_fsm::{Animator, AudioSink, CameraRig, Collaborators};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy)]
struct LogAnimator(EntityId);

impl Animator for LogAnimator {
    fn trigger(&mut self, name: &str) {
        debug!(entity = %self.0, trigger = name, "animation");
    }

    fn set_flash(&mut self, on: bool) {
        trace!(entity = %self.0, on, "flash");
    }
}

#[derive(Debug, Clone, Copy)]
struct LogAudio(EntityId);

impl AudioSink for LogAudio {
    fn play(&mut self, cue: &str) {
        debug!(entity = %self.0, cue, "audio");
    }
}

#[derive(Debug, Clone, Copy)]
struct LogCamera(EntityId);

impl CameraRig for LogCamera {
    fn shake(&mut self, intensity: f32, duration: Duration) {
        debug!(
            entity = %self.0,
            intensity,
            duration_ms = duration.as_millis() as u64,
            "camera shake"
        );
    }
}

/// Collaborators that log every request for `entity`.
#[must_use]
pub fn logging_collaborators(entity: EntityId) -> Collaborators {
    Collaborators::none()
        .with_animator(LogAnimator(entity))
        .with_audio(LogAudio(entity))
        .with_camera(LogCamera(entity))
}
