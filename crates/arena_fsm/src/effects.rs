//! Side-effect collaborators and the timed-effect scheduler.
//!
//! Animation, audio and camera live outside the core. States reach them only
//! through [`Collaborators`], where each hook is optional and an absent hook
//! turns the call into a no-op.
//!
//! Effects that outlive a single call (the hit flash) are queued on
//! [`TimedEffects`] as `(deadline, owner, action)` entries and fired by the
//! machine at the start of each tick.

use std::time::Duration;

use tracing::trace;

use crate::state::StateTag;

/// Animation playback.
pub trait Animator {
    /// Fire a named animation trigger.
    fn trigger(&mut self, name: &str);

    /// Toggle the damage flash overlay.
    fn set_flash(&mut self, _on: bool) {}
}

/// Audio playback.
pub trait AudioSink {
    fn play(&mut self, cue: &str);
}

/// Camera effects.
pub trait CameraRig {
    fn shake(&mut self, intensity: f32, duration: Duration);
}

/// The optional side-effect hooks for one entity.
#[derive(Default)]
pub struct Collaborators {
    animator: Option<Box<dyn Animator>>,
    audio: Option<Box<dyn AudioSink>>,
    camera: Option<Box<dyn CameraRig>>,
}

impl Collaborators {
    /// No hooks at all. Every call is a no-op.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_animator(mut self, animator: impl Animator + 'static) -> Self {
        self.animator = Some(Box::new(animator));
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: impl CameraRig + 'static) -> Self {
        self.camera = Some(Box::new(camera));
        self
    }

    pub fn trigger(&mut self, name: &str) {
        match self.animator.as_mut() {
            Some(animator) => animator.trigger(name),
            None => trace!(name, "no animator, trigger skipped"),
        }
    }

    pub fn flash(&mut self, on: bool) {
        match self.animator.as_mut() {
            Some(animator) => animator.set_flash(on),
            None => trace!(on, "no animator, flash skipped"),
        }
    }

    pub fn play(&mut self, cue: &str) {
        match self.audio.as_mut() {
            Some(audio) => audio.play(cue),
            None => trace!(cue, "no audio sink, cue skipped"),
        }
    }

    pub fn shake(&mut self, intensity: f32, duration: Duration) {
        match self.camera.as_mut() {
            Some(camera) => camera.shake(intensity, duration),
            None => trace!(intensity, "no camera rig, shake skipped"),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("animator", &self.animator.is_some())
            .field("audio", &self.audio.is_some())
            .field("camera", &self.camera.is_some())
            .finish()
    }
}

/// A deferred side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum TimedAction {
    Flash(bool),
}

impl TimedAction {
    fn run(&self, collaborators: &mut Collaborators) {
        match self {
            Self::Flash(on) => collaborators.flash(*on),
        }
    }
}

#[derive(Debug, Clone)]
struct Scheduled {
    deadline: Duration,
    owner: StateTag,
    action: TimedAction,
}

/// Pending timed effects, kept sorted by deadline.
#[derive(Debug, Default)]
pub struct TimedEffects {
    pending: Vec<Scheduled>,
}

impl TimedEffects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to run on the first tick at or after `deadline`.
    /// Entries with equal deadlines run in the order they were queued.
    pub fn schedule(&mut self, deadline: Duration, owner: StateTag, action: TimedAction) {
        let at = self.pending.partition_point(|s| s.deadline <= deadline);
        self.pending.insert(
            at,
            Scheduled {
                deadline,
                owner,
                action,
            },
        );
    }

    /// Drop every pending entry queued by `owner`. Returns how many were dropped.
    pub fn cancel(&mut self, owner: StateTag) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.owner != owner);
        before - self.pending.len()
    }

    /// Run and remove every entry whose deadline is at or before `now`.
    /// Returns how many ran.
    pub fn run_due(&mut self, now: Duration, collaborators: &mut Collaborators) -> usize {
        let due = self.pending.partition_point(|s| s.deadline <= now);
        for scheduled in self.pending.drain(..due) {
            trace!(owner = %scheduled.owner, action = ?scheduled.action, "timed effect");
            scheduled.action.run(collaborators);
        }
        due
    }

    /// Number of pending entries owned by `owner`.
    #[must_use]
    pub fn pending_for(&self, owner: StateTag) -> usize {
        self.pending.iter().filter(|s| s.owner == owner).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! Collaborator doubles that record every call into a shared log.

    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::{Animator, AudioSink, CameraRig, Collaborators};

    pub type Log = Rc<RefCell<Vec<String>>>;

    pub struct Recorder(pub Log);

    impl Animator for Recorder {
        fn trigger(&mut self, name: &str) {
            self.0.borrow_mut().push(format!("anim:{name}"));
        }

        fn set_flash(&mut self, on: bool) {
            self.0.borrow_mut().push(format!("flash:{on}"));
        }
    }

    impl AudioSink for Recorder {
        fn play(&mut self, cue: &str) {
            self.0.borrow_mut().push(format!("audio:{cue}"));
        }
    }

    impl CameraRig for Recorder {
        fn shake(&mut self, intensity: f32, duration: Duration) {
            self.0
                .borrow_mut()
                .push(format!("shake:{intensity}:{}", duration.as_millis()));
        }
    }

    /// Collaborators with all three hooks wired to one log.
    pub fn recording() -> (Collaborators, Log) {
        let log: Log = Rc::default();
        let collaborators = Collaborators::none()
            .with_animator(Recorder(log.clone()))
            .with_audio(Recorder(log.clone()))
            .with_camera(Recorder(log.clone()));
        (collaborators, log)
    }
}
