//! Owner-side inactivity detection.

use std::time::Duration;

use arena_core::{Character, DamageSink, EntityId};
use glam::Vec3;
use tracing::debug;

use crate::config::InactivityConfig;

/// A change of an entity's inactive condition, produced on the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityEdge {
    pub entity: EntityId,
    pub inactive: bool,
    pub display_name: String,
}

/// Tracks one owned entity's movement and decides whether it is inactive.
///
/// Within a tick the monitor checks, in order: activity (which clears the
/// condition immediately), the recurring penalty, then the timeout. The tick
/// that raises the condition therefore never applies damage.
#[derive(Debug, Clone)]
pub struct InactivityMonitor {
    entity: EntityId,
    display_name: String,
    config: InactivityConfig,
    last_activity: Duration,
    last_observed: Vec3,
    last_penalty: Duration,
    inactive: bool,
    penalties: u64,
}

impl InactivityMonitor {
    /// Start watching an entity at `position`. The quiet period starts at
    /// `now`.
    #[must_use]
    pub fn new(
        entity: EntityId,
        display_name: impl Into<String>,
        position: Vec3,
        now: Duration,
        config: InactivityConfig,
    ) -> Self {
        Self {
            entity,
            display_name: display_name.into(),
            config,
            last_activity: now,
            last_observed: position,
            last_penalty: now,
            inactive: false,
            penalties: 0,
        }
    }

    /// Start watching a spawned character from its current position.
    #[must_use]
    pub fn for_character(character: &Character, now: Duration, config: InactivityConfig) -> Self {
        Self::new(
            character.id(),
            character.display_name(),
            character.position,
            now,
            config,
        )
    }

    /// Sample the entity's position for this tick.
    ///
    /// Penalties are applied through `sink`. Returns an edge when the
    /// condition changed.
    pub fn tick(
        &mut self,
        now: Duration,
        position: Vec3,
        sink: &mut dyn DamageSink,
    ) -> Option<InactivityEdge> {
        let displacement = position.distance(self.last_observed);
        self.last_observed = position;

        if !self.config.enabled {
            self.last_activity = now;
            return self.set_inactive(false);
        }

        if displacement >= self.config.movement_threshold {
            self.last_activity = now;
            if self.inactive {
                return self.set_inactive(false);
            }
        }

        if self.inactive {
            if now.saturating_sub(self.last_penalty) >= self.config.penalty_interval {
                sink.apply_damage(self.config.penalty_damage, None);
                self.last_penalty = now;
                self.penalties += 1;
                debug!(
                    entity = %self.entity,
                    damage = self.config.penalty_damage,
                    "inactivity penalty"
                );
            }
            return None;
        }

        if now.saturating_sub(self.last_activity) >= self.config.timeout {
            self.last_penalty = now;
            return self.set_inactive(true);
        }
        None
    }

    fn set_inactive(&mut self, inactive: bool) -> Option<InactivityEdge> {
        if self.inactive == inactive {
            return None;
        }
        self.inactive = inactive;
        debug!(entity = %self.entity, inactive, "inactivity changed");
        Some(InactivityEdge {
            entity: self.entity,
            inactive,
            display_name: self.display_name.clone(),
        })
    }

    /// Turn detection on or off. Disabling an inactive monitor clears the
    /// condition on the next tick.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    #[must_use]
    pub fn is_inactive(&self) -> bool {
        self.inactive
    }

    #[must_use]
    pub fn last_activity(&self) -> Duration {
        self.last_activity
    }

    /// Penalties applied since the monitor was created.
    #[must_use]
    pub fn penalties(&self) -> u64 {
        self.penalties
    }

    #[must_use]
    pub fn config(&self) -> &InactivityConfig {
        &self.config
    }
}
