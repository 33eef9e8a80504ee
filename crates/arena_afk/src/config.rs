//! Inactivity detection settings.

use std::time::Duration;

use arena_core::clock::duration_ms;
use serde::{Deserialize, Serialize};

use crate::error::AfkError;

/// How a replica treats an edge that arrives after a newer one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaOrdering {
    /// Apply every message in delivery order. A late, stale message can
    /// overwrite a newer value until the owner's next edge.
    #[default]
    LastDeliveredWins,
    /// Drop messages whose sequence is not above the last applied one.
    Sequenced,
}

/// Settings for [`InactivityMonitor`](crate::InactivityMonitor) and
/// [`ReplicationChannel`](crate::ReplicationChannel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InactivityConfig {
    /// Master switch. A disabled monitor never raises the condition.
    pub enabled: bool,
    /// Per-tick displacement that counts as activity.
    pub movement_threshold: f32,
    /// Quiet period after which the entity is inactive.
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Damage applied per penalty.
    pub penalty_damage: u32,
    #[serde(with = "duration_ms")]
    pub penalty_interval: Duration,
    pub ordering: ReplicaOrdering,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            movement_threshold: 0.5,
            timeout: Duration::from_secs(10),
            penalty_damage: 5,
            penalty_interval: Duration::from_secs(1),
            ordering: ReplicaOrdering::default(),
        }
    }
}

impl InactivityConfig {
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the penalty amount and cadence.
    #[must_use]
    pub fn with_penalty(mut self, damage: u32, interval: Duration) -> Self {
        self.penalty_damage = damage;
        self.penalty_interval = interval;
        self
    }

    #[must_use]
    pub fn with_movement_threshold(mut self, threshold: f32) -> Self {
        self.movement_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_ordering(mut self, ordering: ReplicaOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AfkError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), AfkError> {
        if !self.movement_threshold.is_finite() || self.movement_threshold <= 0.0 {
            return Err(AfkError::InvalidConfig {
                field: "movement_threshold",
                reason: "must be a finite, positive distance",
            });
        }
        if self.timeout.is_zero() {
            return Err(AfkError::InvalidConfig {
                field: "timeout",
                reason: "must be non-zero",
            });
        }
        if self.penalty_interval.is_zero() {
            return Err(AfkError::InvalidConfig {
                field: "penalty_interval",
                reason: "must be non-zero",
            });
        }
        Ok(())
    }
}
