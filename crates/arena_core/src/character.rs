//! The controllable combat entity.
//!
//! [`Character`] is a plain receiver: it holds the flags and spatial data that
//! states read and write, and it implements [`DamageSink`] so that any health
//! system (the inactivity penalty included) can hurt it. It owns no behavior
//! of its own.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::EntityId;

/// Horizontal facing on the combat plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// `-1.0` for left, `1.0` for right.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Facing implied by a horizontal axis value, `None` for exactly zero.
    #[must_use]
    pub fn from_axis(horizontal: f32) -> Option<Self> {
        if horizontal > 0.0 {
            Some(Self::Right)
        } else if horizontal < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }
}

/// Integer hit points. `current` never underflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Full health with the given maximum.
    #[must_use]
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Subtract `amount`, clamping at zero. Returns the amount actually removed.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.current);
        self.current -= removed;
        removed
    }
}

/// Anything that can receive damage.
///
/// `source` is `None` for environmental or rule-driven damage such as the
/// inactivity penalty.
pub trait DamageSink {
    fn apply_damage(&mut self, amount: u32, source: Option<EntityId>);
}

/// One controllable combat unit.
#[derive(Debug, Clone)]
pub struct Character {
    id: EntityId,
    display_name: String,
    /// World-space position.
    pub position: Vec3,
    pub facing: Facing,
    /// Cleared by locked states for their duration.
    pub can_move: bool,
    /// Reported by the external physics step.
    pub grounded: bool,
    health: Health,
}

impl Character {
    /// Default hit points for a freshly spawned character.
    pub const DEFAULT_HEALTH: u32 = 100;

    /// A grounded, free-to-move character at `position`, facing right.
    #[must_use]
    pub fn new(id: EntityId, display_name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            position,
            facing: Facing::Right,
            can_move: true,
            grounded: true,
            health: Health::full(Self::DEFAULT_HEALTH),
        }
    }

    /// Override the starting health.
    #[must_use]
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn health(&self) -> Health {
        self.health
    }
}

impl DamageSink for Character {
    fn apply_damage(&mut self, amount: u32, source: Option<EntityId>) {
        let removed = self.health.damage(amount);
        debug!(
            entity = %self.id,
            amount,
            removed,
            source = ?source,
            remaining = self.health.current(),
            "damage applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_from_axis() {
        assert_eq!(Facing::from_axis(0.4), Some(Facing::Right));
        assert_eq!(Facing::from_axis(-0.01), Some(Facing::Left));
        assert_eq!(Facing::from_axis(0.0), None);
        assert_eq!(Facing::Left.opposite(), Facing::Right);
    }

    #[test]
    fn test_health_damage_saturates() {
        let mut health = Health::full(12);
        assert_eq!(health.damage(5), 5);
        assert_eq!(health.damage(10), 7);
        assert_eq!(health.current(), 0);
        assert!(!health.is_alive());
        assert_eq!(health.max(), 12);
    }

    #[test]
    fn test_new_character_is_free_and_grounded() {
        let c = Character::new(EntityId(3), "Ayla", Vec3::ZERO);
        assert!(c.can_move);
        assert!(c.grounded);
        assert_eq!(c.facing, Facing::Right);
        assert_eq!(c.health().current(), Character::DEFAULT_HEALTH);
        assert_eq!(c.display_name(), "Ayla");
    }

    #[test]
    fn test_damage_sink_reduces_health() {
        let mut c = Character::new(EntityId(3), "Ayla", Vec3::ZERO).with_health(Health::full(20));
        c.apply_damage(5, None);
        c.apply_damage(5, Some(EntityId(4)));
        assert_eq!(c.health().current(), 10);
    }

    #[test]
    fn test_health_roundtrip() {
        let health = Health::full(80);
        let bytes = rmp_serde::to_vec(&health).unwrap();
        let restored: Health = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(health, restored);
    }
}
