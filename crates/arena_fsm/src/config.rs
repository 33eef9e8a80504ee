//! State timing configuration.

use std::time::Duration;

use arena_core::clock::duration_ms;
use serde::{Deserialize, Serialize};

use crate::error::FsmError;

/// Durations, thresholds and speeds used by the standard states.
///
/// Durations are written in milliseconds when (de)serialised. Missing fields
/// fall back to [`StateTimings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateTimings {
    /// Horizontal input magnitude above which Idle becomes Moving.
    pub move_threshold: f32,
    /// Ground speed in units per second at full input.
    pub move_speed: f32,
    /// Minimum time in Jumping before landing can end it.
    #[serde(with = "duration_ms")]
    pub jump_min_airtime: Duration,
    #[serde(with = "duration_ms")]
    pub throw_duration: Duration,
    #[serde(with = "duration_ms")]
    pub dodge_duration: Duration,
    /// Dodge displacement speed in units per second.
    pub dodge_speed: f32,
    /// Hit-stun length.
    #[serde(with = "duration_ms")]
    pub hit_duration: Duration,
    #[serde(with = "duration_ms")]
    pub ultimate_duration: Duration,
    /// Number of on/off flash cycles started by a hit.
    pub flash_cycles: u32,
    /// Half-period of one flash cycle.
    #[serde(with = "duration_ms")]
    pub flash_interval: Duration,
    pub hit_shake_intensity: f32,
    #[serde(with = "duration_ms")]
    pub hit_shake_duration: Duration,
    pub ultimate_shake_intensity: f32,
    #[serde(with = "duration_ms")]
    pub ultimate_shake_duration: Duration,
}

impl Default for StateTimings {
    fn default() -> Self {
        Self {
            move_threshold: 0.1,
            move_speed: 6.0,
            jump_min_airtime: Duration::from_millis(100),
            throw_duration: Duration::from_millis(500),
            dodge_duration: Duration::from_millis(300),
            dodge_speed: 12.0,
            hit_duration: Duration::from_millis(400),
            ultimate_duration: Duration::from_millis(1000),
            flash_cycles: 3,
            flash_interval: Duration::from_millis(100),
            hit_shake_intensity: 0.2,
            hit_shake_duration: Duration::from_millis(150),
            ultimate_shake_intensity: 0.6,
            ultimate_shake_duration: Duration::from_millis(400),
        }
    }
}

impl StateTimings {
    /// Upper bound on `flash_cycles`; each cycle queues two timed effects.
    pub const MAX_FLASH_CYCLES: u32 = 64;

    /// Override the hit-stun length.
    #[must_use]
    pub fn with_hit_duration(mut self, duration: Duration) -> Self {
        self.hit_duration = duration;
        self
    }

    /// Override the dodge length and speed.
    #[must_use]
    pub fn with_dodge(mut self, duration: Duration, speed: f32) -> Self {
        self.dodge_duration = duration;
        self.dodge_speed = speed;
        self
    }

    /// Override the ground speed.
    #[must_use]
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::InvalidTiming`] naming the first bad field.
    pub fn validate(&self) -> Result<(), FsmError> {
        let non_negative = [
            ("move_threshold", self.move_threshold),
            ("move_speed", self.move_speed),
            ("dodge_speed", self.dodge_speed),
            ("hit_shake_intensity", self.hit_shake_intensity),
            ("ultimate_shake_intensity", self.ultimate_shake_intensity),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FsmError::InvalidTiming {
                    field,
                    reason: "must be a finite, non-negative number",
                });
            }
        }
        if self.move_threshold >= 1.0 {
            return Err(FsmError::InvalidTiming {
                field: "move_threshold",
                reason: "must be below full axis deflection",
            });
        }

        let locked = [
            ("throw_duration", self.throw_duration),
            ("dodge_duration", self.dodge_duration),
            ("hit_duration", self.hit_duration),
            ("ultimate_duration", self.ultimate_duration),
        ];
        for (field, value) in locked {
            if value.is_zero() {
                return Err(FsmError::InvalidTiming {
                    field,
                    reason: "locked states need a non-zero duration",
                });
            }
        }
        if self.flash_cycles > Self::MAX_FLASH_CYCLES {
            return Err(FsmError::InvalidTiming {
                field: "flash_cycles",
                reason: "too many flash cycles",
            });
        }
        if self.flash_cycles > 0 && self.flash_interval.is_zero() {
            return Err(FsmError::InvalidTiming {
                field: "flash_interval",
                reason: "must be non-zero when flash_cycles is set",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(StateTimings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_lock_duration_rejected() {
        let timings = StateTimings::default().with_hit_duration(Duration::ZERO);
        assert_eq!(
            timings.validate(),
            Err(FsmError::InvalidTiming {
                field: "hit_duration",
                reason: "locked states need a non-zero duration",
            })
        );
    }

    #[test]
    fn test_negative_speed_rejected() {
        let timings = StateTimings::default().with_move_speed(-1.0);
        assert!(timings.validate().is_err());
    }

    #[test]
    fn test_flash_cycles_bounded() {
        let mut timings = StateTimings::default();
        timings.flash_cycles = StateTimings::MAX_FLASH_CYCLES;
        assert!(timings.validate().is_ok());
        timings.flash_cycles = u32::MAX;
        assert!(matches!(
            timings.validate(),
            Err(FsmError::InvalidTiming {
                field: "flash_cycles",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let timings: StateTimings =
            serde_json::from_str(r#"{ "hit_duration": 650, "dodge_speed": 9.5 }"#).unwrap();
        assert_eq!(timings.hit_duration, Duration::from_millis(650));
        assert_eq!(timings.dodge_speed, 9.5);
        assert_eq!(timings.throw_duration, Duration::from_millis(500));
    }
}
