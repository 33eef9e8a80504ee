//! Tick time.
//!
//! The core never reads a wall clock. The tick loop samples a monotonic
//! [`TickTime`] once per tick and hands it down; every wait in the core is an
//! elapsed-time comparison against `now`. Times are [`Duration`]s since the
//! session started so that comparisons like "elapsed ≥ 0.4s" are exact.

use std::time::Duration;

/// The clock sample for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTime {
    /// Monotonically increasing tick counter.
    pub tick_id: u64,
    /// Time since the session started.
    pub now: Duration,
    /// Time since the previous tick.
    pub dt: Duration,
}

impl TickTime {
    /// Session start: tick 0 at time zero.
    pub const ZERO: Self = Self {
        tick_id: 0,
        now: Duration::ZERO,
        dt: Duration::ZERO,
    };

    /// A sample at an arbitrary time, with no tick history.
    #[must_use]
    pub const fn at(now: Duration) -> Self {
        Self {
            tick_id: 0,
            now,
            dt: Duration::ZERO,
        }
    }

    /// The sample for the next tick, `dt` later.
    #[must_use]
    pub fn advance(self, dt: Duration) -> Self {
        Self {
            tick_id: self.tick_id + 1,
            now: self.now + dt,
            dt,
        }
    }

    /// `dt` in seconds, for kinematic steps.
    #[must_use]
    pub fn dt_secs(&self) -> f32 {
        self.dt.as_secs_f32()
    }

    /// Time elapsed since `anchor`, zero if `anchor` is in the future.
    #[must_use]
    pub fn since(&self, anchor: Duration) -> Duration {
        self.now.saturating_sub(anchor)
    }
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
///
/// Use with `#[serde(with = "arena_core::clock::duration_ms")]`.
pub mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
