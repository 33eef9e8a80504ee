//! Fixed-timestep tick loop.
//!
//! Every peer advances its [`World`] at the same rate. The local runner steps
//! several worlds in lockstep on one thread; the async runner drives a single
//! world on the tokio runtime until the tick limit or Ctrl-C.

use std::time::{Duration, Instant};

use arena_net::Transport;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: u32,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Sleep between ticks to hold the rate. Off, the local runner steps as
    /// fast as it can.
    pub realtime: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            max_ticks: 0,
            realtime: true,
        }
    }
}

impl TickConfig {
    /// Simulated time per tick.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }
}

#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    config: TickConfig,
}

impl TickLoop {
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        Self { tick_id: 0, config }
    }

    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    fn limit_reached(&self) -> bool {
        self.config.max_ticks > 0 && self.tick_id >= self.config.max_ticks
    }

    /// Step every world once per tick, in order, until `max_ticks`.
    ///
    /// Returns the number of inactivity notices raised across all worlds.
    pub fn run<T: Transport>(&mut self, worlds: &mut [World<T>]) -> usize {
        let interval = self.config.interval();
        let mut notices = 0;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            peers = worlds.len(),
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick_id += 1;
            for world in worlds.iter_mut() {
                notices += world.tick(interval).len();
            }
            debug!(tick_id = self.tick_id, "tick complete");

            if self.limit_reached() {
                info!(ticks = self.tick_id, notices, "tick loop complete");
                break;
            }

            if self.config.realtime {
                let elapsed = start.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                } else {
                    warn!(
                        tick_id = self.tick_id,
                        elapsed_ms = elapsed.as_millis() as u64,
                        budget_ms = interval.as_millis() as u64,
                        "tick exceeded time budget"
                    );
                }
            }
        }
        notices
    }

    /// Drive one world on the tokio runtime. Stops at `max_ticks` or on
    /// Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the Ctrl-C handler cannot be installed.
    pub async fn run_async<T: Transport>(&mut self, world: &mut World<T>) -> anyhow::Result<()> {
        let interval = self.config.interval();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            peer = world.peer_id(),
            "starting tick loop"
        );

        loop {
            tokio::select! {
                result = &mut shutdown => {
                    result?;
                    info!(ticks = self.tick_id, "interrupted");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick_id += 1;
                    world.tick(interval);
                    if self.limit_reached() {
                        info!(ticks = self.tick_id, "tick loop complete");
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
