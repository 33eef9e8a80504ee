//! One peer's view of an arena session.
//!
//! The [`World`] owns the fighters this peer is authoritative for, the
//! replication channel, and the transport linking it to the other peers.
//! Remote fighters exist here only as mirrored inactivity flags.

// Lookup and despawn helpers are exercised by tests; the demo session never
// despawns.
#![allow(dead_code)]

use std::time::Duration;

use arena_afk::{InactivityConfig, InactivityMonitor, InactivityNotice, ReplicationChannel};
use arena_core::{Character, EntityAllocator, EntityId, TickTime};
use arena_fsm::{StateMachine, StateTag, StateTimings};
use arena_net::Transport;
use tracing::{debug, info};

use crate::config::FighterSpec;
use crate::presentation::logging_collaborators;
use crate::script::ScriptedDriver;

/// An owned fighter: its state machine, its inactivity monitor, and the
/// script feeding its input.
#[derive(Debug)]
pub struct Fighter {
    machine: StateMachine,
    monitor: InactivityMonitor,
    driver: ScriptedDriver,
}

impl Fighter {
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.machine.character().id()
    }

    #[must_use]
    pub fn character(&self) -> &Character {
        self.machine.character()
    }

    #[must_use]
    pub fn state(&self) -> StateTag {
        self.machine.current()
    }

    #[must_use]
    pub fn is_inactive(&self) -> bool {
        self.monitor.is_inactive()
    }
}

#[derive(Debug)]
pub struct World<T: Transport> {
    transport: T,
    channel: ReplicationChannel,
    allocator: EntityAllocator,
    fighters: Vec<Fighter>,
    timings: StateTimings,
    inactivity: InactivityConfig,
    time: TickTime,
}

impl<T: Transport> World<T> {
    /// Create an empty world for the peer at `peer_index`.
    #[must_use]
    pub fn new(
        transport: T,
        peer_index: u32,
        timings: StateTimings,
        inactivity: InactivityConfig,
    ) -> Self {
        Self {
            transport,
            channel: ReplicationChannel::new(inactivity.ordering),
            allocator: EntityAllocator::for_peer(peer_index),
            fighters: Vec::new(),
            timings,
            inactivity,
            time: TickTime::ZERO,
        }
    }

    /// Spawn an owned fighter and start monitoring it.
    pub fn spawn(&mut self, spec: &FighterSpec) -> EntityId {
        let id = self.allocator.allocate();
        let character = Character::new(id, spec.name.clone(), spec.position);
        let driver = ScriptedDriver::new(spec.script.clone());
        let monitor =
            InactivityMonitor::for_character(&character, self.time.now, self.inactivity.clone());
        let machine = StateMachine::initialize(
            character,
            Box::new(driver.handle()),
            logging_collaborators(id),
            self.timings.clone(),
            self.time,
        );
        self.channel.register_owned(id);
        self.fighters.push(Fighter {
            machine,
            monitor,
            driver,
        });
        info!(entity = %id, name = spec.name, peer = self.transport.peer_id(), "fighter spawned");
        id
    }

    /// Remove an owned fighter.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let before = self.fighters.len();
        self.fighters.retain(|f| f.id() != id);
        self.channel.forget(id);
        before != self.fighters.len()
    }

    /// Advance the session by `dt`.
    ///
    /// Received edges are applied first, then every owned fighter reads its
    /// input, updates its state machine and is sampled by its monitor. The
    /// notices raised during the tick are returned.
    pub fn tick(&mut self, dt: Duration) -> Vec<InactivityNotice> {
        self.time = self.time.advance(dt);
        let time = self.time;

        let received = self.channel.poll(&mut self.transport);
        if received > 0 {
            debug!(tick_id = time.tick_id, received, "applied replication messages");
        }

        for fighter in &mut self.fighters {
            let cue = fighter.driver.advance(time.now);
            if let Some(damage) = cue.hit {
                fighter.machine.take_hit(damage, None, time);
            }
            if let Some(into) = cue.release {
                release_charge(&mut fighter.machine, into, time);
            }
            fighter.machine.update(time);

            let position = fighter.machine.character().position;
            if let Some(edge) = fighter
                .monitor
                .tick(time.now, position, fighter.machine.character_mut())
            {
                self.channel.broadcast(edge, &mut self.transport);
            }
        }

        let notices = self.channel.drain_notices();
        for notice in &notices {
            match notice {
                InactivityNotice::Started {
                    entity,
                    display_name,
                } => info!(entity = %entity, name = display_name, "{display_name} is inactive"),
                InactivityNotice::Ended {
                    entity,
                    display_name,
                } => info!(entity = %entity, name = display_name, "{display_name} is back"),
            }
        }
        notices
    }

    #[must_use]
    pub fn time(&self) -> TickTime {
        self.time
    }

    #[must_use]
    pub fn fighters(&self) -> &[Fighter] {
        &self.fighters
    }

    #[must_use]
    pub fn fighter(&self, id: EntityId) -> Option<&Fighter> {
        self.fighters.iter().find(|f| f.id() == id)
    }

    /// This peer's view of any entity's inactivity, owned or remote.
    #[must_use]
    pub fn is_inactive(&self, id: EntityId) -> bool {
        self.channel.is_inactive(id)
    }

    #[must_use]
    pub fn channel(&self) -> &ReplicationChannel {
        &self.channel
    }

    #[must_use]
    pub fn peer_id(&self) -> &str {
        self.transport.peer_id()
    }
}

/// Charging has no exit of its own; the script ends it. A release that
/// arrives while the fighter is doing anything else is dropped.
fn release_charge(machine: &mut StateMachine, into: StateTag, time: TickTime) {
    let current = machine.current();
    if current == StateTag::Charging {
        machine.change_state(into, time);
    } else {
        debug!(
            entity = %machine.character().id(),
            state = %current,
            release = %into,
            "charge release ignored"
        );
    }
}
