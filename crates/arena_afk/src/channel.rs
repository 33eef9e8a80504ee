//! Edge broadcast on the owner and read-only mirrors on replicas.

use std::collections::HashMap;

use arena_core::EntityId;
use arena_net::{InactivityChanged, Transport};
use tracing::{debug, warn};

use crate::config::ReplicaOrdering;
use crate::monitor::InactivityEdge;

/// Raised on every peer, owner included, when an entity's inactive condition
/// starts or ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InactivityNotice {
    Started {
        entity: EntityId,
        display_name: String,
    },
    Ended {
        entity: EntityId,
        display_name: String,
    },
}

impl InactivityNotice {
    fn new(entity: EntityId, inactive: bool, display_name: String) -> Self {
        if inactive {
            Self::Started {
                entity,
                display_name,
            }
        } else {
            Self::Ended {
                entity,
                display_name,
            }
        }
    }

    #[must_use]
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Started { entity, .. } | Self::Ended { entity, .. } => *entity,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Record {
    inactive: bool,
    sequence: u64,
}

/// Keeps every peer's view of the inactive condition consistent.
///
/// Entities registered with [`register_owned`](Self::register_owned) are
/// written only through [`broadcast`](Self::broadcast); every other entity is a
/// mirror written only by received messages. Mirrors never write back.
#[derive(Debug, Default)]
pub struct ReplicationChannel {
    ordering: ReplicaOrdering,
    owned: HashMap<EntityId, Record>,
    mirrors: HashMap<EntityId, Record>,
    notices: Vec<InactivityNotice>,
}

impl ReplicationChannel {
    #[must_use]
    pub fn new(ordering: ReplicaOrdering) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    /// Mark an entity as authoritative on this peer. Any mirror of it is
    /// discarded.
    pub fn register_owned(&mut self, entity: EntityId) {
        self.mirrors.remove(&entity);
        self.owned.entry(entity).or_default();
    }

    /// Drop all state about a despawned entity.
    pub fn forget(&mut self, entity: EntityId) {
        self.owned.remove(&entity);
        self.mirrors.remove(&entity);
    }

    #[must_use]
    pub fn is_owned(&self, entity: EntityId) -> bool {
        self.owned.contains_key(&entity)
    }

    /// Publish an owner-side edge.
    ///
    /// The local notice is raised before sending. A transport failure is
    /// logged and absorbed.
    pub fn broadcast(&mut self, edge: InactivityEdge, transport: &mut dyn Transport) {
        let Some(record) = self.owned.get_mut(&edge.entity) else {
            warn!(entity = %edge.entity, "refusing to broadcast for an entity this peer does not own");
            return;
        };
        record.sequence += 1;
        record.inactive = edge.inactive;

        let message = InactivityChanged {
            entity: edge.entity,
            inactive: edge.inactive,
            display_name: edge.display_name.clone(),
            sequence: record.sequence,
            origin: transport.peer_id().to_string(),
        };
        debug!(
            entity = %message.entity,
            inactive = message.inactive,
            sequence = message.sequence,
            "broadcasting inactivity"
        );
        self.notices
            .push(InactivityNotice::new(edge.entity, edge.inactive, edge.display_name));

        if let Err(e) = transport.broadcast(&message) {
            warn!(entity = %message.entity, error = %e, "inactivity broadcast failed");
        }
    }

    /// Apply a message from the owner of a remote entity.
    ///
    /// Returns `true` when the mirrored value changed.
    pub fn on_receive(&mut self, message: InactivityChanged) -> bool {
        if self.owned.contains_key(&message.entity) {
            return false;
        }

        let record = self.mirrors.entry(message.entity).or_default();
        if self.ordering == ReplicaOrdering::Sequenced && message.sequence <= record.sequence {
            debug!(
                entity = %message.entity,
                sequence = message.sequence,
                applied = record.sequence,
                "dropping stale inactivity message"
            );
            return false;
        }

        record.sequence = message.sequence;
        if record.inactive == message.inactive {
            debug!(entity = %message.entity, "inactivity unchanged");
            return false;
        }
        record.inactive = message.inactive;
        debug!(
            entity = %message.entity,
            inactive = message.inactive,
            origin = message.origin,
            "mirror updated"
        );
        self.notices.push(InactivityNotice::new(
            message.entity,
            message.inactive,
            message.display_name,
        ));
        true
    }

    /// Apply everything waiting in the transport. Returns how many messages
    /// were read.
    pub fn poll(&mut self, transport: &mut dyn Transport) -> usize {
        let mut received = 0;
        while let Some(message) = transport.try_recv() {
            self.on_receive(message);
            received += 1;
        }
        received
    }

    /// The replicated value of a remote entity. `None` for owned or unknown
    /// entities.
    #[must_use]
    pub fn mirror(&self, entity: EntityId) -> Option<bool> {
        self.mirrors.get(&entity).map(|r| r.inactive)
    }

    /// The value this peer currently holds for any entity, owned or mirrored.
    #[must_use]
    pub fn is_inactive(&self, entity: EntityId) -> bool {
        self.owned
            .get(&entity)
            .or_else(|| self.mirrors.get(&entity))
            .is_some_and(|r| r.inactive)
    }

    /// Take the notices raised since the last call.
    pub fn drain_notices(&mut self) -> Vec<InactivityNotice> {
        std::mem::take(&mut self.notices)
    }

    #[must_use]
    pub fn ordering(&self) -> ReplicaOrdering {
        self.ordering
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use arena_core::Character;
    use arena_net::{MemoryBus, NetError};
    use glam::Vec3;

    use super::*;
    use crate::config::InactivityConfig;
    use crate::monitor::InactivityMonitor;

    const OWNED: EntityId = EntityId(1);

    fn edge(inactive: bool) -> InactivityEdge {
        InactivityEdge {
            entity: OWNED,
            inactive,
            display_name: "Ayla".to_string(),
        }
    }

    fn message(inactive: bool, sequence: u64) -> InactivityChanged {
        InactivityChanged {
            entity: OWNED,
            inactive,
            display_name: "Ayla".to_string(),
            sequence,
            origin: "peer-a".to_string(),
        }
    }

    fn started() -> InactivityNotice {
        InactivityNotice::Started {
            entity: OWNED,
            display_name: "Ayla".to_string(),
        }
    }

    fn ended() -> InactivityNotice {
        InactivityNotice::Ended {
            entity: OWNED,
            display_name: "Ayla".to_string(),
        }
    }

    /// Fails every broadcast; never delivers.
    struct Offline;

    impl Transport for Offline {
        fn peer_id(&self) -> &str {
            "offline"
        }

        fn broadcast(&mut self, _message: &InactivityChanged) -> Result<(), NetError> {
            Err(NetError::Closed)
        }

        fn try_recv(&mut self) -> Option<InactivityChanged> {
            None
        }
    }

    #[test]
    fn test_broadcast_stamps_sequence_and_notifies_owner() {
        let bus = MemoryBus::new();
        let mut a = bus.join("peer-a");
        let mut channel = ReplicationChannel::default();
        channel.register_owned(OWNED);

        channel.broadcast(edge(true), &mut a);
        channel.broadcast(edge(false), &mut a);

        assert_eq!(channel.drain_notices(), vec![started(), ended()]);
        assert_eq!(a.try_recv(), Some(message(true, 1)));
        assert_eq!(a.try_recv(), Some(message(false, 2)));
    }

    #[test]
    fn test_owner_ignores_its_own_echo() {
        let bus = MemoryBus::new();
        let mut a = bus.join("peer-a");
        let mut channel = ReplicationChannel::default();
        channel.register_owned(OWNED);

        channel.broadcast(edge(true), &mut a);
        channel.drain_notices();

        assert_eq!(channel.poll(&mut a), 1);
        assert!(channel.drain_notices().is_empty());
        assert_eq!(channel.mirror(OWNED), None);
        assert!(channel.is_inactive(OWNED));
    }

    #[test]
    fn test_replica_applies_same_value_once() {
        let mut replica = ReplicationChannel::default();

        assert!(replica.on_receive(message(true, 1)));
        assert!(!replica.on_receive(message(true, 1)));

        assert_eq!(replica.mirror(OWNED), Some(true));
        assert_eq!(replica.drain_notices(), vec![started()]);
    }

    #[test]
    fn test_first_active_message_is_silent() {
        let mut replica = ReplicationChannel::default();
        assert!(!replica.on_receive(message(false, 1)));
        assert_eq!(replica.mirror(OWNED), Some(false));
        assert!(replica.drain_notices().is_empty());
    }

    #[test]
    fn test_last_delivered_wins_accepts_late_message() {
        let mut replica = ReplicationChannel::new(ReplicaOrdering::LastDeliveredWins);
        replica.on_receive(message(true, 1));
        replica.on_receive(message(false, 2));
        replica.on_receive(message(true, 1));

        assert_eq!(replica.mirror(OWNED), Some(true));
        assert_eq!(replica.drain_notices(), vec![started(), ended(), started()]);
    }

    #[test]
    fn test_sequenced_rejects_late_message() {
        let mut replica = ReplicationChannel::new(ReplicaOrdering::Sequenced);
        replica.on_receive(message(true, 1));
        replica.on_receive(message(false, 2));
        assert!(!replica.on_receive(message(true, 1)));

        assert_eq!(replica.mirror(OWNED), Some(false));
        assert_eq!(replica.drain_notices(), vec![started(), ended()]);
    }

    #[test]
    fn test_transport_failure_is_absorbed() {
        let mut channel = ReplicationChannel::default();
        channel.register_owned(OWNED);

        channel.broadcast(edge(true), &mut Offline);

        assert!(channel.is_inactive(OWNED));
        assert_eq!(channel.drain_notices(), vec![started()]);
    }

    #[test]
    fn test_broadcast_for_unowned_entity_is_refused() {
        let bus = MemoryBus::new();
        let mut a = bus.join("peer-a");
        let mut channel = ReplicationChannel::default();

        channel.broadcast(edge(true), &mut a);

        assert_eq!(a.try_recv(), None);
        assert!(channel.drain_notices().is_empty());
    }

    #[test]
    fn test_register_owned_discards_mirror() {
        let mut channel = ReplicationChannel::default();
        channel.on_receive(message(true, 1));
        channel.register_owned(OWNED);

        assert_eq!(channel.mirror(OWNED), None);
        assert!(!channel.on_receive(message(false, 2)));
        channel.forget(OWNED);
        assert!(!channel.is_owned(OWNED));
    }

    #[test]
    fn test_two_peers_converge_on_owner_value() {
        let bus = MemoryBus::new();
        let mut owner_link = bus.join("peer-a");
        let mut replica_link = bus.join("peer-b");
        let mut owner = ReplicationChannel::default();
        let mut replica = ReplicationChannel::default();
        owner.register_owned(OWNED);

        let mut character = Character::new(OWNED, "Ayla", Vec3::ZERO);
        let mut monitor =
            InactivityMonitor::for_character(&character, Duration::ZERO, InactivityConfig::default());

        let tick = Duration::from_millis(100);
        for step in 1..=120u32 {
            if step == 115 {
                character.position.x += 1.0;
            }
            let position = character.position;
            if let Some(edge) = monitor.tick(tick * step, position, &mut character) {
                owner.broadcast(edge, &mut owner_link);
            }
            owner.poll(&mut owner_link);
            replica.poll(&mut replica_link);

            assert_eq!(replica.mirror(OWNED).unwrap_or(false), owner.is_inactive(OWNED));
        }

        assert_eq!(owner.drain_notices(), vec![started(), ended()]);
        assert_eq!(replica.drain_notices(), vec![started(), ended()]);
        assert_eq!(character.health().current(), 95);
    }
}
