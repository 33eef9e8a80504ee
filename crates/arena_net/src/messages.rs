//! Replication messages.
//!
//! Routing metadata (message type, sending peer) travels in NATS headers; the
//! payload is the MessagePack-encoded message itself.

use arena_core::EntityId;
use serde::{Deserialize, Serialize};

/// Owner → every peer: an entity's inactivity flag flipped.
///
/// Sent once per transition, never while the value is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityChanged {
    /// The entity whose flag changed.
    pub entity: EntityId,
    /// The new value.
    pub inactive: bool,
    /// Name shown by presentation layers in the started/ended notice.
    pub display_name: String,
    /// Per-entity counter, starting at 1 and increasing by one per edge.
    pub sequence: u64,
    /// Peer ID of the owner that produced the edge.
    pub origin: String,
}

/// Standard NATS header keys.
pub mod headers {
    /// The message type (see [`INACTIVITY_CHANGED_MSG_TYPE`](super::INACTIVITY_CHANGED_MSG_TYPE)).
    pub const MSG_TYPE: &str = "msg-type";
    /// The sending peer.
    pub const PEER_ID: &str = "peer-id";
}

/// Header value for an [`InactivityChanged`] payload.
pub const INACTIVITY_CHANGED_MSG_TYPE: &str = "inactivity_changed";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactivity_changed_roundtrip() {
        let msg = InactivityChanged {
            entity: EntityId(4_294_967_297),
            inactive: true,
            display_name: "Bruno".to_string(),
            sequence: 3,
            origin: "peer-b".to_string(),
        };
        let bytes = rmp_serde::to_vec_named(&msg).unwrap();
        let restored: InactivityChanged = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(msg, restored);
    }
}
