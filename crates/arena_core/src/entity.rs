//! Entity identifiers and allocation.
//!
//! There is no central coordinator in a session, so every peer allocates IDs
//! from its own block. A block is `peer_index << 32`, which keeps IDs unique
//! across peers without any negotiation beyond agreeing on peer indices.

use serde::{Deserialize, Serialize};

/// A stable identifier for one combat entity.
///
/// The ID is what replication messages refer to, so it must mean the same
/// entity on every peer in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null entity. Never allocated.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an ID from its raw value.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns `true` unless this is [`EntityId::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// The peer block this ID was allocated from.
    #[must_use]
    pub const fn peer_index(self) -> u32 {
        (self.0 >> EntityAllocator::BLOCK_BITS) as u32
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out IDs from one peer's block.
#[derive(Debug)]
pub struct EntityAllocator {
    base: u64,
    next: u64,
}

impl EntityAllocator {
    const BLOCK_BITS: u32 = 32;

    /// Allocator for the given peer index. Local-only sessions use index 0.
    #[must_use]
    pub fn for_peer(peer_index: u32) -> Self {
        Self {
            base: u64::from(peer_index) << Self::BLOCK_BITS,
            next: 1,
        }
    }

    /// Allocates the next ID in this peer's block.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.base | self.next);
        self.next += 1;
        id
    }

    /// Number of IDs handed out so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::for_peer(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id() {
        assert!(!EntityId::INVALID.is_valid());
        assert!(EntityId::from_raw(7).is_valid());
    }

    #[test]
    fn test_allocator_skips_zero() {
        let mut alloc = EntityAllocator::default();
        assert_eq!(alloc.allocate(), EntityId(1));
        assert_eq!(alloc.allocate(), EntityId(2));
        assert_eq!(alloc.count(), 2);
    }

    #[test]
    fn test_peer_blocks_do_not_overlap() {
        let mut a = EntityAllocator::for_peer(1);
        let mut b = EntityAllocator::for_peer(2);
        let from_a = a.allocate();
        let from_b = b.allocate();
        assert_ne!(from_a, from_b);
        assert_eq!(from_a.peer_index(), 1);
        assert_eq!(from_b.peer_index(), 2);
    }

    #[test]
    fn test_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&EntityId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityId(9).to_string(), "#9");
    }
}
