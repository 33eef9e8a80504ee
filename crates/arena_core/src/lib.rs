//! # arena_core
//!
//! Shared vocabulary for the arena combat core.
//!
//! This crate provides:
//!
//! - [`EntityId`]: stable identifiers for combat entities.
//! - [`EntityAllocator`]: per-peer ID allocation.
//! - [`Character`]: the receiver that states and monitors mutate.
//! - [`Health`] and [`DamageSink`]: the health-damage path.
//! - [`TickTime`]: the monotonic clock sampled once per tick.

pub mod character;
pub mod clock;
pub mod entity;

pub use character::{Character, DamageSink, Facing, Health};
pub use clock::TickTime;
pub use entity::{EntityAllocator, EntityId};
