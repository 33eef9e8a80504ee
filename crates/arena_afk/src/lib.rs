//! # arena_afk
//!
//! Inactivity ("AFK") detection for combat entities.
//!
//! The owning peer runs an [`InactivityMonitor`] per entity. It samples the
//! entity's position every tick, raises the inactive condition after a quiet
//! period, and applies a recurring damage penalty while it holds. Each change
//! of the condition is handed to a [`ReplicationChannel`], which broadcasts it
//! to the other peers of the session. Those peers keep a read-only mirror and
//! raise the same [`InactivityNotice`] the owner does.
//!
//! ```text
//!  owner                                 replica
//!  ─────                                 ───────
//!  InactivityMonitor::tick ─► edge
//!        ReplicationChannel::broadcast ─► Transport ─► ReplicationChannel::poll
//!        notice: Started/Ended                         mirror + notice
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod monitor;

pub use channel::{InactivityNotice, ReplicationChannel};
pub use config::{InactivityConfig, ReplicaOrdering};
pub use error::AfkError;
pub use monitor::{InactivityEdge, InactivityMonitor};
