//! # arena_net
//!
//! Replication plumbing for arena sessions.
//!
//! This crate provides:
//!
//! - [`messages`]: the inactivity replication message and header keys.
//! - [`codec`]: MessagePack encoding and decoding.
//! - [`subjects`]: NATS subject builders for a session.
//! - [`connection`]: NATS connection management.
//! - [`transport`]: the [`Transport`] seam, an in-memory bus, and the NATS
//!   transport.
//! - [`error`]: network-layer error types.

pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;
pub mod subjects;
pub mod transport;

pub use codec::{decode, encode};
pub use connection::NatsConnection;
pub use error::NetError;
pub use messages::InactivityChanged;
pub use transport::{MemoryBus, MemoryTransport, NatsTransport, Transport};
