//! NATS subject hierarchy.
//!
//! Every arena subject lives under `arena.` so several games can share one
//! NATS cluster. Sessions are isolated by their own subtree.

/// Root prefix for all arena NATS subjects.
pub const PREFIX: &str = "arena";

/// Build the subject carrying inactivity edges for one session.
///
/// `arena.session.<session>.inactivity`
#[must_use]
pub fn inactivity(session: &str) -> String {
    format!("{PREFIX}.session.{session}.inactivity")
}
