//! State-machine error types.
//!
//! Every variant is a configuration defect. None of them can happen once a
//! machine has been built, which is why [`StateMachine`](crate::StateMachine)
//! operations themselves are infallible.

use crate::state::StateTag;

/// Errors raised while assembling a state machine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FsmError {
    /// The state table has no entry for a tag.
    #[error("state table has no entry for {0}")]
    MissingState(StateTag),

    /// Two table entries claim the same tag.
    #[error("state table has more than one entry for {0}")]
    DuplicateState(StateTag),

    /// A timing value is out of range.
    #[error("invalid timing `{field}`: {reason}")]
    InvalidTiming {
        field: &'static str,
        reason: &'static str,
    },
}
