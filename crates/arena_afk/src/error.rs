//! Inactivity configuration errors.

/// Errors raised while validating an [`InactivityConfig`](crate::InactivityConfig).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AfkError {
    /// A setting is out of range.
    #[error("invalid inactivity setting `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}
