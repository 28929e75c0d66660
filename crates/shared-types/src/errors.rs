//! # Error Types
//!
//! The error taxonomy seen by callers of the front-end and by the worker
//! loop. Broker-level failures are mapped into these variants at each call
//! site, so the variant always names the operation that failed.

use thiserror::Error;

/// Errors surfaced by the worker offload protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffloadError {
    /// The caller-supplied payload is missing a required field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A received message does not match the expected payload shape or type.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Publishing aborted. Earlier items of the same batch may already be
    /// enqueued; `published` says how many.
    #[error("Publish failed after {published} message(s): {reason}")]
    PublishFailed { published: usize, reason: String },

    /// The broker could not be reached or refused the operation.
    #[error("Broker unavailable: {0}")]
    BrokerUnavailable(String),

    /// The durable subscription could not be established.
    #[error("Subscription initialisation failed: {0}")]
    SubscriptionInitFailed(String),
}

impl OffloadError {
    /// Whether the failure was caused by the caller rather than the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
