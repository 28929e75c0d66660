//! # Inbound Port - WorkFrontendApi
//!
//! Driving port used by the REST adapter (or any other caller).

use async_trait::async_trait;
use shared_types::{OffloadError, ResultItem};

/// Outcome of a successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Number of work items enqueued.
    pub item_count: usize,
}

/// Primary API of the front-end.
#[async_trait]
pub trait WorkFrontendApi: Send + Sync {
    /// Publish one work item per word of `words`.
    ///
    /// Not atomic: on `PublishFailed` the items before the failure are
    /// already enqueued.
    ///
    /// # Errors
    /// - `InvalidInput`: `words` absent or empty
    /// - `SubscriptionInitFailed`: the result subscription could not be set up
    /// - `BrokerUnavailable` / `PublishFailed`: broker failure
    async fn submit(&self, words: Option<&str>) -> Result<PublishReceipt, OffloadError>;

    /// Check once for a result. Never waits for one to arrive.
    ///
    /// # Errors
    /// - `MalformedMessage`: a message was consumed but is not a result
    /// - `BrokerUnavailable` / `SubscriptionInitFailed`: broker failure
    async fn poll(&self) -> Result<Option<ResultItem>, OffloadError>;
}
