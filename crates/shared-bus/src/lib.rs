//! # Shared Bus - Message Broker Ports
//!
//! The broker is an external collaborator. This crate defines the narrow
//! surface the worker offload protocol needs from it, plus an in-process
//! implementation used by the node runtime and the tests.
//!
//! ## Broker Model
//!
//! ```text
//!  publish(topic, payload, ttl)
//!        │
//!        ▼
//!  ┌──────────────┐   copy per subscription   ┌──────────────────────────┐
//!  │    Topic     │ ────────────────────────→ │ durable "name"  (1 owner)│
//!  │              │ ────────────────────────→ │ shared  "share" (N comp.)│
//!  └──────────────┘                            └──────────────────────────┘
//! ```
//!
//! - A publication is only retained for subscriptions that already exist.
//!   Nothing is buffered for a subscription created later.
//! - A durable subscription keeps messages while nobody is attached, and
//!   admits **one** attached consumer at a time.
//! - A shared subscription hands each message to exactly one of its attached
//!   consumers.
//! - Messages past their time-to-live are discarded, never delivered.
//! - Delivery on a session only begins after [`BrokerSession::start`].
//!
//! ## Resource Discipline
//!
//! Sessions and consumers are acquired per operation through
//! [`ScopedSession`] and [`ScopedConsumer`], which close them on every exit
//! path and log (rather than propagate) a failure to close.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod broker;
pub mod memory;
pub mod message;
pub mod scoped;
pub mod subscriber;

// Re-export main types
pub use broker::{BrokerError, BrokerSession, MessageBroker, MessageConsumer};
pub use memory::{BrokerStats, InMemoryBroker};
pub use message::{BrokerMessage, Payload};
pub use scoped::{ScopedConsumer, ScopedSession};
pub use subscriber::SubscriptionKind;
