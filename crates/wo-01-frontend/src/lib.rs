//! # Work Front-End
//!
//! **Role:** accepts work requests, publishes one work item per word, and
//! hands back results that workers published to the notification topic.
//!
//! ## Protocol
//!
//! ```text
//! submit("foo bar") ──→ SubscriptionGate.ensure ──→ WorkPublisher ──→ [work topic]
//!                                                                          │
//!                                                                       workers
//!                                                                          │
//! poll() ──→ SubscriptionGate.exclusive ──→ NotificationPoller ←── [notification topic,
//!                                                                    durable subscription]
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Durable subscription exists before the first publish | `service/publisher.rs` - `ensure_subscription()` before any send |
//! | Subscription created at most once per gate | `service/gate.rs` - double-checked flag under the gate lock |
//! | One consumer on the durable subscription at a time | `service/poller.rs` - whole poll runs under `GateGuard` |
//! | Sessions released on every path | `shared_bus::ScopedSession` / `ScopedConsumer` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! adapters/http.rs   - axum REST surface (driving adapter)
//! ports/inbound.rs   - WorkFrontendApi trait
//! service/           - SubscriptionGate, WorkPublisher, NotificationPoller, FrontendService
//! domain/            - tokenisation into WorkItems
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::http::{router, serve};
pub use config::FrontendConfig;
pub use ports::inbound::{PublishReceipt, WorkFrontendApi};
pub use service::{FrontendService, NotificationPoller, SubscriptionGate, WorkPublisher};
