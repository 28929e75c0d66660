//! # Work Back-End
//!
//! **Role:** consumes work items from a shared subscription on the work
//! topic, transforms each word and publishes a result on the notification
//! topic.
//!
//! ## Processing Flow
//!
//! ```text
//! [work topic, shared subscription] ──→ WorkerPool flow ──→ WorkerProcessor
//!                                                              │
//!                                     decode ─→ transform ─→ publish (fresh session)
//!                                                              │
//!                                                              ▼
//!                                                  [notification topic]
//! ```
//!
//! ## Guarantees
//!
//! | Property | Enforcement Location |
//! |----------|---------------------|
//! | Each work message reaches one worker | broker shared subscription |
//! | Malformed work is logged and dropped, never redelivered | `service/processor.rs` - `process()` |
//! | A broker failure does not end a flow | `service/pool.rs` - reconnect after backoff |
//! | Flows stop on shutdown | `service/pool.rs` - watch channel in `select!` |
//!
//! There is no transactional link between consuming a work item and
//! publishing its result.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::WorkerConfig;
pub use domain::Uppercase;
pub use ports::WordTransform;
pub use service::{PoolStats, WorkerPool, WorkerProcessor};
