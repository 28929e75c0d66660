//! # Shared Types Crate
//!
//! Types that flow between the front-end and the back-end workers through the
//! message broker.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: both wire payloads live here, so the two
//!   sides of the broker can never disagree on field names.
//! - **Configuration, not computation**: topic names and the durable
//!   subscription name are supplied through [`TopicConfig`].
//! - **One error taxonomy**: [`OffloadError`] is what callers of the
//!   front-end and the worker see.

pub mod entities;
pub mod errors;
pub mod topics;

pub use entities::*;
pub use errors::*;
pub use topics::*;
