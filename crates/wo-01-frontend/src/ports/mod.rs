//! Ports for the front-end.

pub mod inbound;

pub use inbound::{PublishReceipt, WorkFrontendApi};
