//! Domain layer: turning a request into work items.

pub mod words;

pub use words::{split_request, tokenize};
