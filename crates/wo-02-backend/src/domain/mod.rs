//! Domain logic for the back-end.

pub mod transform;

pub use transform::Uppercase;
