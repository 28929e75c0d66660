//! Ports for the back-end.

/// The work a back-end performs on one word.
///
/// Implementations must be pure: the same input always gives the same
/// output, with no side effects.
pub trait WordTransform: Send + Sync {
    fn apply(&self, word: &str) -> String;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
