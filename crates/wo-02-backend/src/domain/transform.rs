//! Shipped word transformations.

use crate::ports::WordTransform;

/// Converts a word to upper case (Unicode-aware).
#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl WordTransform for Uppercase {
    fn apply(&self, word: &str) -> String {
        word.to_uppercase()
    }

    fn name(&self) -> &'static str {
        "uppercase"
    }
}
