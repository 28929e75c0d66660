//! Tokenisation of a work request.

use shared_types::{OffloadError, WorkItem};

/// Split request text into words on any run of whitespace.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Validate a request and build one [`WorkItem`] per word, in order.
///
/// Text made only of whitespace is valid and yields no items.
///
/// # Errors
///
/// `InvalidInput` if the text is absent or empty.
pub fn split_request(text: Option<&str>, origin_tag: &str) -> Result<Vec<WorkItem>, OffloadError> {
    let text = text.ok_or_else(|| OffloadError::InvalidInput("No words sent".to_string()))?;
    if text.is_empty() {
        return Err(OffloadError::InvalidInput("words must not be empty".to_string()));
    }
    Ok(tokenize(text)
        .map(|word| WorkItem::new(word, origin_tag))
        .collect())
}
