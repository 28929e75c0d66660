//! # Wire Entities
//!
//! Payloads carried as UTF-8 JSON text on the two topics, and the REST
//! payloads the front-end exchanges with its callers.
//!
//! | Topic | Payload | JSON |
//! |-------|---------|------|
//! | work | [`WorkItem`] | `{ "word": ..., "frontend": ... }` |
//! | notification | [`ResultItem`] | `{ "word": ..., "backend": ... }` |

use serde::{Deserialize, Serialize};

use crate::errors::OffloadError;

/// One unit of back-end work derived from a single token of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// The token to transform.
    pub word: String,
    /// Identity of the front-end instance that published the item.
    #[serde(rename = "frontend", default)]
    pub origin_tag: String,
}

impl WorkItem {
    pub fn new(word: impl Into<String>, origin_tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            origin_tag: origin_tag.into(),
        }
    }

    /// Encode as the JSON text sent on the work topic.
    pub fn encode(&self) -> Result<String, OffloadError> {
        serde_json::to_string(self).map_err(|e| OffloadError::PublishFailed {
            published: 0,
            reason: format!("cannot encode work item: {e}"),
        })
    }

    /// Decode a work message body.
    ///
    /// # Errors
    ///
    /// `MalformedMessage` if the text is not a JSON object with a string
    /// `word` field.
    pub fn decode(text: &str) -> Result<Self, OffloadError> {
        serde_json::from_str(text)
            .map_err(|e| OffloadError::MalformedMessage(format!("invalid work item {text:?}: {e}")))
    }
}

/// The outcome of processing one [`WorkItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// The transformed token.
    #[serde(rename = "word")]
    pub transformed_word: String,
    /// Identity of the worker that produced the result.
    #[serde(rename = "backend")]
    pub worker_tag: String,
}

impl ResultItem {
    pub fn new(transformed_word: impl Into<String>, worker_tag: impl Into<String>) -> Self {
        Self {
            transformed_word: transformed_word.into(),
            worker_tag: worker_tag.into(),
        }
    }

    pub fn encode(&self) -> Result<String, OffloadError> {
        serde_json::to_string(self).map_err(|e| OffloadError::PublishFailed {
            published: 0,
            reason: format!("cannot encode result item: {e}"),
        })
    }

    /// Decode a notification message body.
    ///
    /// # Errors
    ///
    /// `MalformedMessage` unless both `word` and `backend` are present as
    /// strings.
    pub fn decode(text: &str) -> Result<Self, OffloadError> {
        serde_json::from_str(text).map_err(|e| {
            OffloadError::MalformedMessage(format!("invalid result item {text:?}: {e}"))
        })
    }
}

/// Body of a submit request: `{ "words": "<space-separated text>" }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    pub words: Option<String>,
}

/// Body of a successful submit response: `{ "msgCount": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "msgCount")]
    pub msg_count: usize,
}
