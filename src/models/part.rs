//! Common part model used in both requests and responses.

use serde::{Deserialize, Serialize};

/// A single part of a content entry.
///
/// Only text parts are produced by the relay. On the response side the
/// upstream may also return parts without text (function calls, inline
/// data), so `text` is optional and every other field is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// The text content of the part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}
