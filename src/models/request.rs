//! Request models for the Gemini AI API.

use serde::{Deserialize, Serialize};

use super::Part;

/// A request to the Gemini AI API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// The contents of the request, including the prompt text.
    pub contents: Vec<Content>,
}

/// A content object containing parts of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// The producer of the content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// The parts that make up the content.
    pub parts: Vec<Part>,
}

/// The producer of a content entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Content written by the end user.
    User,
}

impl Request {
    /// Creates a single-turn request carrying `text` as the user's prompt.
    ///
    /// The prompt is copied verbatim into `contents[0].parts[0].text`.
    ///
    /// # Arguments
    ///
    /// * `text` - The text prompt to generate content from
    pub fn with_prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some(Role::User),
                parts: vec![Part::text(text)],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prompt_request_serializes_as_single_user_turn() {
        let request = Request::with_prompt("Describe the dungeon");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": "Describe the dungeon" }]
                }]
            })
        );
    }

    #[test]
    fn only_the_user_role_is_produced() {
        assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("user"));
        assert!(serde_json::from_value::<Role>(json!("model")).is_err());
    }

    #[test]
    fn prompt_is_not_trimmed_or_escaped() {
        let prompt = "  \"quoted\" <b>ünïcode</b>\n";
        let request = Request::with_prompt(prompt);

        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].parts.len(), 1);
        assert_eq!(request.contents[0].parts[0].text.as_deref(), Some(prompt));
    }
}
