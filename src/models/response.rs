//! Response models for the Gemini AI API.
//!
//! Every field is optional: the relay must never fail on a successful
//! upstream response whose shape differs from what it expects.

use serde::Deserialize;

use super::Part;

/// A response from the Gemini AI API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// The generated candidates from the model.
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    /// Metadata about token usage.
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    /// The version of the model used.
    #[serde(default)]
    pub model_version: Option<String>,
}

/// A candidate response from the model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of the candidate.
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// The reason why the model stopped generating tokens.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    /// The parts of the content.
    #[serde(default)]
    pub parts: Option<Vec<Part>>,
    /// The producer of the content, usually `model`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Metadata about token usage in the request and response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: Option<i32>,
    /// Total number of tokens used.
    #[serde(default)]
    pub total_token_count: Option<i32>,
}

impl Response {
    /// Gets the text of the first part of the first candidate.
    ///
    /// Returns `None` when any level of `candidates[0].content.parts[0].text`
    /// is absent or the text is empty.
    pub fn first_text(&self) -> Option<&str> {
        let parts = match self.candidates.as_deref() {
            Some(
                [Candidate {
                    content:
                        Some(CandidateContent {
                            parts: Some(parts),
                            ..
                        }),
                    ..
                }, ..],
            ) => parts,
            _ => return None,
        };

        match parts.as_slice() {
            [Part {
                text: Some(text), ..
            }, ..]
                if !text.is_empty() =>
            {
                Some(text.as_str())
            }
            _ => None,
        }
    }

    /// Returns the finish reason of the first candidate, if any.
    pub fn finish_reason(&self) -> Option<&str> {
        match self.candidates.as_deref() {
            Some([first, ..]) => first.finish_reason.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extracts_first_candidate_text() {
        let response = parse(json!({
            "candidates": [
                {
                    "content": { "role": "model", "parts": [{ "text": "Hello world" }, { "text": "ignored" }] },
                    "finishReason": "STOP"
                },
                { "content": { "parts": [{ "text": "second candidate" }] } }
            ],
            "usageMetadata": { "promptTokenCount": 3, "totalTokenCount": 5 },
            "modelVersion": "gemini-1.5-flash-latest"
        }));

        assert_eq!(response.first_text(), Some("Hello world"));
        assert_eq!(response.finish_reason(), Some("STOP"));
        assert_eq!(
            response.usage_metadata.and_then(|u| u.total_token_count),
            Some(5)
        );
    }

    #[test]
    fn missing_levels_yield_none() {
        let shapes = [
            json!({}),
            json!({ "candidates": null }),
            json!({ "candidates": [] }),
            json!({ "candidates": [{}] }),
            json!({ "candidates": [{ "content": {} }] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{}] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] }),
            json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
        ];

        for shape in shapes {
            let response = parse(shape.clone());
            assert_eq!(response.first_text(), None, "shape: {shape}");
        }
    }

    #[test]
    fn non_text_first_part_yields_none() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [
                    { "functionCall": { "name": "roll_dice", "args": {} } },
                    { "text": "not first" }
                ] }
            }]
        }));

        assert_eq!(response.first_text(), None);
    }
}
