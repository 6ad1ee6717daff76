//! Error types for the Gemini client and the prompt relay.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when using the Gemini AI client.
#[derive(Debug, Error)]
pub enum GoogleGenerativeAIError {
    /// Base error for the Gemini AI client.
    #[error("[GoogleGenerativeAI Error]: {message}")]
    Base {
        /// Error message
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("API responded with status {status}: {body}")]
    Api {
        /// Upstream HTTP status
        status: StatusCode,
        /// Upstream response body, read as text
        body: String,
    },

    /// Error occurred during an API request.
    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error occurred when parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GoogleGenerativeAIError {
    /// Creates a new Base error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Base {
            message: message.into(),
        }
    }
}

/// Message returned to callers when the prompt is missing or empty.
pub const NO_PROMPT_MESSAGE: &str = "Bad Request: No prompt provided.";
/// Message returned to callers when the body is not a JSON object.
pub const MALFORMED_INPUT_MESSAGE: &str = "Bad Request: Malformed JSON body.";
/// Message returned to callers when the body exceeds the size limit.
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Payload Too Large";
/// Message returned to callers when no API key is configured.
pub const CONFIGURATION_MESSAGE: &str = "Server configuration error.";
/// Message prefix returned to callers when the upstream API fails.
pub const UPSTREAM_MESSAGE: &str = "Failed to fetch from Gemini API";
/// Message returned to callers for every other failure.
pub const INTERNAL_MESSAGE: &str = "Internal Server Error";
/// Plain-text body of the 405 response.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";

/// Upstream error detail longer than this is cut before reaching the caller.
const MAX_UPSTREAM_DETAIL_CHARS: usize = 512;

/// Every way a single relay invocation can fail.
///
/// Variants keep their full detail for logging. Only [`RelayError::status`]
/// and [`RelayError::public_message`] decide what reaches the caller.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request used a method other than `POST`.
    #[error("method {0} is not allowed")]
    InvalidMethod(String),

    /// The body is not a JSON object.
    #[error("request body is not a JSON object: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// The body is larger than the server accepts.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// The body carries no usable prompt.
    #[error("request body has no prompt")]
    Validation,

    /// No API key is configured.
    #[error("GEMINI_API_KEY is not configured")]
    Configuration,

    /// The upstream API answered with a non-success status.
    #[error("upstream responded with status {status}")]
    Upstream {
        /// Upstream HTTP status, forwarded to the caller
        status: StatusCode,
        /// Upstream detail, already trimmed and redacted
        detail: String,
    },

    /// Network, timeout, or decoding failure.
    #[error("unexpected failure calling upstream")]
    Unexpected(#[source] GoogleGenerativeAIError),
}

impl RelayError {
    /// Classifies a client error, redacting `api_key` from any upstream detail.
    pub fn from_upstream(err: GoogleGenerativeAIError, api_key: &str) -> Self {
        match err {
            GoogleGenerativeAIError::Api { status, body } => Self::Upstream {
                status,
                detail: sanitize_detail(&body, api_key),
            },
            other => Self::Unexpected(other),
        }
    }

    /// The HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::MalformedInput(_) | Self::Validation => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Configuration | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => *status,
        }
    }

    /// The message returned to the caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidMethod(_) => METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            Self::MalformedInput(_) => MALFORMED_INPUT_MESSAGE.to_string(),
            Self::PayloadTooLarge { .. } => PAYLOAD_TOO_LARGE_MESSAGE.to_string(),
            Self::Validation => NO_PROMPT_MESSAGE.to_string(),
            Self::Configuration => CONFIGURATION_MESSAGE.to_string(),
            Self::Upstream { detail, .. } if detail.is_empty() => UPSTREAM_MESSAGE.to_string(),
            Self::Upstream { detail, .. } => format!("{UPSTREAM_MESSAGE}: {detail}"),
            Self::Unexpected(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

fn sanitize_detail(body: &str, api_key: &str) -> String {
    let trimmed = body.trim();
    let redacted = if api_key.is_empty() {
        trimmed.to_string()
    } else {
        trimmed.replace(api_key, "[REDACTED]")
    };

    match redacted.char_indices().nth(MAX_UPSTREAM_DETAIL_CHARS) {
        Some((cut, _)) => format!("{}...", &redacted[..cut]),
        None => redacted,
    }
}
