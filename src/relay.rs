//! The prompt relay: one inbound request in, one outbound response out.

use std::fmt;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    client::ContentGenerator,
    error::{RelayError, METHOD_NOT_ALLOWED_MESSAGE},
    models::Request,
};

/// Text returned when the upstream succeeds without any usable text.
pub const FALLBACK_TEXT: &str = "Could not generate text.";

/// An inbound HTTP request as seen by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// Raw request body, expected to be a JSON object with a `prompt` field.
    pub body: String,
}

impl InboundRequest {
    /// Creates a `POST` request with `body`.
    pub fn post(body: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            body: body.into(),
        }
    }
}

/// Media type of an [`OutboundResponse`] body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// `application/json`
    Json,
    /// `text/plain; charset=utf-8`
    PlainText,
}

impl ContentType {
    /// The header value for this media type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::PlainText => "text/plain; charset=utf-8",
        }
    }
}

/// The response the relay hands back to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    /// HTTP status code.
    pub status_code: StatusCode,
    /// Media type of `body`.
    pub content_type: ContentType,
    /// Serialized body.
    pub body: String,
}

#[derive(Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl OutboundResponse {
    /// A 200 response carrying `{ "text": text }`.
    pub fn text(text: &str) -> Self {
        Self::json(StatusCode::OK, &TextBody { text })
    }

    /// The caller-facing rendering of `err`.
    pub fn from_error(err: &RelayError) -> Self {
        match err {
            RelayError::InvalidMethod(_) => Self {
                status_code: err.status(),
                content_type: ContentType::PlainText,
                body: METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            },
            _ => Self::json(
                err.status(),
                &ErrorBody {
                    error: &err.public_message(),
                },
            ),
        }
    }

    fn json(status_code: StatusCode, body: &impl Serialize) -> Self {
        Self {
            status_code,
            content_type: ContentType::Json,
            // A struct of string fields always serializes.
            body: serde_json::to_string(body).unwrap_or_default(),
        }
    }
}

/// Forwards prompts to a [`ContentGenerator`] and maps the outcome to HTTP.
///
/// Holds only immutable state, so one instance serves every request.
pub struct PromptRelay<G> {
    api_key: Option<String>,
    generator: G,
}

impl<G: fmt::Debug> fmt::Debug for PromptRelay<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptRelay")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("generator", &self.generator)
            .finish()
    }
}

impl<G: ContentGenerator> PromptRelay<G> {
    /// Creates a relay. `api_key` of `None` (or empty) makes every valid
    /// request fail with a configuration error without calling `generator`.
    pub fn new(api_key: Option<String>, generator: G) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            generator,
        }
    }

    /// Returns the upstream generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Handles one request. Never fails: every error becomes a response.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn handle(&self, request: InboundRequest) -> OutboundResponse {
        info!("relay invoked, processing request");

        match self.relay(&request).await {
            Ok(text) => OutboundResponse::text(&text),
            Err(err) => {
                match &err {
                    RelayError::InvalidMethod(_) => info!(error = %err, "rejecting request"),
                    RelayError::MalformedInput(_)
                    | RelayError::PayloadTooLarge { .. }
                    | RelayError::Validation => {
                        warn!(error = %err, "rejecting request")
                    }
                    RelayError::Configuration => {
                        error!("GEMINI_API_KEY is not set, cannot call Gemini API")
                    }
                    RelayError::Upstream { status, detail } => {
                        error!(%status, detail = %detail, "Gemini API returned an error")
                    }
                    RelayError::Unexpected(source) => {
                        error!(error = %err, source = %source, "relay failed")
                    }
                }
                OutboundResponse::from_error(&err)
            }
        }
    }

    /// The typed pipeline behind [`PromptRelay::handle`].
    ///
    /// # Errors
    ///
    /// Returns the [`RelayError`] describing why no text could be produced.
    pub async fn relay(&self, request: &InboundRequest) -> Result<String, RelayError> {
        if request.method != "POST" {
            return Err(RelayError::InvalidMethod(request.method.clone()));
        }

        let prompt = extract_prompt(&request.body)?;
        info!(prompt_chars = prompt.chars().count(), "received prompt");
        debug!(prompt = %prompt, "prompt text");

        let api_key = self.api_key.as_deref().ok_or(RelayError::Configuration)?;

        let payload = Request::with_prompt(prompt);
        info!("sending request to Gemini API");
        let response = self
            .generator
            .generate_content(api_key, &payload)
            .await
            .map_err(|err| RelayError::from_upstream(err, api_key))?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = ?usage.prompt_token_count,
                total_tokens = ?usage.total_token_count,
                model_version = ?response.model_version,
                "Gemini usage"
            );
        }

        match response.first_text() {
            Some(text) => {
                info!("extracted text from Gemini response");
                Ok(text.to_string())
            }
            None => {
                warn!(
                    finish_reason = ?response.finish_reason(),
                    response = ?response,
                    "Gemini response was successful but contained no text"
                );
                Ok(FALLBACK_TEXT.to_string())
            }
        }
    }
}

/// Pulls the prompt out of a JSON request body.
///
/// # Errors
///
/// [`RelayError::MalformedInput`] if the body is not a JSON object, and
/// [`RelayError::Validation`] if `prompt` is missing, not a string, or empty.
pub fn extract_prompt(body: &str) -> Result<String, RelayError> {
    let value: Value = serde_json::from_str(body).map_err(RelayError::MalformedInput)?;

    let Value::Object(mut fields) = value else {
        return Err(RelayError::MalformedInput(serde::de::Error::custom(
            "expected a JSON object",
        )));
    };

    match fields.remove("prompt") {
        Some(Value::String(prompt)) if !prompt.is_empty() => Ok(prompt),
        _ => Err(RelayError::Validation),
    }
}
