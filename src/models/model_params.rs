use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default API endpoint for Google's Generative AI service
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default API version
pub const DEFAULT_API_VERSION: &str = "v1beta";
/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
/// Default upstream request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the API key travels to the upstream API.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyTransport {
    /// The `x-goog-api-key` request header.
    #[default]
    Header,
    /// The `key` URL query parameter.
    Query,
}

impl fmt::Display for KeyTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// Configuration parameters for the generative model
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct ModelParams {
    /// Model identifier (e.g., "gemini-1.5-flash-latest")
    #[builder(setter(into), default = String::from(DEFAULT_MODEL))]
    pub model: String,
    /// Base URL of the API, without a trailing slash
    #[builder(setter(into), default = String::from(DEFAULT_BASE_URL))]
    pub base_url: String,
    /// API version path segment
    #[builder(setter(into), default = String::from(DEFAULT_API_VERSION))]
    pub api_version: String,
    /// How the API key is attached to upstream requests
    #[builder(default)]
    pub key_transport: KeyTransport,
    /// Upper bound on a single upstream call
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::builder().build()
    }
}
