//! Client implementation for the Gemini AI API.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::{
    error::GoogleGenerativeAIError,
    models::{KeyTransport, ModelParams, Request, RequestType, Response},
};

/// Header carrying the API key when [`KeyTransport::Header`] is used.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Something that can turn a [`Request`] into a [`Response`] upstream.
///
/// The relay only depends on this trait, so tests can count or script
/// upstream calls without a network.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generates content for `request`, authorizing with `api_key`.
    async fn generate_content(
        &self,
        api_key: &str,
        request: &Request,
    ) -> Result<Response, GoogleGenerativeAIError>;
}

/// A client for interacting with the Gemini AI API.
#[derive(Debug, Clone)]
pub struct GenerativeModel {
    params: ModelParams,
    client: reqwest::Client,
}

impl GenerativeModel {
    /// Creates a new GenerativeModel with the specified parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(params: impl Into<ModelParams>) -> Result<Self, GoogleGenerativeAIError> {
        let params = params.into();
        let client = reqwest::Client::builder().timeout(params.timeout).build()?;
        Ok(Self { params, client })
    }

    /// Returns the parameters this model was built with.
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Builds the endpoint URL for `request_type`.
    ///
    /// The API key is never part of this string, so it is safe to log.
    pub fn build_url(&self, request_type: RequestType) -> String {
        format!(
            "{}/{}/models/{}:{}",
            self.params.base_url.trim_end_matches('/'),
            self.params.api_version,
            self.params.model,
            request_type
        )
    }

    /// Makes a request to the Gemini AI API.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleGenerativeAIError::Api`] if the API answers with a
    /// non-success status, or a request error if the call itself fails.
    async fn make_request(
        &self,
        url: &str,
        api_key: &str,
        request: &Request,
    ) -> Result<reqwest::Response, GoogleGenerativeAIError> {
        let builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(request);

        let builder = match self.params.key_transport {
            KeyTransport::Header => builder.header(API_KEY_HEADER, api_key),
            KeyTransport::Query => builder.query(&[("key", api_key)]),
        };

        // reqwest errors render the full URL, which carries the key in query mode.
        let response = builder.send().await.map_err(reqwest::Error::without_url)?;

        let status = response.status();
        debug!(%status, "received response from Gemini API");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleGenerativeAIError::Api { status, body });
        }

        Ok(response)
    }

    /// Generates content using the Gemini AI API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or if the response cannot be parsed.
    pub async fn generate_response(
        &self,
        api_key: &str,
        request: &Request,
    ) -> Result<Response, GoogleGenerativeAIError> {
        let url = self.build_url(RequestType::GenerateContent);
        let bytes = self
            .make_request(&url, api_key, request)
            .await?
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ContentGenerator for GenerativeModel {
    async fn generate_content(
        &self,
        api_key: &str,
        request: &Request,
    ) -> Result<Response, GoogleGenerativeAIError> {
        self.generate_response(api_key, request).await
    }
}
