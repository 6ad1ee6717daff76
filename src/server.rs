//! HTTP front end for the relay.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    client::{ContentGenerator, GenerativeModel},
    config::RelayConfig,
    error::RelayError,
    relay::{InboundRequest, OutboundResponse, PromptRelay},
};

/// Largest request body the relay reads; larger bodies get a JSON 413.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The upstream client could not be built.
    #[error("failed to build Gemini client: {0}")]
    Client(#[from] crate::error::GoogleGenerativeAIError),
    /// Binding or serving failed.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        (
            self.status_code,
            [(header::CONTENT_TYPE, self.content_type.as_str())],
            self.body,
        )
            .into_response()
    }
}

/// Builds the router serving `relay` on every relay path, for every method.
pub fn router<G>(relay: Arc<PromptRelay<G>>) -> Router
where
    G: ContentGenerator + 'static,
{
    Router::new()
        .route("/", any(relay_handler::<G>))
        .route("/gemini-proxy", any(relay_handler::<G>))
        .route("/.netlify/functions/gemini-proxy", any(relay_handler::<G>))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

async fn relay_handler<G>(
    State(relay): State<Arc<PromptRelay<G>>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> OutboundResponse
where
    G: ContentGenerator + 'static,
{
    let method = method.as_str().to_string();
    if method != Method::POST.as_str() {
        return relay
            .handle(InboundRequest {
                method,
                body: String::new(),
            })
            .await;
    }

    match decode_body(body) {
        Ok(body) => relay.handle(InboundRequest { method, body }).await,
        Err(err) => {
            warn!(error = %err, "rejecting request body");
            OutboundResponse::from_error(&err)
        }
    }
}

fn decode_body(body: Result<Bytes, BytesRejection>) -> Result<String, RelayError> {
    match body {
        Ok(bytes) => String::from_utf8(bytes.to_vec())
            .map_err(|err| RelayError::MalformedInput(serde::de::Error::custom(err))),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(RelayError::PayloadTooLarge {
                limit: MAX_BODY_BYTES,
            })
        }
        Err(rejection) => Err(RelayError::MalformedInput(serde::de::Error::custom(
            rejection,
        ))),
    }
}

/// Binds `config.bind_addr` and serves the relay until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the address cannot be bound.
pub async fn serve(config: RelayConfig) -> Result<(), ServeError> {
    let model = GenerativeModel::new(config.model_params())?;
    let relay = Arc::new(PromptRelay::new(config.api_key.clone(), model));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        model = %config.model,
        key_transport = %config.key_transport,
        "prompt relay listening"
    );

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("prompt relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{body::Body, http::Request as HttpRequest};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        error::GoogleGenerativeAIError,
        models::{Request, Response as GeminiResponse},
    };

    struct Echo;

    #[async_trait]
    impl ContentGenerator for Echo {
        async fn generate_content(
            &self,
            _api_key: &str,
            request: &Request,
        ) -> Result<GeminiResponse, GoogleGenerativeAIError> {
            let prompt = request.contents[0].parts[0].text.clone().unwrap_or_default();
            Ok(serde_json::from_value(json!({
                "candidates": [{ "content": { "parts": [{ "text": format!("echo: {prompt}") }] } }]
            }))?)
        }
    }

    fn app() -> Router {
        router(Arc::new(PromptRelay::new(Some("k".to_string()), Echo)))
    }

    async fn read_body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn post_on_function_path_relays_prompt() {
        let response = app()
            .oneshot(
                HttpRequest::post("/.netlify/functions/gemini-proxy")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"prompt":"ping"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body, json!({ "text": "echo: ping" }));
    }

    #[tokio::test]
    async fn get_is_method_not_allowed_in_plain_text() {
        let response = app()
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(read_body(response).await, "Method Not Allowed");
    }

    #[tokio::test]
    async fn non_utf8_body_is_malformed_input() {
        let response = app()
            .oneshot(
                HttpRequest::post("/gemini-proxy")
                    .body(Body::from(vec![0xff, 0xfe, 0xfd]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_a_json_payload_too_large() {
        let prompt = "a".repeat(MAX_BODY_BYTES);
        let response = app()
            .oneshot(
                HttpRequest::post("/gemini-proxy")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "prompt": prompt }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body, json!({ "error": "Payload Too Large" }));
    }

    #[tokio::test]
    async fn oversized_non_post_is_still_method_not_allowed() {
        let response = app()
            .oneshot(
                HttpRequest::put("/")
                    .body(Body::from(vec![b'x'; MAX_BODY_BYTES + 1]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
