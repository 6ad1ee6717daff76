#![deny(missing_docs)]

//! An HTTP relay in front of the Google Gemini AI API.
//!
//! Clients post `{ "prompt": "..." }`; the relay attaches the server-side API
//! key, calls `generateContent`, and answers with `{ "text": "..." }` or a
//! normalized `{ "error": "..." }`.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod relay;
pub mod server;

pub use client::{ContentGenerator, GenerativeModel};
pub use config::RelayConfig;
pub use error::{GoogleGenerativeAIError, RelayError};
pub use relay::{InboundRequest, OutboundResponse, PromptRelay};
