//! Data structures for the Gemini AI API requests and responses.

mod model_params;
mod part;
mod request;
mod request_type;
mod response;

pub use model_params::{
    KeyTransport, ModelParams, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_TIMEOUT,
};
pub use part::Part;
pub use request::{Content, Request, Role};
pub use request_type::RequestType;
pub use response::{Candidate, CandidateContent, Response, UsageMetadata};
