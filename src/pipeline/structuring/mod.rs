pub mod types;
pub mod prompt;
pub mod parser;
pub mod extractor;
pub mod gemini;
pub mod ollama;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use extractor::*;
pub use gemini::*;
pub use ollama::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Model service is not reachable at {0}")]
    Connection(String),

    #[error("Model service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}
