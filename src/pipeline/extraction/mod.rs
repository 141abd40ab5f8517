pub mod types;
pub mod pdf;
pub mod text;

pub use types::*;
pub use pdf::*;
pub use text::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),
}
