use super::ExtractionError;

/// Text of a single page, 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtraction {
    pub page_number: usize,
    pub text: String,
}

impl PageExtraction {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// PDF text extraction abstraction (allows mocking for tests)
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError>;
}
