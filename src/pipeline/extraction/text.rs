use super::types::PdfExtractor;
use super::ExtractionError;
use crate::models::SourceDocument;

/// Separator placed between non-empty pages.
pub const PAGE_SEPARATOR: &str = "\n";

/// Extract the full text of a document.
///
/// Blank pages are dropped and the rest are joined in page order. A document
/// that opens but has no text returns `Ok("")`; only a document that cannot
/// be read at all is an error.
pub fn extract_document_text(
    extractor: &dyn PdfExtractor,
    document: &SourceDocument,
) -> Result<String, ExtractionError> {
    let pages = extractor.extract_text(&document.bytes)?;
    let page_total = pages.len();

    let texts: Vec<String> = pages
        .into_iter()
        .filter(|p| !p.is_blank())
        .map(|p| p.text)
        .collect();

    tracing::debug!(
        label = %document.label,
        pages = page_total,
        pages_with_text = texts.len(),
        "Extracted document text"
    );

    Ok(texts.join(PAGE_SEPARATOR))
}
