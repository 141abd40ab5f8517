use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use super::types::{PageExtraction, PdfExtractor};
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wrap the process panic hook once so that panics raised inside
/// [`catch_quietly`] on the current thread are not printed.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// `catch_unwind` without the panic message on stderr.
fn catch_quietly<T>(f: impl FnOnce() -> T) -> Result<T, Box<dyn Any + Send>> {
    install_quiet_hook();
    QUIET_PANICS.with(|quiet| quiet.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET_PANICS.with(|quiet| quiet.set(false));
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Run pdf-extract, turning both its errors and its panics into `PdfParsing`.
///
/// pdf-extract panics on some malformed inputs; one corrupt report must not
/// take down the rest of the batch or draw over the progress display.
fn pages_from_mem(pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    catch_quietly(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes))
        .map_err(|payload| {
            tracing::debug!(panic = panic_message(payload.as_ref()), "pdf-extract panicked");
            ExtractionError::PdfParsing("PDF library panicked while reading document".into())
        })?
        .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
}

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError> {
        let pages = pages_from_mem(pdf_bytes)?
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageExtraction {
                page_number: i + 1,
                text,
            })
            .collect();

        Ok(pages)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Generate a valid PDF with one page per entry using lopdf (the library
    /// pdf-extract uses internally). An empty string yields a page with no text.
    pub(crate) fn make_test_pdf(pages: &[&str]) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET")
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn extract_text_from_digital_pdf() {
        let extractor = PdfTextExtractor;
        let pdf_bytes = make_test_pdf(&["Net revenues were 12.3 billion"]);
        let pages = extractor.extract_text(&pdf_bytes).unwrap();

        assert!(!pages.is_empty(), "Should extract at least one page");
        let full_text: String = pages.iter().map(|p| p.text.clone()).collect();
        assert!(
            full_text.contains("revenues") || full_text.contains("billion"),
            "Expected report text, got: {full_text}"
        );
    }

    #[test]
    fn pages_are_numbered_in_order() {
        let extractor = PdfTextExtractor;
        let pdf_bytes = make_test_pdf(&["First page", "Second page"]);
        let pages = extractor.extract_text(&pdf_bytes).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 2);
    }

    #[test]
    fn page_without_text_is_kept_as_blank() {
        let extractor = PdfTextExtractor;
        let pdf_bytes = make_test_pdf(&["Balance sheet", ""]);
        let pages = extractor.extract_text(&pdf_bytes).unwrap();

        assert_eq!(pages.len(), 2);
        assert!(!pages[0].is_blank());
        assert!(pages[1].is_blank());
    }

    #[test]
    fn library_panic_is_caught_and_quiet_flag_reset() {
        let result = catch_quietly(|| -> usize { panic!("bad xref stream") });

        let payload = result.unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "bad xref stream");
        assert!(!QUIET_PANICS.with(Cell::get));
    }

    #[test]
    fn formatted_panic_message_is_recovered() {
        let page = 7;
        let payload =
            catch_quietly(|| -> usize { panic!("missing object on page {page}") }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "missing object on page 7");
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let extractor = PdfTextExtractor;
        let result = extractor.extract_text(b"not a pdf");
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }

    #[test]
    fn empty_bytes_returns_error() {
        let extractor = PdfTextExtractor;
        assert!(extractor.extract_text(&[]).is_err());
    }
}
