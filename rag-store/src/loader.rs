//! PDF loading: parse the upload and concatenate per-page text.

use lopdf::Document;
use tracing::{debug, info, warn};

use crate::{errors::RagError, record::PdfText};

/// Extracts the text of every page, in page order, from an in-memory PDF.
///
/// Pages without extractable text contribute an empty string and are
/// reported in [`PdfText::empty_pages`].
///
/// # Errors
/// - `RagError::Pdf` when the bytes are not a parseable PDF
/// - `RagError::UnsupportedPdf` for encrypted documents
pub fn extract_pdf_text(bytes: &[u8]) -> Result<PdfText, RagError> {
    let doc = Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        return Err(RagError::UnsupportedPdf(
            "encrypted documents are not supported".into(),
        ));
    }

    let pages = doc.get_pages();
    let mut out = PdfText {
        pages: pages.len(),
        ..PdfText::default()
    };

    for &number in pages.keys() {
        match doc.extract_text(&[number]) {
            Ok(text) => {
                if text.trim().is_empty() {
                    warn!(page = number, "page has no extractable text");
                    out.empty_pages.push(number);
                }
                out.text.push_str(&text);
            }
            Err(e) => {
                warn!(page = number, error = %e, "page has no extractable text");
                out.empty_pages.push(number);
            }
        }
    }

    debug!(
        pages = out.pages,
        empty_pages = out.empty_pages.len(),
        "pdf pages extracted"
    );
    Ok(out)
}

/// Runs [`extract_pdf_text`] on the blocking pool.
pub async fn load_pdf(bytes: Vec<u8>) -> Result<PdfText, RagError> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes)).await??;
    info!(
        bytes = size,
        pages = text.pages,
        chars = text.char_count(),
        "pdf text extracted"
    );
    Ok(text)
}
