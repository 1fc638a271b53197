//! PDF processing module.

mod extractor;

pub use extractor::{extract_pages, PdfExtractor};

use crate::error::PdfError;
use crate::models::statement::PageText;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
///
/// Pages are addressed by zero-based index.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> usize;

    /// Extract the text of each page in forward order, stopping after
    /// `max_pages` pages when given.
    fn extract_pages(&self, max_pages: Option<usize>) -> Result<Vec<PageText>>;

    /// Copy a single page out as an independent one-page PDF.
    fn extract_page(&self, page_index: usize) -> Result<Vec<u8>>;
}

/// Offset of the `%PDF-` header, searched within the first kilobyte like
/// most readers do.
pub fn find_pdf_header(data: &[u8]) -> Option<usize> {
    let window = &data[..data.len().min(1024)];
    window.windows(5).position(|w| w == b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_pdf_header() {
        assert_eq!(find_pdf_header(b"%PDF-1.5\n..."), Some(0));
        assert_eq!(find_pdf_header(b"\xef\xbb\xbf%PDF-1.7"), Some(3));
        assert_eq!(find_pdf_header(b"PK\x03\x04 not a pdf"), None);
        assert_eq!(find_pdf_header(b""), None);
    }
}
