//! PDF text extraction and page slicing using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::statement::PageText;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    try_empty_password: bool,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            try_empty_password: true,
        }
    }

    /// Set whether encrypted PDFs are retried with an empty password.
    pub fn with_empty_password(mut self, enabled: bool) -> Self {
        self.try_empty_password = enabled;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    /// Serialize a copy of the document that keeps only `keep` pages
    /// (one-based page numbers).
    fn save_subset(&self, keep: impl Fn(u32) -> bool) -> Result<Vec<u8>> {
        let mut doc = self.document()?.clone();

        let delete: Vec<u32> = doc.get_pages().keys().copied().filter(|n| !keep(*n)).collect();
        if !delete.is_empty() {
            doc.delete_pages(&delete);
            doc.prune_objects();
        }

        let mut data = Vec::new();
        doc.save_to(&mut data)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        Ok(data)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if !self.try_empty_password || doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len())
            .unwrap_or(0)
    }

    fn extract_pages(&self, max_pages: Option<usize>) -> Result<Vec<PageText>> {
        let total = self.page_count();
        if total == 0 {
            return Err(PdfError::NoPages);
        }
        let limit = max_pages.map_or(total, |max| max.min(total));

        // Drop trailing pages before extraction so a limit saves real work.
        let truncated;
        let data: &[u8] = if limit < total {
            truncated = self.save_subset(|n| (n as usize) <= limit)?;
            &truncated
        } else {
            &self.raw_data
        };

        let mut raw_pages = extract_text_by_pages(data)?;
        if raw_pages.len() != limit {
            warn!(
                "Text extraction returned {} pages, document has {}",
                raw_pages.len(),
                limit
            );
            raw_pages.resize(limit, String::new());
        }

        let pages: Vec<PageText> = raw_pages
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                trace!("Page {} raw text: {:?}", index, raw);
                PageText::new(index, raw)
            })
            .collect();

        debug!("Extracted text from {} of {} pages", pages.len(), total);
        Ok(pages)
    }

    fn extract_page(&self, page_index: usize) -> Result<Vec<u8>> {
        if page_index >= self.page_count() {
            return Err(PdfError::InvalidPage(page_index));
        }
        let page_number = page_index as u32 + 1;
        self.save_subset(|n| n == page_number)
    }
}

/// Extract the text of every page from PDF bytes.
///
/// pdf-extract can panic on malformed input, so panics are converted into
/// [`PdfError::TextExtraction`].
fn extract_text_by_pages(data: &[u8]) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
        Err(_) => Err(PdfError::TextExtraction(
            "text extraction panicked (malformed document)".to_string(),
        )),
    }
}

/// Load PDF bytes and extract page texts in forward order.
///
/// When `max_pages` is given only the first `max_pages` pages are read.
pub fn extract_pages(pdf_bytes: &[u8], max_pages: Option<usize>) -> Result<Vec<PageText>> {
    let mut extractor = PdfExtractor::new();
    extractor.load(pdf_bytes)?;
    extractor.extract_pages(max_pages)
}
