//! Error types for the billsplit-core library.

use thiserror::Error;

use crate::patterns::PatternField;

/// Main error type for the billsplit library.
///
/// Only call-aborting conditions end up here. Pages that fail extraction
/// are reported as [`crate::ProcessingError`] values inside the split result.
#[derive(Error, Debug)]
pub enum BillsplitError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Pattern store or pattern compilation error.
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Pattern persistence error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The supplied input is not a PDF.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The caller cancelled the split before all pages were processed.
    #[error("split cancelled after {processed} of {total} pages")]
    Cancelled { processed: usize, total: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page index requested (zero-based).
    #[error("invalid page index: {0}")]
    InvalidPage(usize),

    /// Failed to serialize a single-page document.
    #[error("failed to write PDF: {0}")]
    Write(String),
}

/// Errors related to extraction patterns.
#[derive(Error, Debug)]
pub enum PatternError {
    /// The pattern does not compile as a regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Removal index outside the field's pattern list.
    #[error("pattern index {index} out of range for {field} patterns (len {len})")]
    IndexOutOfRange {
        field: PatternField,
        index: usize,
        len: usize,
    },

    /// The pattern compiles but does not expose exactly one capture group.
    #[error("pattern '{pattern}' must have exactly one capture group, found {groups}")]
    CaptureGroups { pattern: String, groups: usize },
}

/// Errors raised while loading or saving a pattern set.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("pattern storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored pattern set could not be (de)serialized.
    #[error("pattern storage format error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for the billsplit library.
pub type Result<T> = std::result::Result<T, BillsplitError>;
