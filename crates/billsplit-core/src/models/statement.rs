//! Data models for split statements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Plain text of one source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    /// Zero-based position within the source document.
    pub page_index: usize,
    /// Page text with whitespace runs collapsed to single spaces.
    pub content: String,
}

impl PageText {
    /// Build a page from raw extracted text, collapsing layout whitespace.
    pub fn new(page_index: usize, raw: &str) -> Self {
        Self {
            page_index,
            content: collapse_whitespace(raw),
        }
    }
}

/// Collapse every run of whitespace (including newlines) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A field value pulled out of page text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedField {
    /// Logical field name, e.g. "Account Number" or "Email".
    pub name: String,
    /// Captured value, exactly as matched.
    pub value: String,
    /// The pattern that produced the match.
    pub pattern: String,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte range of the captured value in the page text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<(usize, usize)>,
}

impl ExtractedField {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        pattern: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            pattern: pattern.into(),
            confidence,
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// One successfully split page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// Extracted account number, if any pattern matched.
    pub account_number: Option<String>,
    /// Extracted customer name, if any pattern matched.
    pub customer_name: Option<String>,
    /// Output file name.
    pub file_name: String,
    /// Zero-based index of the source page.
    pub page_index: usize,
    /// Every field found on the page: account and name matches first,
    /// followed by best-effort common fields.
    pub fields: Vec<ExtractedField>,
    /// Single-page PDF content.
    #[serde(skip)]
    pub blob: Vec<u8>,
}

impl PageResult {
    /// Look up an extracted field by name.
    pub fn field(&self, name: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A page that produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingError {
    /// Zero-based index of the failed page.
    pub page_index: usize,
    /// Why the page failed.
    pub reason: String,
}

impl ProcessingError {
    pub fn new(page_index: usize, reason: impl Into<String>) -> Self {
        Self {
            page_index,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page {} (index {}): {}",
            self.page_index + 1,
            self.page_index,
            self.reason
        )
    }
}

/// Outcome of one split call: successes and per-page failures, each in
/// source page order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResult {
    /// One entry per successfully split page.
    pub files: Vec<PageResult>,
    /// One entry per page that produced no output.
    pub errors: Vec<ProcessingError>,
    /// Number of pages in the source document.
    pub page_count: usize,
}

impl SplitResult {
    pub fn success_count(&self) -> usize {
        self.files.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Human-readable error descriptions.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}
