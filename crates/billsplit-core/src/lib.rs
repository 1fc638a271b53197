//! Core library for splitting concatenated bill statement PDFs.
//!
//! This crate provides:
//! - PDF processing (per-page text extraction and single-page slicing)
//! - A persisted, ordered store of account number and customer name patterns
//! - Priority-ordered field extraction with rank-based confidence
//! - Per-page splitting with progress reporting and cancellation
//! - Cross-platform output file and archive naming

pub mod error;
pub mod models;
pub mod patterns;
pub mod pdf;
pub mod statement;

#[cfg(test)]
mod testing;

pub use error::{BillsplitError, PatternError, PdfError, Result, StorageError};
pub use models::config::SplitterConfig;
pub use models::statement::{ExtractedField, PageResult, PageText, ProcessingError, SplitResult};
pub use patterns::{JsonFileStorage, MemoryStorage, PatternField, PatternSet, PatternStorage, PatternStore};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use statement::{
    build_archive_name, build_file_name, split_statements, CancellationToken, NoProgress,
    ProgressSink, SplitState, StatementSplitter,
};
