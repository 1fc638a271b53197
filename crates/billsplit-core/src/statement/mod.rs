//! Statement splitting: field rules, output naming and the page splitter.

pub mod naming;
pub mod rules;
mod splitter;

pub use naming::{build_archive_name, build_file_name, normalize_month_year, sanitize_component, OutputNamer};
pub use rules::{FieldExtractor, PatternFieldExtractor, CommonFieldExtractor, extract_field};
pub use splitter::{
    split_statements, CancellationToken, NoProgress, ProgressSink, SplitState, StatementSplitter,
};
