//! Rule-based field extractors for bill statements.

pub mod common;
pub mod field;
pub mod patterns;

pub use common::{CommonField, CommonFieldExtractor};
pub use field::{confidence_for_rank, extract_field, PatternFieldExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
