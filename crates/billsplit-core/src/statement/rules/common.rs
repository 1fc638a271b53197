//! Best-effort extraction of common statement fields.
//!
//! These patterns are fixed and never decide whether a page succeeds.

use regex::Regex;

use super::patterns::{AMOUNT, DATE, EMAIL, PHONE, ZIP};
use super::FieldExtractor;
use crate::models::statement::ExtractedField;

/// A fixed auxiliary field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonField {
    Email,
    Phone,
    Date,
    Amount,
    Zip,
}

impl CommonField {
    /// All common fields, in reporting order.
    pub const ALL: [CommonField; 5] = [
        CommonField::Email,
        CommonField::Phone,
        CommonField::Date,
        CommonField::Amount,
        CommonField::Zip,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Date => "Date",
            Self::Amount => "Amount",
            Self::Zip => "ZIP",
        }
    }

    /// Fixed confidence for matches of this field.
    pub fn confidence(self) -> f32 {
        match self {
            Self::Email => 0.9,
            Self::Phone | Self::Date => 0.8,
            Self::Amount => 0.7,
            Self::Zip => 0.6,
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Email => &EMAIL,
            Self::Phone => &PHONE,
            Self::Date => &DATE,
            Self::Amount => &AMOUNT,
            Self::Zip => &ZIP,
        }
    }
}

/// Extracts the first match of each common field.
#[derive(Debug, Clone)]
pub struct CommonFieldExtractor {
    fields: Vec<CommonField>,
}

impl CommonFieldExtractor {
    /// Extractor for every common field.
    pub fn new() -> Self {
        Self {
            fields: CommonField::ALL.to_vec(),
        }
    }

    /// Extractor restricted to the given fields.
    pub fn with_fields(fields: &[CommonField]) -> Self {
        Self {
            fields: fields.to_vec(),
        }
    }

    fn find(field: CommonField, text: &str) -> Option<ExtractedField> {
        let regex = field.regex();
        let m = regex.find(text)?;
        Some(
            ExtractedField::new(field.name(), m.as_str(), regex.as_str(), field.confidence())
                .with_position(m.start(), m.end()),
        )
    }
}

impl Default for CommonFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CommonFieldExtractor {
    type Output = ExtractedField;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.fields.iter().find_map(|field| Self::find(*field, text))
    }

    /// One entry per field that matched; missing fields are simply omitted.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.fields
            .iter()
            .filter_map(|field| Self::find(*field, text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_all_common_fields() {
        let text = "Questions? Call (555) 234-5678 or billing@example.com \
                    Statement date 01/15/2024 Amount due $1,234.56 Springfield IL 62704-1234";
        let fields = CommonFieldExtractor::new().extract_all(text);
        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Email", "billing@example.com"),
                ("Phone", "(555) 234-5678"),
                ("Date", "01/15/2024"),
                ("Amount", "$1,234.56"),
                ("ZIP", "62704-1234"),
            ]
        );
        assert_eq!(fields[0].confidence, 0.9);
        assert_eq!(fields[4].confidence, 0.6);
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let fields = CommonFieldExtractor::new().extract_all("Reach us at 555-987-6543");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Phone");
    }

    #[test]
    fn test_long_dates_and_restricted_fields() {
        let extractor = CommonFieldExtractor::with_fields(&[CommonField::Date]);
        let field = extractor.extract("Billing period ends January 5, 2024").unwrap();
        assert_eq!(field.value, "January 5, 2024");
        assert!(extractor.extract("billing@example.com").is_none());
    }

    #[test]
    fn test_account_digits_not_a_phone() {
        let fields = CommonFieldExtractor::with_fields(&[CommonField::Phone])
            .extract_all("account nbr: 5552345678901");
        assert!(fields.is_empty());
    }
}
