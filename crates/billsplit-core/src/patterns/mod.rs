//! Configurable extraction patterns for account numbers and customer names.
//!
//! Every pattern is a regular expression with exactly one capture group.
//! Lists are ordered: earlier patterns win and carry a higher confidence.
//! Matching is always case-insensitive.

mod store;

pub use store::{JsonFileStorage, MemoryStorage, PatternStorage, PatternStore};

use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// Default account number patterns, highest priority first.
///
/// Unlabelled values must contain a digit so prose such as "account number
/// with payment" does not match.
pub const DEFAULT_ACCOUNT_PATTERNS: &[&str] = &[
    r"account\s*nbr:\s*([A-Z0-9][A-Z0-9-]*)",
    r"account\s*(?:number\b|no\b\.?|#)\s*[:#]?\s*([A-Z0-9-]*\d[A-Z0-9-]*)",
    r"acct\.?\s*(?:nbr|number|no\.?|#)?\s*:\s*([A-Z0-9][A-Z0-9-]*)",
];

/// Default customer name patterns, highest priority first.
///
/// Page text is collapsed onto a single line, so name patterns stop at the
/// next statement label (a known word, at most one more word, then a colon)
/// or at the end of the page.
pub const DEFAULT_NAME_PATTERNS: &[&str] = &[
    r"customer\s*name:\s*(.+?)(?:\s+(?:account|acct|customer|statement|service|billing|bill|due|amount|total|balance|page)\b(?:\s+[\w#.]+)?\s*:|$)",
    r"(?:account\s*holder|bill\s*to):\s*(.+?)(?:\s+(?:account|acct|customer|statement|service|billing|bill|due|amount|total|balance|page)\b(?:\s+[\w#.]+)?\s*:|$)",
    r"\bname:\s*([A-Z][A-Z.'-]*(?:\s+[A-Z][A-Z.'-]*){0,3})",
];

/// Which field a pattern list extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternField {
    /// Customer account number.
    Account,
    /// Customer name.
    Name,
}

impl PatternField {
    /// Human-readable field label used in extracted metadata.
    pub fn label(self) -> &'static str {
        match self {
            Self::Account => "Account Number",
            Self::Name => "Customer Name",
        }
    }
}

impl fmt::Display for PatternField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => f.write_str("account"),
            Self::Name => f.write_str("name"),
        }
    }
}

impl FromStr for PatternField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "account" | "account_number" | "acct" => Ok(Self::Account),
            "name" | "customer_name" | "customer" => Ok(Self::Name),
            other => Err(format!("unknown pattern field: {other}")),
        }
    }
}

/// Ordered pattern lists for both fields.
///
/// Serialized as `{ "accountPatterns": [...], "namePatterns": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSet {
    /// Account number patterns, highest priority first.
    pub account_patterns: Vec<String>,
    /// Customer name patterns, highest priority first.
    pub name_patterns: Vec<String>,
}

impl PatternSet {
    /// The built-in default pattern set.
    pub fn defaults() -> Self {
        Self {
            account_patterns: DEFAULT_ACCOUNT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            name_patterns: DEFAULT_NAME_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Patterns for a field, in priority order.
    pub fn get(&self, field: PatternField) -> &[String] {
        match field {
            PatternField::Account => &self.account_patterns,
            PatternField::Name => &self.name_patterns,
        }
    }

    pub(crate) fn get_mut(&mut self, field: PatternField) -> &mut Vec<String> {
        match field {
            PatternField::Account => &mut self.account_patterns,
            PatternField::Name => &mut self.name_patterns,
        }
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Compile a pattern the way the extractors run it (case-insensitive).
///
/// Only syntax is checked here; capture groups are validated separately.
pub fn compile_pattern(pattern: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| PatternError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_compile_with_one_group() {
        for pattern in DEFAULT_ACCOUNT_PATTERNS.iter().chain(DEFAULT_NAME_PATTERNS) {
            let regex = compile_pattern(pattern).unwrap();
            // captures_len counts the implicit whole-match group
            assert_eq!(regex.captures_len(), 2, "{pattern}");
        }
    }

    #[test]
    fn test_serialized_shape() {
        let set = PatternSet {
            account_patterns: vec!["a:(\\d+)".to_string()],
            name_patterns: vec![],
        };
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"accountPatterns":["a:(\\d+)"],"namePatterns":[]}"#);

        let back: PatternSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_field_parse_and_display() {
        assert_eq!("Account".parse::<PatternField>(), Ok(PatternField::Account));
        assert_eq!("name".parse::<PatternField>(), Ok(PatternField::Name));
        assert!("phone".parse::<PatternField>().is_err());
        assert_eq!(PatternField::Name.to_string(), "name");
        assert_eq!(PatternField::Account.label(), "Account Number");
    }

    fn first_capture(patterns: &[&str], text: &str) -> Option<String> {
        patterns.iter().find_map(|p| {
            compile_pattern(p)
                .unwrap()
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
    }

    #[test]
    fn test_account_patterns_ignore_prose() {
        let account = |text| first_capture(DEFAULT_ACCOUNT_PATTERNS, text);
        assert_eq!(account("Important account notice Rates change on March 1"), None);
        assert_eq!(account("Please include your account number with payment"), None);
        assert_eq!(account("Account No. 12345").as_deref(), Some("12345"));
        assert_eq!(account("account number: ACC-1001").as_deref(), Some("ACC-1001"));
        assert_eq!(account("Account # 99817").as_deref(), Some("99817"));
    }

    #[test]
    fn test_name_patterns_stop_at_labels_only() {
        let name = |text| first_capture(DEFAULT_NAME_PATTERNS, text);
        assert_eq!(
            name("Customer Name: Jimmy Page account nbr: X1").as_deref(),
            Some("Jimmy Page")
        );
        assert_eq!(
            name("Customer Name: Dana Service Amount due: $4.00").as_deref(),
            Some("Dana Service")
        );
        assert_eq!(name("Bill To: Lee Park acct #: 4455").as_deref(), Some("Lee Park"));
        assert_eq!(name("Customer Name: Jane Doe1").as_deref(), Some("Jane Doe1"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = compile_pattern("account:(\\d+").unwrap_err();
        assert!(matches!(err, PatternError::InvalidPattern { .. }));
    }
}
