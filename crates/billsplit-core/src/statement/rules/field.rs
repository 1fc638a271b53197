//! Configurable, priority-ordered pattern extraction.
//!
//! Patterns are tried one at a time in list order and the first pattern
//! that captures a non-empty value wins, even if a later pattern would
//! match earlier in the text. This is deliberately not a single
//! alternation: with `a|b` the regex engine returns the leftmost match in
//! the text, which can come from a lower-priority pattern.

use regex::Regex;
use tracing::trace;

use super::FieldExtractor;
use crate::error::PatternError;
use crate::models::statement::ExtractedField;
use crate::patterns::compile_pattern;

/// Confidence for a match from the pattern at `index` (0 = highest priority).
pub fn confidence_for_rank(index: usize) -> f32 {
    (0.9 - 0.1 * index as f32).max(0.0)
}

/// A compiled, validated pattern list for one field.
#[derive(Debug, Clone)]
pub struct PatternFieldExtractor {
    name: String,
    patterns: Vec<(String, Regex)>,
}

impl PatternFieldExtractor {
    /// Compile the patterns case-insensitively.
    ///
    /// Every pattern must have exactly one capture group.
    pub fn compile(name: impl Into<String>, patterns: &[String]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|source| {
                let regex = compile_pattern(source)?;
                // captures_len includes the implicit whole-match group
                let groups = regex.captures_len() - 1;
                if groups != 1 {
                    return Err(PatternError::CaptureGroups {
                        pattern: source.clone(),
                        groups,
                    });
                }
                Ok((source.clone(), regex))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            patterns,
        })
    }

    /// Field name attached to every extracted value.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn match_at(&self, rank: usize, text: &str) -> Option<ExtractedField> {
        let (source, regex) = &self.patterns[rank];
        let capture = regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .filter(|m| !m.as_str().is_empty())?;

        trace!("{} matched pattern #{}: {:?}", self.name, rank, capture.as_str());
        Some(
            ExtractedField::new(
                self.name.clone(),
                capture.as_str(),
                source.clone(),
                confidence_for_rank(rank),
            )
            .with_position(capture.start(), capture.end()),
        )
    }
}

impl FieldExtractor for PatternFieldExtractor {
    type Output = ExtractedField;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        (0..self.patterns.len()).find_map(|rank| self.match_at(rank, text))
    }

    /// The first match of every pattern that matches, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        (0..self.patterns.len())
            .filter_map(|rank| self.match_at(rank, text))
            .collect()
    }
}

/// Extract a field from page text with an ordered pattern list.
///
/// Returns `Ok(None)` when no pattern matches; that is a signal, not an
/// error. Fails only if a pattern is invalid.
pub fn extract_field(
    name: &str,
    page_text: &str,
    patterns: &[String],
) -> Result<Option<ExtractedField>, PatternError> {
    Ok(PatternFieldExtractor::compile(name, patterns)?.extract(page_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{PatternField, PatternSet};
    use pretty_assertions::assert_eq;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_confidence_for_rank() {
        assert!(approx(confidence_for_rank(0), 0.9));
        assert!(approx(confidence_for_rank(1), 0.8));
        assert!(approx(confidence_for_rank(4), 0.5));
        assert_eq!(confidence_for_rank(12), 0.0);
        for rank in 0..15 {
            assert!(confidence_for_rank(rank + 1) <= confidence_for_rank(rank));
        }
    }

    #[test]
    fn test_default_account_pattern() {
        let set = PatternSet::defaults();
        let field = extract_field(
            "Account Number",
            "Statement account nbr: ACC1001 Customer Name: Jane Doe1",
            set.get(PatternField::Account),
        )
        .unwrap()
        .unwrap();
        assert_eq!(field.value, "ACC1001");
        assert_eq!(field.name, "Account Number");
        assert_eq!(field.pattern, set.account_patterns[0]);
        assert!(approx(field.confidence, 0.9));
    }

    #[test]
    fn test_default_name_pattern_stops_at_next_label() {
        let set = PatternSet::defaults();
        let extractor =
            PatternFieldExtractor::compile("Customer Name", set.get(PatternField::Name)).unwrap();

        let field = extractor
            .extract("Customer Name: Jane Doe1 account nbr: ACC1001")
            .unwrap();
        assert_eq!(field.value, "Jane Doe1");

        let field = extractor
            .extract("account nbr: ACC1001 CUSTOMER NAME:   John Q. Public")
            .unwrap();
        assert_eq!(field.value, "John Q. Public");
    }

    #[test]
    fn test_case_insensitive_and_flexible_whitespace() {
        let set = PatternSet::defaults();
        let field = extract_field("Account Number", "ACCOUNT NBR:    X-77", set.get(PatternField::Account))
            .unwrap()
            .unwrap();
        assert_eq!(field.value, "X-77");
    }

    #[test]
    fn test_lower_priority_pattern_confidence() {
        let list = patterns(&[r"acct id:\s*(\d+)", r"account number:\s*(\d+)"]);
        let field = extract_field("Account Number", "Account Number: 4455", &list)
            .unwrap()
            .unwrap();
        assert_eq!(field.value, "4455");
        assert_eq!(field.pattern, list[1]);
        assert!(approx(field.confidence, 0.8));
    }

    #[test]
    fn test_overlapping_patterns_follow_declared_priority() {
        // Pattern B matches earlier in the text, so a union `A|B` would
        // return B's value. Priority iteration must return A's.
        let list = patterns(&[r"ref:\s*(\w+)", r"id:\s*(\w+)"]);
        let text = "id: FIRST ref: SECOND";

        let field = extract_field("Account Number", text, &list).unwrap().unwrap();
        assert_eq!(field.value, "SECOND");
        assert!(approx(field.confidence, 0.9));

        let union = compile_pattern(r"ref:\s*(\w+)|id:\s*(\w+)").unwrap();
        let caps = union.captures(text).unwrap();
        assert_eq!(caps.get(2).map(|m| m.as_str()), Some("FIRST"));
    }

    #[test]
    fn test_empty_capture_falls_through() {
        let list = patterns(&[r"account:\s*(\d*)", r"acct:\s*(\d+)"]);
        let field = extract_field("Account Number", "account: none acct: 991", &list)
            .unwrap()
            .unwrap();
        assert_eq!(field.value, "991");
        assert!(approx(field.confidence, 0.8));
    }

    #[test]
    fn test_no_match_is_none() {
        let set = PatternSet::defaults();
        let field = extract_field("Account Number", "nothing to see here", set.get(PatternField::Account))
            .unwrap();
        assert!(field.is_none());
    }

    #[test]
    fn test_capture_group_validation() {
        let err = PatternFieldExtractor::compile("Account Number", &patterns(&[r"account \d+"]))
            .unwrap_err();
        assert!(matches!(err, PatternError::CaptureGroups { groups: 0, .. }));

        let err = PatternFieldExtractor::compile(
            "Account Number",
            &patterns(&[r"(account) (\d+)"]),
        )
        .unwrap_err();
        assert!(matches!(err, PatternError::CaptureGroups { groups: 2, .. }));

        // Non-capturing groups do not count.
        assert!(PatternFieldExtractor::compile(
            "Account Number",
            &patterns(&[r"(?:account|acct):\s*(\d+)"])
        )
        .is_ok());
    }

    #[test]
    fn test_extract_all_in_priority_order() {
        let list = patterns(&[r"ref:\s*(\w+)", r"id:\s*(\w+)", r"code:\s*(\w+)"]);
        let extractor = PatternFieldExtractor::compile("Account Number", &list).unwrap();
        let all = extractor.extract_all("id: B ref: A");
        let values: Vec<&str> = all.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["A", "B"]);
        assert_eq!(extractor.len(), 3);
    }

    #[test]
    fn test_position_points_at_capture() {
        let list = patterns(&[r"ref:\s*(\w+)"]);
        let text = "x ref: ABC";
        let field = extract_field("Account Number", text, &list).unwrap().unwrap();
        let (start, end) = field.position.unwrap();
        assert_eq!(&text[start..end], "ABC");
    }
}
