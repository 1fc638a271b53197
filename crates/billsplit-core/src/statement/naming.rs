//! Output file and archive naming.
//!
//! File names have the shape `{account}_{name}_{label}.pdf`, with the label
//! segment omitted when no month/year label is given. Every segment is
//! sanitized so the result is a legal file name on Windows, macOS and Linux.

use chrono::Month;

/// Archive name used when the account prefix or label is unavailable.
pub const DEFAULT_ARCHIVE_NAME: &str = "statements.zip";

/// Substitute for a missing account number or customer name.
pub const UNKNOWN_PLACEHOLDER: &str = "Unknown";

/// Characters that are illegal in file names on at least one platform.
const ILLEGAL_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Length of the account prefix used in archive names.
const ARCHIVE_PREFIX_LEN: usize = 7;

/// Maximum byte length of one file name segment. Three segments plus
/// separators and the extension stay under the common 255-byte limit.
pub const MAX_SEGMENT_LEN: usize = 80;

/// Make a string safe to use as part of a file name.
///
/// Removes illegal characters, control characters and whitespace, then trims
/// leading and trailing dots. Applying it twice gives the same result.
pub fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control() && !c.is_whitespace())
        .collect();
    cleaned.trim_matches('.').to_string()
}

/// Cut a sanitized segment to at most [`MAX_SEGMENT_LEN`] bytes on a char
/// boundary.
fn truncate_segment(mut value: String) -> String {
    if value.len() > MAX_SEGMENT_LEN {
        let mut end = MAX_SEGMENT_LEN;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        value.truncate(end);
        value = value.trim_end_matches('.').to_string();
    }
    value
}

/// Normalize a month/year label.
///
/// Tokens are split on `-`, `/`, `_`, `.`, `,` and whitespace and joined
/// with `-`. A month name or abbreviation becomes its three-letter form;
/// otherwise the first one- or two-digit token between 1 and 12 is taken as
/// the month. Returns `None` for an empty label.
///
/// `"01-2024"` → `"Jan-2024"`, `"2024/3"` → `"2024-Mar"`,
/// `"september 2024"` → `"Sep-2024"`.
pub fn normalize_month_year(label: &str) -> Option<String> {
    let mut tokens: Vec<String> = label
        .split(|c: char| matches!(c, '-' | '/' | '_' | '.' | ',') || c.is_whitespace())
        .map(sanitize_component)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return None;
    }

    let named = tokens
        .iter()
        .position(|t| month_from_name(t).is_some());

    match named {
        Some(i) => {
            if let Some(month) = month_from_name(&tokens[i]) {
                tokens[i] = month_abbreviation(month);
            }
        }
        None => {
            let numeric = tokens.iter().position(|t| {
                t.len() <= 2 && t.parse::<u8>().is_ok_and(|n| (1..=12).contains(&n))
            });
            if let Some(i) = numeric {
                if let Some(month) = tokens[i].parse::<u8>().ok().and_then(|n| Month::try_from(n).ok()) {
                    tokens[i] = month_abbreviation(month);
                }
            }
        }
    }

    Some(tokens.join("-"))
}

fn month_from_name(token: &str) -> Option<Month> {
    let lower = token.to_ascii_lowercase();
    if lower.len() < 3 || !lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if lower == "sept" {
        return Some(Month::September);
    }
    (1..=12u8)
        .filter_map(|n| Month::try_from(n).ok())
        .find(|m| m.name().to_ascii_lowercase().starts_with(&lower))
}

fn month_abbreviation(month: Month) -> String {
    month.name()[..3].to_string()
}

/// Builds per-page file names.
#[derive(Debug, Clone)]
pub struct OutputNamer {
    placeholder: String,
}

impl OutputNamer {
    /// Namer using [`UNKNOWN_PLACEHOLDER`] for missing values.
    pub fn new() -> Self {
        Self {
            placeholder: UNKNOWN_PLACEHOLDER.to_string(),
        }
    }

    /// Use a different placeholder for missing values.
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        let sanitized = truncate_segment(sanitize_component(placeholder));
        if !sanitized.is_empty() {
            self.placeholder = sanitized;
        }
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Build `{account}_{name}[_{label}].pdf`.
    ///
    /// A missing or fully-illegal account number or name becomes the
    /// placeholder.
    pub fn file_name(
        &self,
        account_number: Option<&str>,
        customer_name: Option<&str>,
        month_year: Option<&str>,
    ) -> String {
        let account = self.segment(account_number);
        let name = self.segment(customer_name);

        match month_year.and_then(normalize_month_year).map(truncate_segment) {
            Some(label) => format!("{}_{}_{}.pdf", account, name, label),
            None => format!("{}_{}.pdf", account, name),
        }
    }

    fn segment(&self, value: Option<&str>) -> String {
        value
            .map(|v| truncate_segment(sanitize_component(v)))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.placeholder.clone())
    }
}

impl Default for OutputNamer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a per-page file name with the default placeholder.
pub fn build_file_name(
    account_number: Option<&str>,
    customer_name: Option<&str>,
    month_year: Option<&str>,
) -> String {
    OutputNamer::new().file_name(account_number, customer_name, month_year)
}

/// Build the archive name `{PREFIX}_{label}.zip` from the first seven
/// characters of the account number (uppercased) and the normalized label.
///
/// Falls back to [`DEFAULT_ARCHIVE_NAME`] when either part is missing.
pub fn build_archive_name(account_number: Option<&str>, month_year: Option<&str>) -> String {
    let prefix: Option<String> = account_number
        .map(sanitize_component)
        .map(|s| s.chars().take(ARCHIVE_PREFIX_LEN).collect::<String>().to_uppercase())
        .filter(|s| !s.is_empty());
    let label = month_year.and_then(normalize_month_year);

    match (prefix, label) {
        (Some(prefix), Some(label)) => format!("{}_{}.zip", prefix, label),
        _ => DEFAULT_ARCHIVE_NAME.to_string(),
    }
}
