//! Fixed regex patterns for auxiliary statement fields.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Email pattern
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).expect("valid email regex");

    // Phone pattern (NANP, separators required between groups)
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+?1[\s.-]?)?(?:\(\d{3}\)\s?|\b\d{3}[\s.-])\d{3}[\s.-]\d{4}\b"
    ).expect("valid phone regex");

    // Dates: MM/DD/YYYY, YYYY-MM-DD or "January 5, 2024"
    pub static ref DATE: Regex = Regex::new(
        r"\b(?:\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})|\d{4}-\d{2}-\d{2}|(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})\b"
    ).expect("valid date regex");

    // Dollar amounts: $1,234.56
    pub static ref AMOUNT: Regex = Regex::new(
        r"-?\$\s?\d{1,3}(?:,\d{3})*\.\d{2}\b"
    ).expect("valid amount regex");

    // US ZIP or ZIP+4
    pub static ref ZIP: Regex = Regex::new(
        r"\b\d{5}(?:-\d{4})?\b"
    ).expect("valid zip regex");
}
