//! ISBN-10 / ISBN-13 codec
//!
//! Pure functions for normalizing, validating and converting the two book
//! identifier formats. Every function accepts raw (hyphenated, spaced,
//! lower-case) input and normalizes it first.
//!
//! # Examples
//!
//! ```
//! use isbn_common::isbn::{normalize, is_valid_13, to_13, to_10};
//!
//! assert_eq!(normalize("978-0-306-40615-7"), "9780306406157");
//! assert!(is_valid_13("9780306406157"));
//! assert_eq!(to_13("0306406152").as_deref(), Some("9780306406157"));
//! assert_eq!(to_10("9791234567896"), None);
//! ```

use std::fmt;

/// Bookland prefix shared by every ISBN-13 that has an ISBN-10 counterpart
pub const BOOKLAND_PREFIX: &str = "978";

/// Identifier format derived from the checksum rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// 9 digits + check digit (0-9 or X), weighted mod 11
    Isbn10,
    /// 13 digits, alternating 1/3 weights, mod 10
    Isbn13,
    /// Neither structure nor checksum matched
    Invalid,
}

impl Classification {
    /// Label used in log lines and error messages ("ISBN-10", "ISBN-13")
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Isbn10 => "ISBN-10",
            Classification::Isbn13 => "ISBN-13",
            Classification::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw identifier together with its normalized form and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// String exactly as read from the input
    pub raw: String,
    /// Upper-cased, hyphens and whitespace removed
    pub normalized: String,
    /// Checksum classification of `normalized`
    pub classification: Classification,
}

impl Identifier {
    /// Normalize and classify a raw identifier
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        let classification = classify_normalized(&normalized);
        Self {
            raw,
            normalized,
            classification,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.classification != Classification::Invalid
    }
}

/// Strip hyphens and whitespace, then upper-case.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Classify an identifier as ISBN-13, ISBN-10 or invalid.
///
/// ISBN-13 is tested first; the two formats are length-disjoint.
pub fn classify(s: &str) -> Classification {
    classify_normalized(&normalize(s))
}

fn classify_normalized(normalized: &str) -> Classification {
    if is_valid_13_normalized(normalized.as_bytes()) {
        Classification::Isbn13
    } else if is_valid_10_normalized(normalized.as_bytes()) {
        Classification::Isbn10
    } else {
        Classification::Invalid
    }
}

/// Validate an ISBN-10 (9 digits followed by a digit or `X`, mod 11 checksum)
pub fn is_valid_10(s: &str) -> bool {
    is_valid_10_normalized(normalize(s).as_bytes())
}

/// Validate an ISBN-13 (13 digits, alternating 1/3 weights, mod 10 checksum)
pub fn is_valid_13(s: &str) -> bool {
    is_valid_13_normalized(normalize(s).as_bytes())
}

/// Convert a valid ISBN-10 into its ISBN-13 form.
///
/// Returns `None` when the input is not a valid ISBN-10.
pub fn to_13(isbn10: &str) -> Option<String> {
    let normalized = normalize(isbn10);
    if !is_valid_10_normalized(normalized.as_bytes()) {
        return None;
    }

    let stem = format!("{}{}", BOOKLAND_PREFIX, &normalized[..9]);
    let check = isbn13_check_digit(stem.as_bytes());
    Some(format!("{}{}", stem, check))
}

/// Convert a valid `978`-prefixed ISBN-13 into its ISBN-10 form.
///
/// Returns `None` for invalid input and for any other prefix (e.g. `979`),
/// which has no ISBN-10 counterpart.
pub fn to_10(isbn13: &str) -> Option<String> {
    let normalized = normalize(isbn13);
    if !is_valid_13_normalized(normalized.as_bytes()) || !normalized.starts_with(BOOKLAND_PREFIX) {
        return None;
    }

    let stem = &normalized[3..12];
    let check = match isbn10_check_value(stem.as_bytes()) {
        10 => 'X',
        value => char::from(b'0' + value),
    };
    Some(format!("{}{}", stem, check))
}

fn digit(b: u8) -> u32 {
    u32::from(b - b'0')
}

fn is_valid_10_normalized(bytes: &[u8]) -> bool {
    if bytes.len() != 10 || !bytes[..9].iter().all(u8::is_ascii_digit) {
        return false;
    }

    let check = match bytes[9] {
        b'X' => 10,
        b if b.is_ascii_digit() => digit(b),
        _ => return false,
    };

    (weighted_sum_10(&bytes[..9]) + check) % 11 == 0
}

fn is_valid_13_normalized(bytes: &[u8]) -> bool {
    bytes.len() == 13
        && bytes.iter().all(u8::is_ascii_digit)
        && isbn13_check_digit(&bytes[..12]) == bytes[12] - b'0'
}

/// Sum of digit[i] * (10 - i) over a 9-digit stem
fn weighted_sum_10(stem: &[u8]) -> u32 {
    stem.iter()
        .enumerate()
        .map(|(i, b)| digit(*b) * (10 - i as u32))
        .sum()
}

/// Check value (0-10) completing a 9-digit ISBN-10 stem
fn isbn10_check_value(stem: &[u8]) -> u8 {
    ((11 - weighted_sum_10(stem) % 11) % 11) as u8
}

/// Check digit (0-9) completing a 12-digit ISBN-13 stem
fn isbn13_check_digit(stem: &[u8]) -> u8 {
    let sum: u32 = stem
        .iter()
        .enumerate()
        .map(|(i, b)| digit(*b) * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}
