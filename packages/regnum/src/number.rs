//! The registration number value type
//!
//! # Format
//!
//! ```text
//! IHU 25 01177
//! ^^^ ^^ ^^^^^
//!  |   |   `-- sequence, zero-padded to 5 digits
//!  |   `------ year suffix, (year mod 100) zero-padded to 2 digits
//!  `---------- fixed prefix
//! ```
//!
//! A canonical number is always 10 characters long. Older records carry
//! identifiers that share the prefix but not this layout (e.g. `IHU25250512001`);
//! those are "legacy" and are never parsed into a [`RegistrationNumber`].
//!
//! # Examples
//!
//! ```
//! use ihu_regnum::number::{classify, format, parse, IdentifierClass};
//!
//! assert_eq!(format(2025, 1177).unwrap(), "IHU2501177");
//!
//! let number = parse("IHU2501177").unwrap();
//! assert_eq!(number.year_suffix(), 25);
//! assert_eq!(number.sequence(), 1177);
//!
//! assert_eq!(classify("IHU25250512001"), IdentifierClass::Legacy);
//! assert_eq!(classify("STU-0001"), IdentifierClass::Foreign);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RegnumError, Result};

/// Literal prefix of every registration number.
pub const PREFIX: &str = "IHU";

/// Largest sequence that fits the five-digit field.
pub const MAX_SEQUENCE: u32 = 99_999;

const YEAR_DIGITS: usize = 2;
const SEQUENCE_DIGITS: usize = 5;

/// Length of the canonical textual form.
pub const CANONICAL_LEN: usize = PREFIX.len() + YEAR_DIGITS + SEQUENCE_DIGITS;

/// A current-format registration number.
///
/// Construct with [`RegistrationNumber::new`] (or [`format`]) to allocate, or
/// with [`parse`] / [`str::parse`] to read an existing identifier. The value
/// serializes as its canonical string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistrationNumber {
    year_suffix: u8,
    sequence: u32,
}

impl RegistrationNumber {
    /// Build the number for `sequence` in calendar `year`.
    ///
    /// # Errors
    ///
    /// Returns [`RegnumError::SequenceOverflow`] if `sequence` exceeds
    /// [`MAX_SEQUENCE`]; the five-digit field is never widened.
    pub fn new(year: i32, sequence: u32) -> Result<Self> {
        if sequence > MAX_SEQUENCE {
            return Err(RegnumError::SequenceOverflow { sequence });
        }
        // rem_euclid keeps the suffix in 0..100 for any i32
        let year_suffix = year.rem_euclid(100) as u8;
        Ok(Self {
            year_suffix,
            sequence,
        })
    }

    /// Two-digit year suffix (`0..=99`).
    pub fn year_suffix(&self) -> u8 {
        self.year_suffix
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for RegistrationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{:0yw$}{:0sw$}",
            self.year_suffix,
            self.sequence,
            yw = YEAR_DIGITS,
            sw = SEQUENCE_DIGITS
        )
    }
}

impl FromStr for RegistrationNumber {
    type Err = RegnumError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s).ok_or_else(|| RegnumError::NotCurrentFormat(s.to_string()))
    }
}

impl TryFrom<String> for RegistrationNumber {
    type Error = RegnumError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RegistrationNumber> for String {
    fn from(number: RegistrationNumber) -> Self {
        number.to_string()
    }
}

/// Format `sequence` for `year` as a canonical string.
///
/// # Errors
///
/// Returns [`RegnumError::SequenceOverflow`] when `sequence > MAX_SEQUENCE`.
pub fn format(year: i32, sequence: u32) -> Result<String> {
    RegistrationNumber::new(year, sequence).map(|n| n.to_string())
}

/// Parse a current-format identifier.
///
/// Returns `None` for anything else: a missing prefix, a tail that is not
/// exactly seven characters, or a tail containing non-digits. Never panics.
pub fn parse(identifier: &str) -> Option<RegistrationNumber> {
    let rest = identifier.strip_prefix(PREFIX)?;
    if rest.len() != YEAR_DIGITS + SEQUENCE_DIGITS || !rest.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    // All bytes are ASCII digits, so byte indices are char boundaries.
    let (year, sequence) = rest.split_at(YEAR_DIGITS);
    Some(RegistrationNumber {
        year_suffix: year.parse().ok()?,
        sequence: sequence.parse().ok()?,
    })
}

/// How an identifier relates to the numbering series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierClass {
    /// Current fixed-width format
    Current(RegistrationNumber),
    /// Carries the prefix but not the current layout
    Legacy,
    /// Not part of the series at all
    Foreign,
}

pub fn classify(identifier: &str) -> IdentifierClass {
    match parse(identifier) {
        Some(number) => IdentifierClass::Current(number),
        None if identifier.starts_with(PREFIX) => IdentifierClass::Legacy,
        None => IdentifierClass::Foreign,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    mod format_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_format_pads_both_fields() {
            assert_eq!(format(2025, 1177).unwrap(), "IHU2501177");
            assert_eq!(format(2009, 7).unwrap(), "IHU0900007");
            assert_eq!(format(2100, 0).unwrap(), "IHU0000000");
        }

        #[test]
        fn test_format_is_always_canonical_length() {
            for year in [1999, 2000, 2025, 2026, 2099, 2100] {
                for seq in [0, 1, 9, 10, 1177, 12_345, MAX_SEQUENCE] {
                    let s = format(year, seq).unwrap();
                    assert_eq!(s.len(), CANONICAL_LEN, "{s}");
                    assert!(s.starts_with(PREFIX));
                }
            }
        }

        #[test]
        fn test_format_negative_year_suffix_stays_in_range() {
            let number = RegistrationNumber::new(-1, 5).unwrap();
            assert_eq!(number.year_suffix(), 99);
            assert_eq!(number.to_string(), "IHU9900005");
        }

        #[test]
        fn test_format_rejects_overflow() {
            assert_eq!(
                format(2025, MAX_SEQUENCE + 1),
                Err(RegnumError::SequenceOverflow { sequence: 100_000 })
            );
            assert!(RegistrationNumber::new(2025, u32::MAX).is_err());
        }
    }

    mod parse_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_parse_current_format() {
            let number = parse("IHU2501177").unwrap();
            assert_eq!(number.year_suffix(), 25);
            assert_eq!(number.sequence(), 1177);
        }

        #[test]
        fn test_parse_inverts_format() {
            for year in [2000, 2025, 2026, 2099] {
                for seq in [0, 42, 1177, 99_999] {
                    let parsed = parse(&format(year, seq).unwrap()).unwrap();
                    assert_eq!(parsed.sequence(), seq);
                    assert_eq!(
                        std::format!("{:02}", parsed.year_suffix()),
                        std::format!("{:02}", year % 100)
                    );
                }
            }
        }

        #[test]
        fn test_parse_rejects_legacy_tails() {
            assert_eq!(parse("IHU25250512001"), None);
            assert_eq!(parse("IHU25250512002"), None);
            assert_eq!(parse("IHU250117"), None);
            assert_eq!(parse("IHU25011770"), None);
        }

        #[test]
        fn test_parse_rejects_garbage() {
            for input in [
                "",
                "IHU",
                "ihu2501177",
                "XYZ2501177",
                "IHU25O1177",
                "IHU+501177",
                "IHU 501177",
                " IHU2501177",
                "IHU2501177 ",
                "IHU25０1177",
                "IHUéé01177",
            ] {
                assert_eq!(parse(input), None, "{input:?}");
            }
        }

        #[test]
        fn test_from_str() {
            let number: RegistrationNumber = "IHU2601179".parse().unwrap();
            assert_eq!(number.sequence(), 1179);

            let err = "IHU2601".parse::<RegistrationNumber>().unwrap_err();
            assert_eq!(err, RegnumError::NotCurrentFormat("IHU2601".to_string()));
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("IHU2501177"),
            IdentifierClass::Current(RegistrationNumber::new(2025, 1177).unwrap())
        );
        assert_eq!(classify("IHU25250512001"), IdentifierClass::Legacy);
        assert_eq!(classify("IHU"), IdentifierClass::Legacy);
        assert_eq!(classify("REG-2025-001"), IdentifierClass::Foreign);
        assert_eq!(classify(""), IdentifierClass::Foreign);
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let number = RegistrationNumber::new(2026, 1179).unwrap();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"IHU2601179\"");

        let back: RegistrationNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, number);

        assert!(serde_json::from_str::<RegistrationNumber>("\"IHU25250512001\"").is_err());
    }
}
