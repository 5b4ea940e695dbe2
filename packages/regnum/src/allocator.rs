//! Next-number derivation from the set of issued numbers
//!
//! Allocation is stateless: every call recomputes from the full set it is
//! given. Legacy identifiers are skipped, never rejected, so historical data
//! drift cannot break allocation.

use crate::error::Result;
use crate::number::{parse, RegistrationNumber};

/// The lowest sequence ever issued.
pub const SEQUENCE_FLOOR: u32 = 1177;

/// Compute the next sequence after everything in `existing`.
///
/// Only current-format numbers count, and they count regardless of their year
/// suffix. The result is never below [`SEQUENCE_FLOOR`].
pub fn next_sequence<I>(existing: I) -> u32
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    existing
        .into_iter()
        .filter_map(|id| parse(id.as_ref()))
        .map(|n| n.sequence())
        .max()
        .map_or(SEQUENCE_FLOOR, |max| max.saturating_add(1))
        .max(SEQUENCE_FLOOR)
}

/// The number to issue next in `year`.
///
/// Calling this twice with the same inputs returns the same number; the
/// caller must include the number it just issued before asking again.
///
/// # Errors
///
/// Returns [`RegnumError::SequenceOverflow`](crate::RegnumError::SequenceOverflow)
/// once the sequence space is exhausted.
pub fn next_registration_number<I>(year: i32, existing: I) -> Result<RegistrationNumber>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    RegistrationNumber::new(year, next_sequence(existing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegnumError;
    use crate::number::MAX_SEQUENCE;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_set_starts_at_floor() {
        assert_eq!(next_sequence(Vec::<String>::new()), SEQUENCE_FLOOR);
        assert_eq!(SEQUENCE_FLOOR, 1177);
    }

    #[test]
    fn test_legacy_numbers_are_ignored() {
        let existing = ["IHU25250512001", "IHU25250512002"];
        assert_eq!(next_sequence(existing), 1177);
    }

    #[test]
    fn test_continues_after_highest() {
        let next = next_registration_number(2025, ["IHU2501177"]).unwrap();
        assert_eq!(next.to_string(), "IHU2501178");
    }

    #[test]
    fn test_sequence_does_not_reset_on_new_year() {
        let existing = ["IHU2501176", "IHU2501177", "IHU2501178"];
        assert_eq!(next_sequence(existing), 1179);

        let next = next_registration_number(2026, existing).unwrap();
        assert_eq!(next.to_string(), "IHU2601179");
    }

    #[test]
    fn test_max_is_taken_across_years_and_order() {
        let existing = ["IHU2601300", "IHU2401900", "IHU2501250"];
        assert_eq!(next_sequence(existing), 1901);
    }

    #[test]
    fn test_below_floor_clamps_to_floor() {
        assert_eq!(next_sequence(["IHU2500001"]), SEQUENCE_FLOOR);
        assert_eq!(next_sequence(["IHU2400500", "IHU2501175"]), SEQUENCE_FLOOR);
        // max + 1 lands exactly on the floor
        assert_eq!(next_sequence(["IHU2501176"]), SEQUENCE_FLOOR);
    }

    #[test]
    fn test_mixed_input() {
        let existing = vec![
            "IHU2501180".to_string(),
            "IHU99999999999".to_string(),
            "garbage".to_string(),
            String::new(),
            "IHU2501179".to_string(),
        ];
        assert_eq!(next_sequence(&existing), 1181);
    }

    #[test]
    fn test_pure_with_respect_to_inputs() {
        let existing = ["IHU2501177"];
        let a = next_registration_number(2025, existing).unwrap();
        let b = next_registration_number(2025, existing).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_exhausted_sequence_overflows() {
        let result = next_registration_number(2025, ["IHU2599999"]);
        assert_eq!(
            result,
            Err(RegnumError::SequenceOverflow {
                sequence: MAX_SEQUENCE + 1
            })
        );
    }
}
