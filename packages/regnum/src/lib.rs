//! IHU registration numbers
//!
//! Every student registration and every admin-created user is identified by a
//! registration number of the form `IHU<YY><SSSSS>`: the fixed prefix, the
//! two-digit year suffix and a five-digit sequence. This crate provides:
//! - Formatting and parsing of the fixed-width identifier
//! - Derivation of the next sequence from the numbers issued so far
//!
//! The sequence is global. It does not reset when the year rolls over; only
//! the rendered year suffix changes.
//!
//! Nothing here performs I/O or holds state. Two callers working from the same
//! snapshot of issued numbers compute the same next number, so uniqueness must
//! be enforced by whoever persists it.
//!
//! # Example
//!
//! ```
//! use ihu_regnum::{next_registration_number, parse};
//!
//! let issued = ["IHU2501176", "IHU2501177", "IHU250512001"];
//! let next = next_registration_number(2026, issued).unwrap();
//! assert_eq!(next.to_string(), "IHU2601178");
//!
//! let parsed = parse("IHU2601178").unwrap();
//! assert_eq!(parsed.sequence(), 1178);
//! assert!(parse("IHU250512001").is_none());
//! ```

pub mod allocator;
pub mod error;
pub mod number;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use allocator::{next_registration_number, next_sequence, SEQUENCE_FLOOR};
pub use error::{RegnumError, Result};
pub use number::{
    classify, format, parse, IdentifierClass, RegistrationNumber, MAX_SEQUENCE, PREFIX,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
