//! Error types for registration numbers

use thiserror::Error;

use crate::number::MAX_SEQUENCE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegnumError {
    /// The sequence no longer fits the five-digit field
    #[error("sequence {sequence} exceeds the maximum of {max}", max = MAX_SEQUENCE)]
    SequenceOverflow { sequence: u32 },

    /// Returned by `FromStr`; `parse` reports the same condition as `None`
    #[error("not a current-format registration number: '{0}'")]
    NotCurrentFormat(String),
}

pub type Result<T> = std::result::Result<T, RegnumError>;
