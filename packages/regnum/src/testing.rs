//! Test helpers. Compiled for this crate's own tests and, for dependents,
//! behind the `test-util` feature.
//!
//! [`SequenceCounter`] hands out increasing sequences without consulting any
//! issued numbers. It is only for building fixtures; allocation goes through
//! [`next_sequence`](crate::next_sequence).

use std::sync::atomic::{AtomicU32, Ordering};

use crate::allocator::SEQUENCE_FLOOR;
use crate::error::{RegnumError, Result};
use crate::number::RegistrationNumber;

/// Process-local monotonic sequence counter.
///
/// Usable from a `static`. Values do not survive a restart and are not shared
/// between processes. The counter never wraps: once `u32::MAX` is reached it
/// is exhausted and stays there until [`reset`](Self::reset) or
/// [`seed`](Self::seed).
#[derive(Debug)]
pub struct SequenceCounter {
    next: AtomicU32,
    seed: AtomicU32,
}

impl SequenceCounter {
    pub const fn starting_at(seed: u32) -> Self {
        Self {
            next: AtomicU32::new(seed),
            seed: AtomicU32::new(seed),
        }
    }

    /// Take the next sequence, or `None` once the counter is exhausted.
    ///
    /// `u32::MAX` itself is never handed out.
    pub fn next(&self) -> Option<u32> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .ok()
    }

    /// Take the next sequence and format it for `year`.
    ///
    /// # Errors
    ///
    /// Returns [`RegnumError::SequenceOverflow`] when the sequence does not
    /// fit the five-digit field or the counter is exhausted.
    pub fn next_number(&self, year: i32) -> Result<RegistrationNumber> {
        let sequence = self
            .next()
            .ok_or(RegnumError::SequenceOverflow { sequence: u32::MAX })?;
        RegistrationNumber::new(year, sequence)
    }

    /// Peek without advancing.
    pub fn current(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }

    /// Rewind to the most recent seed.
    pub fn reset(&self) {
        self.next
            .store(self.seed.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Replace the seed and rewind to it.
    pub fn seed(&self, value: u32) {
        self.seed.store(value, Ordering::Relaxed);
        self.next.store(value, Ordering::Relaxed);
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::starting_at(SEQUENCE_FLOOR)
    }
}
