//! Composable bitmask error codes and their display-name registry.
//!
//! A test's `run()` returns an [`ErrCode`]: zero means the test passed,
//! anything else is a union of independent failure bits. The universe of
//! bits is fixed at ten kinds: the passed state, five predefined failures,
//! and four runtime-allocated user slots.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Number of allocatable failure bits (predefined plus user slots).
pub const ERR_POOL_BITS: usize = 9;

/// A bitmask of concurrently-present failure kinds.
///
/// Codes combine with `|`. The zero value is the passed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrCode(u32);

impl ErrCode {
    /// The empty mask: no failure present.
    pub const PASSED: ErrCode = ErrCode(0);
    /// Result was produced but does not match the expected value.
    pub const WRONG_RESULT: ErrCode = ErrCode(1);
    /// A result that should exist was null or empty.
    pub const NULL_RESULT: ErrCode = ErrCode(1 << 1);
    /// An assignment or assertion inside the test failed.
    pub const ASSERT_FAIL: ErrCode = ErrCode(1 << 2);
    /// Any failure not covered by a more specific kind.
    pub const OTHER: ErrCode = ErrCode(1 << 3);
    /// An allocation failed. Also returned by [`ErrorRegistry::add_err`]
    /// when the user-slot pool is exhausted; see that method's docs.
    pub const ALLOCATION_FAILED: ErrCode = ErrCode(1 << 4);

    /// Raw bit representation.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// True when no failure bit is set.
    pub fn is_passed(self) -> bool {
        self.0 == 0
    }

    /// True when at least one failure bit is set.
    pub fn is_failure(self) -> bool {
        self.0 != 0
    }

    /// True when every bit of `other` is present in `self`.
    pub fn contains(self, other: ErrCode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ErrCode {
    type Output = ErrCode;

    fn bitor(self, rhs: ErrCode) -> ErrCode {
        ErrCode(self.0 | rhs.0)
    }
}

impl BitOrAssign for ErrCode {
    fn bitor_assign(&mut self, rhs: ErrCode) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ErrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display names for every defined failure bit, plus allocation of the
/// four user-definable slots.
///
/// Bit `i` of a code corresponds to `names[i]`; the predefined kinds
/// occupy the low five bits and user codes are handed out above them in
/// allocation order. Names are never removed and bits are never reused
/// within one registry's lifetime.
#[derive(Debug, Clone)]
pub struct ErrorRegistry {
    names: Vec<String>,
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorRegistry {
    /// Create a registry holding the predefined failure kinds with all
    /// four user slots free.
    pub fn new() -> Self {
        Self {
            names: vec![
                "Wrong result".to_string(),
                "Invalid null result".to_string(),
                "Assignment or assertion failed".to_string(),
                "Other error".to_string(),
                "Allocation failed".to_string(),
            ],
        }
    }

    /// Allocate the next free user bit and record `text` as its display
    /// name, returning the fresh code.
    ///
    /// When all user slots are taken this returns
    /// [`ErrCode::ALLOCATION_FAILED`] without allocating. That sentinel is
    /// itself a live failure kind, so a caller cannot distinguish pool
    /// exhaustion from a genuine allocation failure; check
    /// [`free_slots`](Self::free_slots) first when the distinction
    /// matters.
    pub fn add_err(&mut self, text: impl Into<String>) -> ErrCode {
        if self.names.len() >= ERR_POOL_BITS {
            return ErrCode::ALLOCATION_FAILED;
        }
        self.names.push(text.into());
        ErrCode(1 << (self.names.len() - 1))
    }

    /// Number of user slots still free.
    pub fn free_slots(&self) -> usize {
        ERR_POOL_BITS - self.names.len()
    }

    /// Display names of all defined bits, least-significant first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Render `code` as a human-readable message.
    ///
    /// Zero decodes to `"Passed"`. Any other value lists the names of its
    /// set bits most-significant first, each followed by a comma, then the
    /// numeric code: `"Error Wrong result, (code 1)"`. Bits outside the
    /// defined universe are ignored.
    pub fn decode(&self, code: ErrCode) -> String {
        if code.is_passed() {
            return "Passed".to_string();
        }
        let mut listed = String::new();
        for i in (0..self.names.len()).rev() {
            if code.0 & (1 << i) != 0 {
                listed.push_str(&self.names[i]);
                listed.push_str(", ");
            }
        }
        format!("Error {}(code {})", listed, code.0)
    }
}
