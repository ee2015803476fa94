//! Contiguous windows over a draw history.

use std::fmt::{Display, Formatter};

/// A window of `length` results starting at `starting_idx`. Both fields are signed so that
/// windows derived by subtracting from a history length can be represented (and rejected)
/// when they fall before the start of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeOfInterest {
    pub starting_idx: isize,
    pub length: isize,
}
impl RangeOfInterest {
    pub fn new(starting_idx: isize, length: isize) -> Self {
        Self {
            starting_idx,
            length,
        }
    }

    /// The last `length` results of a history of `len` results.
    pub fn trailing(len: usize, length: usize) -> Self {
        Self::new(len as isize - length as isize, length as isize)
    }

    pub fn end_idx(&self) -> isize {
        isize::max(0, self.starting_idx + self.length - 1)
    }

    /// Whether the window lies entirely within a history of `len` results.
    pub fn is_scope_valid_for(&self, len: usize) -> bool {
        self.starting_idx >= 0 && self.end_idx() < len as isize
    }

    /// The window as a slice range. Only meaningful once [is_scope_valid_for](Self::is_scope_valid_for)
    /// holds.
    pub fn as_range(&self) -> std::ops::RangeInclusive<usize> {
        self.starting_idx as usize..=self.end_idx() as usize
    }
}

impl Display for RangeOfInterest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}", self.starting_idx, self.length)
    }
}
