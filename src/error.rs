use std::error::Error;
use std::fmt;

/// Everything that can stop a sort or a sorted slice operation.
///
/// Only [`SortError::InvalidRange`] is caused by the caller's arguments. The other two variants are
/// raised by consistency checks inside the merge machinery and can only be triggered by a
/// comparison function that is not a strict weak order. When one of them is returned the slice
/// still holds every original element exactly once, but in unspecified order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortError {
    /// A range, offset or index argument violated its documented precondition.
    InvalidRange { lo: usize, hi: usize },
    /// A structural check on the run stack, a merge or a gallop failed.
    InvariantViolation(&'static str),
    /// A merge exhausted the wrong run.
    ComparatorContractViolation,
}

impl SortError {
    /// Returns true if the error can only have been caused by an inconsistent comparison function.
    pub fn is_comparator_fault(&self) -> bool {
        !matches!(self, SortError::InvalidRange { .. })
    }
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortError::InvalidRange { lo, hi } => write!(f, "invalid range: lo={lo} hi={hi}"),
            SortError::InvariantViolation(check) => write!(f, "invariant violated: {check}"),
            SortError::ComparatorContractViolation => {
                f.write_str("comparison method violates its general contract")
            }
        }
    }
}

impl Error for SortError {}

pub type Result<T> = std::result::Result<T, SortError>;
