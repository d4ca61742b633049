use std::cmp::Ordering;
use std::fmt::Debug;

/// A stable sort under test.
///
/// Sorts may refuse to finish when the comparison function is not a strict weak order and report
/// that as an error. With a valid order they must always succeed.
pub trait Sort {
    type Error: Debug;

    fn name() -> String;

    fn sort<T>(arr: &mut [T]) -> Result<(), Self::Error>
    where
        T: Ord;

    fn sort_by<T, F>(arr: &mut [T], compare: F) -> Result<(), Self::Error>
    where
        F: FnMut(&T, &T) -> Ordering;
}

pub mod patterns;
