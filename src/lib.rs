//! Stable TimSort with galloping merges, plus operations on sorted slices.
//!
//! Every comparison goes through an `is_less(a, b)` predicate that must implement a strict weak
//! order. A predicate that does not is reported as a [`SortError`] instead of a panic. Even then
//! the slice still holds every original element exactly once, as it does when `is_less` panics.

use std::cmp::Ordering;
use std::mem;

use log::warn;

pub mod error;
pub mod gallop;
pub mod insertion;
pub mod run;
pub mod set_ops;
pub mod sorted;

mod merge;
mod merge_sort;

pub use error::{Result, SortError};
pub use merge::{INITIAL_TMP_STORAGE_LEN, MIN_GALLOP};
pub use run::MIN_MERGE;

/// Sorts `v` stably in the order given by `T: Ord`.
#[inline]
pub fn sort<T>(v: &mut [T]) -> Result<()>
where
    T: Ord,
{
    stable_sort(v, |a, b| a.lt(b))
}

/// Sorts `v` stably, `a` goes before `b` if `compare(a, b)` returns `Ordering::Less`.
#[inline]
pub fn sort_by<T, F>(v: &mut [T], mut compare: F) -> Result<()>
where
    F: FnMut(&T, &T) -> Ordering,
{
    stable_sort(v, |a, b| compare(a, b) == Ordering::Less)
}

/// Sorts `v` stably by the `Ord` order of the keys `f` extracts. `f` is called twice per comparison.
#[inline]
pub fn sort_by_key<T, K, F>(v: &mut [T], mut f: F) -> Result<()>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    stable_sort(v, |a, b| f(a).lt(&f(b)))
}

/// Sorts `v` with `is_less` as the strict weak order.
///
/// Presorted and strictly descending input take O(n) comparisons, anything else O(n log n).
/// Allocates up to `v.len() / 2` elements of scratch space, short slices none at all.
#[inline]
pub fn sort_by_less<T, F>(v: &mut [T], is_less: F) -> Result<()>
where
    F: FnMut(&T, &T) -> bool,
{
    stable_sort(v, is_less)
}

////////////////////////////////////////////////////////////////////////////////
// Sorting
////////////////////////////////////////////////////////////////////////////////

#[inline]
fn stable_sort<T, F>(v: &mut [T], mut is_less: F) -> Result<()>
where
    F: FnMut(&T, &T) -> bool,
{
    if mem::size_of::<T>() == 0 {
        // Sorting has no meaningful behavior on zero-sized types. Do nothing.
        return Ok(());
    }

    merge_sort::merge_sort(v, &mut is_less).map_err(|err| {
        warn!("sort of {} elements aborted: {err}", v.len());
        err
    })
}
