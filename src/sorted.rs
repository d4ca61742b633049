//! Lookups and point updates on slices that are already sorted with respect to `is_less`.
//!
//! Two elements are considered equal if neither is less than the other. `PartialOrd::lt` can be
//! passed directly for types with a natural order, e.g. `contains(&v, &3, i32::lt)`.

use crate::error::{Result, SortError};

/// Returns the index of the first element of `sorted` that is not less than `item`.
///
/// Returns `sorted.len()` if every element is less than `item`, in particular 0 for an empty
/// slice. Inserting `item` at the returned index keeps `sorted` sorted.
pub fn binary_search<T, F>(sorted: &[T], item: &T, mut is_less: F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    // Invariant: sorted[..lo] < item <= sorted[hi..].
    let mut lo = 0;
    let mut hi = sorted.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if is_less(&sorted[mid], item) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    lo
}

/// Returns the index of the leftmost element equal to `item`, if there is one.
pub fn index_of<T, F>(sorted: &[T], item: &T, mut is_less: F) -> Option<usize>
where
    F: FnMut(&T, &T) -> bool,
{
    let i = binary_search(sorted, item, &mut is_less);
    // `sorted[i]` is already known not to be less than `item`.
    match sorted.get(i) {
        Some(found) if !is_less(item, found) => Some(i),
        _ => None,
    }
}

pub fn contains<T, F>(sorted: &[T], item: &T, is_less: F) -> bool
where
    F: FnMut(&T, &T) -> bool,
{
    index_of(sorted, item, is_less).is_some()
}

/// Inserts `item` before any elements equal to it and returns its index.
///
/// Appending to the end is amortized O(1), otherwise the tail is shifted right.
pub fn insert<T, F>(sorted: &mut Vec<T>, item: T, is_less: F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let i = binary_search(sorted, &item, is_less);
    if i == sorted.len() {
        sorted.push(item);
    } else {
        sorted.insert(i, item);
    }
    i
}

/// Removes the leftmost element equal to `item` and returns it. Leaves `sorted` unchanged if there
/// is no such element.
pub fn remove<T, F>(sorted: &mut Vec<T>, item: &T, is_less: F) -> Option<T>
where
    F: FnMut(&T, &T) -> bool,
{
    let i = index_of(sorted, item, is_less)?;
    Some(sorted.remove(i))
}

/// Removes the element at `index`, shifting the tail left. The remaining elements stay sorted.
pub fn remove_at<T>(sorted: &mut Vec<T>, index: usize) -> Result<T> {
    if index >= sorted.len() {
        return Err(SortError::InvalidRange {
            lo: index,
            hi: sorted.len(),
        });
    }

    Ok(sorted.remove(index))
}
