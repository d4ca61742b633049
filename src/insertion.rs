use crate::error::{Result, SortError};

/// Sorts `v[lo..hi]` assuming `v[lo..start]` is already sorted.
///
/// Every element of `v[start..hi]` is placed with a binary search over the sorted prefix, after any
/// elements equal to it, so the sort is stable. This needs O(n log n) comparisons but O(n^2)
/// element moves in the worst case, use it for short ranges only.
pub fn binary_insertion_sort<T, F>(
    v: &mut [T],
    lo: usize,
    hi: usize,
    start: usize,
    is_less: &mut F,
) -> Result<()>
where
    F: FnMut(&T, &T) -> bool,
{
    if lo > start || start > hi || hi > v.len() {
        return Err(SortError::InvalidRange { lo, hi });
    }

    // A single element is always sorted.
    let start = if start == lo { start + 1 } else { start };

    for i in start..hi {
        // Invariants: v[lo..left] <= pivot, pivot < v[right..i].
        let mut left = lo;
        let mut right = i;
        while left < right {
            let mid = left + (right - left) / 2;
            if is_less(&v[i], &v[mid]) {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        // All comparisons are done before anything moves, a panicking `is_less` leaves `v` intact.
        v[left..=i].rotate_right(1);
    }

    Ok(())
}
