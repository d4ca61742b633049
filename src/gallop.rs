//! Exponential search from a hint, followed by a binary search inside the bracketed range.
//!
//! Both searches pretend `run[-1]` is minus infinity and `run[run.len()]` is plus infinity. They
//! only differ in how elements equal to `key` are treated, which is what allows a merge to trim
//! both of its ends without reordering equal elements.

use crate::error::{Result, SortError};

/// Returns the smallest `k` in `0..=run.len()` with `run[k - 1] < key <= run[k]`.
///
/// `run` must be sorted and non-empty, `hint` must be in `0..run.len()`. The closer `hint` is to
/// the result, the fewer comparisons are needed.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub fn gallop_left<T, F>(key: &T, run: &[T], hint: usize, is_less: &mut F) -> Result<usize>
where
    F: FnMut(&T, &T) -> bool,
{
    let len = run.len();
    if len == 0 || hint >= len {
        return Err(SortError::InvalidRange { lo: hint, hi: len });
    }

    let mut last_ofs = 0;
    let mut ofs = 1;

    // The answer will end up in `lo..=hi`.
    let (mut lo, mut hi);
    if is_less(&run[hint], key) {
        // Gallop right until run[hint + last_ofs] < key <= run[hint + ofs].
        let max_ofs = len - hint;
        while ofs < max_ofs && is_less(&run[hint + ofs], key) {
            last_ofs = ofs;
            ofs = next_ofs(ofs, max_ofs);
        }
        ofs = ofs.min(max_ofs);

        lo = hint + last_ofs + 1;
        hi = hint + ofs;
    } else {
        // key <= run[hint]. Gallop left until run[hint - ofs] < key <= run[hint - last_ofs].
        let max_ofs = hint + 1;
        while ofs < max_ofs && !is_less(&run[hint - ofs], key) {
            last_ofs = ofs;
            ofs = next_ofs(ofs, max_ofs);
        }
        ofs = ofs.min(max_ofs);

        // hint - ofs may be -1, hence the shifted form.
        lo = hint + 1 - ofs;
        hi = hint - last_ofs;
    }

    if lo > hi || hi > len {
        return Err(SortError::InvariantViolation("gallop_left: bracket out of bounds"));
    }

    // Now run[lo - 1] < key <= run[hi], binary search for the exact spot.
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if is_less(&run[mid], key) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    Ok(hi)
}

/// Returns the smallest `k` in `0..=run.len()` with `run[k - 1] <= key < run[k]`.
///
/// Same preconditions as [`gallop_left`]. If `run` contains elements equal to `key`, the result is
/// past the rightmost of them.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub fn gallop_right<T, F>(key: &T, run: &[T], hint: usize, is_less: &mut F) -> Result<usize>
where
    F: FnMut(&T, &T) -> bool,
{
    let len = run.len();
    if len == 0 || hint >= len {
        return Err(SortError::InvalidRange { lo: hint, hi: len });
    }

    let mut last_ofs = 0;
    let mut ofs = 1;

    let (mut lo, mut hi);
    if is_less(key, &run[hint]) {
        // Gallop left until run[hint - ofs] <= key < run[hint - last_ofs].
        let max_ofs = hint + 1;
        while ofs < max_ofs && is_less(key, &run[hint - ofs]) {
            last_ofs = ofs;
            ofs = next_ofs(ofs, max_ofs);
        }
        ofs = ofs.min(max_ofs);

        lo = hint + 1 - ofs;
        hi = hint - last_ofs;
    } else {
        // run[hint] <= key. Gallop right until run[hint + last_ofs] <= key < run[hint + ofs].
        let max_ofs = len - hint;
        while ofs < max_ofs && !is_less(key, &run[hint + ofs]) {
            last_ofs = ofs;
            ofs = next_ofs(ofs, max_ofs);
        }
        ofs = ofs.min(max_ofs);

        lo = hint + last_ofs + 1;
        hi = hint + ofs;
    }

    if lo > hi || hi > len {
        return Err(SortError::InvariantViolation("gallop_right: bracket out of bounds"));
    }

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if is_less(key, &run[mid]) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    Ok(hi)
}

// 1, 3, 7, 15, ... clamped to `max_ofs` if doubling would overflow.
#[inline]
fn next_ofs(ofs: usize, max_ofs: usize) -> usize {
    ofs.checked_mul(2).map_or(max_ofs, |doubled| doubled + 1)
}
