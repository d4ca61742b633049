use crate::error::{Result, SortError};

/// Slices shorter than this are sorted with binary insertion sort alone, and natural runs shorter
/// than [`min_run_length`] are extended up to it.
pub const MIN_MERGE: usize = 32;

/// Finds the natural run starting at `v[lo]` and ending no later than `hi`, and returns its length.
///
/// A run is either non-descending (`v[lo] <= v[lo + 1] <= ...`) or strictly descending
/// (`v[lo] > v[lo + 1] > ...`). Descending runs are reversed in place so that the range
/// `v[lo..lo + run_len]` is sorted afterwards. Requiring strictness for descending runs keeps the
/// reversal stable.
pub fn count_run_and_make_ascending<T, F>(
    v: &mut [T],
    lo: usize,
    hi: usize,
    is_less: &mut F,
) -> Result<usize>
where
    F: FnMut(&T, &T) -> bool,
{
    if lo >= hi || hi > v.len() {
        return Err(SortError::InvalidRange { lo, hi });
    }

    let mut run_hi = lo + 1;
    if run_hi == hi {
        return Ok(1);
    }

    let descending = is_less(&v[run_hi], &v[lo]);
    run_hi += 1;

    if descending {
        while run_hi < hi && is_less(&v[run_hi], &v[run_hi - 1]) {
            run_hi += 1;
        }
        v[lo..run_hi].reverse();
    } else {
        while run_hi < hi && !is_less(&v[run_hi], &v[run_hi - 1]) {
            run_hi += 1;
        }
    }

    Ok(run_hi - lo)
}

/// Returns the minimum acceptable run length for a slice of length `n`.
///
/// For `n < MIN_MERGE` this is `n` itself. Otherwise the result `k` lies in
/// `MIN_MERGE / 2..=MIN_MERGE` and is chosen so that `n / k` is a power of two or close to, but
/// strictly less than, one. That keeps the final merges balanced.
pub fn min_run_length(mut n: usize) -> usize {
    // Becomes 1 if any 1 bits are shifted off.
    let mut r = 0;
    while n >= MIN_MERGE {
        r |= n & 1;
        n >>= 1;
    }
    n + r
}
