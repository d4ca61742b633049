use std::ptr;
use std::slice;

use log::debug;

use crate::error::{Result, SortError};
use crate::gallop::{gallop_left, gallop_right};

/// Initial threshold for entering gallop mode.
pub const MIN_GALLOP: usize = 7;

/// Upper bound for the initial temporary storage. The buffer grows on demand.
pub const INITIAL_TMP_STORAGE_LEN: usize = 256;

/// Scratch space for the shorter of the two runs being merged.
///
/// The backing `Vec` never holds initialized elements as far as its `len` is concerned, it only
/// provides an allocation. Elements are moved in and out through raw pointers by the merge
/// routines, which guarantee that nothing is left behind when a merge returns.
pub(crate) struct TempBuffer<T> {
    storage: Vec<T>,
    array_len: usize,
}

impl<T> TempBuffer<T> {
    pub(crate) fn new(array_len: usize) -> Self {
        let initial_len = if array_len < 2 * INITIAL_TMP_STORAGE_LEN {
            array_len / 2
        } else {
            INITIAL_TMP_STORAGE_LEN
        };

        Self {
            storage: Vec::with_capacity(initial_len),
            array_len,
        }
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Makes room for at least `min_capacity` elements and returns the start of the buffer.
    ///
    /// Grows to the smallest power of two above `min_capacity`, but never past half of the slice
    /// being sorted. The capacity never shrinks within one sort.
    pub(crate) fn ensure_capacity(&mut self, min_capacity: usize) -> *mut T {
        if self.storage.capacity() < min_capacity {
            let new_len = (min_capacity + 1)
                .checked_next_power_of_two()
                .map_or(min_capacity, |pow2| pow2.min(self.array_len / 2))
                .max(min_capacity);

            debug!(
                "growing merge buffer from {} to {} elements",
                self.storage.capacity(),
                new_len
            );

            // Holds no live elements, dropping the old allocation only frees memory.
            self.storage = Vec::with_capacity(new_len);
        }

        self.storage.as_mut_ptr()
    }
}

/// Merges adjacent sorted runs, switching between one-at-a-time comparisons and galloping.
///
/// `min_gallop` adapts across all merges performed within one sort call. It drops while galloping
/// pays off and rises when it does not.
pub(crate) struct Merger<T> {
    tmp: TempBuffer<T>,
    min_gallop: usize,
}

impl<T> Merger<T> {
    pub(crate) fn new(array_len: usize) -> Self {
        Self {
            tmp: TempBuffer::new(array_len),
            min_gallop: MIN_GALLOP,
        }
    }

    #[cfg(test)]
    pub(crate) fn min_gallop(&self) -> usize {
        self.min_gallop
    }

    #[cfg(test)]
    pub(crate) fn tmp_capacity(&self) -> usize {
        self.tmp.capacity()
    }

    /// Merges `v[base1..base1 + len1]` and `v[base2..base2 + len2]` front to back.
    ///
    /// Should only be called if `len1 <= len2`, since the first run is copied into the buffer.
    /// Expects the caller (`merge_at`) to have trimmed the runs so that `v[base2]` belongs before
    /// `v[base1]` and `v[base2 + len2 - 1]` belongs before `v[base1 + len1 - 1]`.
    #[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
    pub(crate) fn merge_lo<F>(
        &mut self,
        v: &mut [T],
        base1: usize,
        mut len1: usize,
        base2: usize,
        mut len2: usize,
        is_less: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&T, &T) -> bool,
    {
        if len1 == 0 || len2 == 0 || base1 + len1 != base2 || base2 + len2 > v.len() {
            return Err(SortError::InvariantViolation(
                "merge_lo: runs must be non-empty and adjacent",
            ));
        }

        let arr_ptr = v.as_mut_ptr();
        let buf = self.tmp.ensure_capacity(len1);

        // SAFETY: The buffer has room for len1 elements and does not overlap `v`. All pointers
        // below stay inside `v[base1..base2 + len2]` or `buf[..len1]`. The bounds were checked
        // above and every advance is guarded by the len1/len2 counters.
        //
        // Throughout the merge the gap `hole.dest..hole.dest + len1` in `v` is exactly as long as
        // the unconsumed part `hole.start..hole.end` of the buffer, and `hole.dest + len1 ==
        // right`. When `hole` is dropped, on success, on error and on panic alike, the buffer
        // remainder is copied into the gap. So `v` always ends up holding every element exactly
        // once.
        unsafe {
            ptr::copy_nonoverlapping(arr_ptr.add(base1), buf, len1);

            let mut hole = MergeHole {
                start: buf,
                end: buf.add(len1),
                dest: arr_ptr.add(base1),
            };
            let mut right = arr_ptr.add(base2);

            // The first element of the second run always goes first.
            ptr::copy_nonoverlapping(right, hole.dest, 1);
            hole.dest = hole.dest.add(1);
            right = right.add(1);
            len2 -= 1;

            if len2 == 0 {
                return Ok(());
            }
            if len1 == 1 {
                ptr::copy(right, hole.dest, len2);
                hole.dest = hole.dest.add(len2);
                return Ok(());
            }

            let mut min_gallop = self.min_gallop;

            'outer: loop {
                // Number of times in a row that the first or the second run won.
                let mut count1 = 0;
                let mut count2 = 0;

                // Straightforward merge until one run starts winning consistently.
                loop {
                    if len1 <= 1 || len2 == 0 {
                        return Err(SortError::InvariantViolation("merge_lo: len1 > 1 && len2 > 0"));
                    }

                    if is_less(&*right, &*hole.start) {
                        ptr::copy_nonoverlapping(right, hole.dest, 1);
                        hole.dest = hole.dest.add(1);
                        right = right.add(1);
                        count2 += 1;
                        count1 = 0;
                        len2 -= 1;
                        if len2 == 0 {
                            break 'outer;
                        }
                    } else {
                        ptr::copy_nonoverlapping(hole.start, hole.dest, 1);
                        hole.dest = hole.dest.add(1);
                        hole.start = hole.start.add(1);
                        count1 += 1;
                        count2 = 0;
                        len1 -= 1;
                        if len1 == 1 {
                            break 'outer;
                        }
                    }

                    if (count1 | count2) >= min_gallop {
                        break;
                    }
                }

                // Gallop mode, copy whole stretches at once until neither run wins big anymore.
                loop {
                    if len1 <= 1 || len2 == 0 {
                        return Err(SortError::InvariantViolation("merge_lo: len1 > 1 && len2 > 0"));
                    }

                    let buffered = slice::from_raw_parts(hole.start, len1);
                    count1 = gallop_right(&*right, buffered, 0, is_less)?;
                    if count1 != 0 {
                        ptr::copy_nonoverlapping(hole.start, hole.dest, count1);
                        hole.dest = hole.dest.add(count1);
                        hole.start = hole.start.add(count1);
                        len1 -= count1;
                        // len1 == 0 is only possible with an invalid comparison function.
                        if len1 <= 1 {
                            break 'outer;
                        }
                    }

                    ptr::copy_nonoverlapping(right, hole.dest, 1);
                    hole.dest = hole.dest.add(1);
                    right = right.add(1);
                    len2 -= 1;
                    if len2 == 0 {
                        break 'outer;
                    }

                    let rest = slice::from_raw_parts(right, len2);
                    count2 = gallop_left(&*hole.start, rest, 0, is_less)?;
                    if count2 != 0 {
                        // Source and destination overlap once count2 exceeds the gap.
                        ptr::copy(right, hole.dest, count2);
                        hole.dest = hole.dest.add(count2);
                        right = right.add(count2);
                        len2 -= count2;
                        if len2 == 0 {
                            break 'outer;
                        }
                    }

                    ptr::copy_nonoverlapping(hole.start, hole.dest, 1);
                    hole.dest = hole.dest.add(1);
                    hole.start = hole.start.add(1);
                    len1 -= 1;
                    if len1 == 1 {
                        break 'outer;
                    }

                    min_gallop = min_gallop.saturating_sub(1);
                    if count1 < MIN_GALLOP && count2 < MIN_GALLOP {
                        break;
                    }
                }

                // Penalize leaving gallop mode.
                min_gallop += 2;
            }

            self.min_gallop = min_gallop.max(1);

            if len1 == 1 {
                if len2 == 0 {
                    return Err(SortError::InvariantViolation("merge_lo: len2 > 0"));
                }
                // The last buffered element is the largest, `hole` drops it in at the very end.
                ptr::copy(right, hole.dest, len2);
                hole.dest = hole.dest.add(len2);
            } else if len1 == 0 {
                return Err(SortError::ComparatorContractViolation);
            } else if len2 != 0 {
                return Err(SortError::InvariantViolation("merge_lo: len2 == 0"));
            }
            // Whatever is left in the buffer is copied back by `hole`.
        }

        Ok(())
    }

    /// Merges `v[base1..base1 + len1]` and `v[base2..base2 + len2]` back to front.
    ///
    /// Should only be called if `len1 >= len2`, since the second run is copied into the buffer.
    /// Same trimming expectations as [`Merger::merge_lo`].
    #[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
    pub(crate) fn merge_hi<F>(
        &mut self,
        v: &mut [T],
        base1: usize,
        mut len1: usize,
        base2: usize,
        mut len2: usize,
        is_less: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&T, &T) -> bool,
    {
        if len1 == 0 || len2 == 0 || base1 + len1 != base2 || base2 + len2 > v.len() {
            return Err(SortError::InvariantViolation(
                "merge_hi: runs must be non-empty and adjacent",
            ));
        }

        let arr_ptr = v.as_mut_ptr();
        let buf = self.tmp.ensure_capacity(len2);

        // SAFETY: Mirror image of merge_lo. `hole.dest` points one past the unconsumed part of the
        // first run, `out` one past the next free slot. The gap `hole.dest..out` is always exactly
        // as long as the unconsumed buffer part `hole.start..hole.end`, which `hole` copies back
        // when dropped.
        unsafe {
            let left_start = arr_ptr.add(base1);
            ptr::copy_nonoverlapping(arr_ptr.add(base2), buf, len2);

            let mut hole = MergeHole {
                start: buf,
                end: buf.add(len2),
                dest: arr_ptr.add(base2),
            };
            let mut out = arr_ptr.add(base2 + len2);

            // The last element of the first run always goes last.
            out = out.sub(1);
            hole.dest = hole.dest.sub(1);
            ptr::copy_nonoverlapping(hole.dest, out, 1);
            len1 -= 1;

            if len1 == 0 {
                return Ok(());
            }
            if len2 == 1 {
                out = out.sub(len1);
                hole.dest = hole.dest.sub(len1);
                ptr::copy(hole.dest, out, len1);
                return Ok(());
            }

            let mut min_gallop = self.min_gallop;

            'outer: loop {
                let mut count1 = 0;
                let mut count2 = 0;

                loop {
                    if len1 == 0 || len2 <= 1 {
                        return Err(SortError::InvariantViolation("merge_hi: len1 > 0 && len2 > 1"));
                    }

                    if is_less(&*hole.end.sub(1), &*hole.dest.sub(1)) {
                        out = out.sub(1);
                        hole.dest = hole.dest.sub(1);
                        ptr::copy_nonoverlapping(hole.dest, out, 1);
                        count1 += 1;
                        count2 = 0;
                        len1 -= 1;
                        if len1 == 0 {
                            break 'outer;
                        }
                    } else {
                        out = out.sub(1);
                        hole.end = hole.end.sub(1);
                        ptr::copy_nonoverlapping(hole.end, out, 1);
                        count2 += 1;
                        count1 = 0;
                        len2 -= 1;
                        if len2 == 1 {
                            break 'outer;
                        }
                    }

                    if (count1 | count2) >= min_gallop {
                        break;
                    }
                }

                loop {
                    if len1 == 0 || len2 <= 1 {
                        return Err(SortError::InvariantViolation("merge_hi: len1 > 0 && len2 > 1"));
                    }

                    let key = &*hole.end.sub(1);
                    let rest = slice::from_raw_parts(left_start, len1);
                    count1 = len1 - gallop_right(key, rest, len1 - 1, is_less)?;
                    if count1 != 0 {
                        out = out.sub(count1);
                        hole.dest = hole.dest.sub(count1);
                        len1 -= count1;
                        ptr::copy(hole.dest, out, count1);
                        if len1 == 0 {
                            break 'outer;
                        }
                    }

                    out = out.sub(1);
                    hole.end = hole.end.sub(1);
                    ptr::copy_nonoverlapping(hole.end, out, 1);
                    len2 -= 1;
                    if len2 == 1 {
                        break 'outer;
                    }

                    let key = &*hole.dest.sub(1);
                    let buffered = slice::from_raw_parts(hole.start, len2);
                    count2 = len2 - gallop_left(key, buffered, len2 - 1, is_less)?;
                    if count2 != 0 {
                        out = out.sub(count2);
                        hole.end = hole.end.sub(count2);
                        len2 -= count2;
                        ptr::copy_nonoverlapping(hole.end, out, count2);
                        // len2 == 0 is only possible with an invalid comparison function.
                        if len2 <= 1 {
                            break 'outer;
                        }
                    }

                    out = out.sub(1);
                    hole.dest = hole.dest.sub(1);
                    ptr::copy_nonoverlapping(hole.dest, out, 1);
                    len1 -= 1;
                    if len1 == 0 {
                        break 'outer;
                    }

                    min_gallop = min_gallop.saturating_sub(1);
                    if count1 < MIN_GALLOP && count2 < MIN_GALLOP {
                        break;
                    }
                }

                min_gallop += 2;
            }

            self.min_gallop = min_gallop.max(1);

            if len2 == 1 {
                if len1 == 0 {
                    return Err(SortError::InvariantViolation("merge_hi: len1 > 0"));
                }
                // The first buffered element is the smallest, `hole` drops it in at the very front.
                out = out.sub(len1);
                hole.dest = hole.dest.sub(len1);
                ptr::copy(hole.dest, out, len1);
            } else if len2 == 0 {
                return Err(SortError::ComparatorContractViolation);
            } else if len1 != 0 {
                return Err(SortError::InvariantViolation("merge_hi: len1 == 0"));
            }
        }

        Ok(())
    }
}

// When dropped, copies the range `start..end` into `dest..`.
struct MergeHole<T> {
    start: *mut T,
    end: *mut T,
    dest: *mut T,
}

impl<T> Drop for MergeHole<T> {
    fn drop(&mut self) {
        // SAFETY: `start..end` is the unconsumed part of the merge buffer and `dest` points to a
        // gap of the same length in the slice. The buffer and the slice never overlap.
        unsafe {
            let len = self.end.offset_from(self.start) as usize;
            ptr::copy_nonoverlapping(self.start, self.dest, len);
        }
    }
}
