use log::trace;

use crate::error::{Result, SortError};
use crate::gallop::{gallop_left, gallop_right};
use crate::insertion::binary_insertion_sort;
use crate::merge::Merger;
use crate::run::{count_run_and_make_ascending, min_run_length, MIN_MERGE};

/// Sorts `v` with TimSort, stable.
///
/// Short slices are handled by binary insertion sort alone without allocating. Longer ones are
/// split into natural runs extended to the minimum run length, which are then merged according to
/// the run stack invariants.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub(crate) fn merge_sort<T, F>(v: &mut [T], is_less: &mut F) -> Result<()>
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    if len < 2 {
        // These inputs are always sorted.
        return Ok(());
    }

    if len < MIN_MERGE {
        let init_run_len = count_run_and_make_ascending(v, 0, len, is_less)?;
        return binary_insertion_sort(v, 0, len, init_run_len, is_less);
    }

    let mut ts = TimSort::new(v, is_less);
    let min_run = min_run_length(len);
    trace!("sorting {len} elements, min run {min_run}");

    let mut lo = 0;
    let mut remaining = len;
    while remaining != 0 {
        let mut run_len = count_run_and_make_ascending(&mut *ts.v, lo, len, &mut *ts.is_less)?;

        // Extend short natural runs to min(min_run, remaining).
        if run_len < min_run {
            let force = min_run.min(remaining);
            binary_insertion_sort(&mut *ts.v, lo, lo + force, lo + run_len, &mut *ts.is_less)?;
            run_len = force;
        }

        ts.runs.push(TimSortRun { base: lo, len: run_len })?;
        ts.merge_collapse()?;

        lo += run_len;
        remaining -= run_len;
    }

    ts.merge_force_collapse()?;

    // Finally, exactly one run covering everything must remain.
    match ts.runs.as_slice() {
        [only] if only.base == 0 && only.len == len => Ok(()),
        _ => Err(SortError::InvariantViolation("exactly one run remains")),
    }
}

/// Internal type used by merge_sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TimSortRun {
    pub(crate) base: usize,
    pub(crate) len: usize,
}

/// Pending runs, bottom to top. Consecutive entries are always adjacent in the slice.
#[derive(Debug)]
pub(crate) struct RunStack {
    runs: Vec<TimSortRun>,
    capacity: usize,
}

impl RunStack {
    /// The capacity depends on the slice length. Once the stack invariants hold, run lengths grow
    /// at least as fast as the Fibonacci numbers from bottom to top, so these bounds cannot be
    /// exceeded.
    pub(crate) fn new(array_len: usize) -> Self {
        let capacity = if array_len < 120 {
            5
        } else if array_len < 1542 {
            10
        } else if array_len < 119_151 {
            19
        } else if array_len <= i32::MAX as usize {
            40
        } else {
            85
        };

        Self {
            runs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.runs.len()
    }

    pub(crate) fn as_slice(&self) -> &[TimSortRun] {
        &self.runs
    }

    pub(crate) fn push(&mut self, run: TimSortRun) -> Result<()> {
        if self.runs.len() == self.capacity {
            return Err(SortError::InvariantViolation("run stack overflow"));
        }
        if let Some(top) = self.runs.last() {
            if top.base + top.len != run.base {
                return Err(SortError::InvariantViolation("runs on the stack must be adjacent"));
            }
        }

        self.runs.push(run);
        Ok(())
    }

    /// Replaces `runs[i]` and `runs[i + 1]` with their union and returns both of them.
    fn combine(&mut self, i: usize) -> Result<(TimSortRun, TimSortRun)> {
        let n = self.runs.len();
        if n < 2 || !(i + 2 == n || i + 3 == n) {
            return Err(SortError::InvariantViolation("merge_at: i == n - 2 || i == n - 3"));
        }

        let left = self.runs[i];
        let right = self.runs[i + 1];
        if left.len == 0 || right.len == 0 {
            return Err(SortError::InvariantViolation("merge_at: len1 > 0 && len2 > 0"));
        }
        if left.base + left.len != right.base {
            return Err(SortError::InvariantViolation("merge_at: base1 + len1 == base2"));
        }

        self.runs[i].len = left.len + right.len;
        // Shifts the third run from the top down if there is one.
        self.runs.remove(i + 1);

        Ok((left, right))
    }

    /// Checks `A > B + C` and `B > C` for every window of three consecutive runs, where C is the
    /// upper one. Used by tests.
    #[cfg(test)]
    pub(crate) fn invariant_holds(&self) -> bool {
        let lens: Vec<usize> = self.runs.iter().map(|r| r.len).collect();
        lens.windows(2).all(|w| w[0] > w[1]) && lens.windows(3).all(|w| w[0] > w[1] + w[2])
    }
}

// Examines the top of the stack and identifies the next pair of runs to merge. `Some(i)` means
// `runs[i]` and `runs[i + 1]` must be merged next, `None` means the invariants hold.
//
// The invariants are enforced on the top four runs. Checking only the top three is not enough to
// ensure they still hold for all runs in the stack.
fn collapse(runs: &[TimSortRun]) -> Option<usize> {
    let size = runs.len();
    if size < 2 {
        return None;
    }

    let n = size - 2;
    if (n > 0 && runs[n - 1].len <= runs[n].len + runs[n + 1].len)
        || (n > 1 && runs[n - 2].len <= runs[n - 1].len + runs[n].len)
    {
        if runs[n - 1].len < runs[n + 1].len {
            Some(n - 1)
        } else {
            Some(n)
        }
    } else if runs[n].len <= runs[n + 1].len {
        Some(n)
    } else {
        None
    }
}

// Same as `collapse`, but demands a merge as long as more than one run remains.
fn force_collapse(runs: &[TimSortRun]) -> Option<usize> {
    let size = runs.len();
    if size < 2 {
        return None;
    }

    let n = size - 2;
    if n > 0 && runs[n - 1].len < runs[n + 1].len {
        Some(n - 1)
    } else {
        Some(n)
    }
}

struct TimSort<'a, T, F> {
    v: &'a mut [T],
    is_less: &'a mut F,
    runs: RunStack,
    merger: Merger<T>,
}

impl<'a, T, F> TimSort<'a, T, F>
where
    F: FnMut(&T, &T) -> bool,
{
    fn new(v: &'a mut [T], is_less: &'a mut F) -> Self {
        let len = v.len();
        Self {
            v,
            is_less,
            runs: RunStack::new(len),
            merger: Merger::new(len),
        }
    }

    fn merge_collapse(&mut self) -> Result<()> {
        while let Some(i) = collapse(self.runs.as_slice()) {
            self.merge_at(i)?;
        }
        Ok(())
    }

    fn merge_force_collapse(&mut self) -> Result<()> {
        while let Some(i) = force_collapse(self.runs.as_slice()) {
            self.merge_at(i)?;
        }
        Ok(())
    }

    // Merges the runs at stack indices i and i + 1. `i` must be the second or third run from the
    // top.
    fn merge_at(&mut self, i: usize) -> Result<()> {
        let (left, right) = self.runs.combine(i)?;
        let (mut base1, mut len1) = (left.base, left.len);
        let (base2, mut len2) = (right.base, right.len);

        // Elements of run1 that are not greater than run2[0] are already in place.
        let k = gallop_right(
            &self.v[base2],
            &self.v[base1..base1 + len1],
            0,
            &mut *self.is_less,
        )?;
        base1 += k;
        len1 -= k;
        if len1 == 0 {
            return Ok(());
        }

        // Elements of run2 that are not less than the last of run1 are already in place.
        len2 = gallop_left(
            &self.v[base1 + len1 - 1],
            &self.v[base2..base2 + len2],
            len2 - 1,
            &mut *self.is_less,
        )?;
        if len2 == 0 {
            return Ok(());
        }

        trace!(
            "merge_at({i}): [{base1}, +{len1}) with [{base2}, +{len2}), {} runs left",
            self.runs.len()
        );

        if len1 <= len2 {
            self.merger
                .merge_lo(self.v, base1, len1, base2, len2, &mut *self.is_less)
        } else {
            self.merger
                .merge_hi(self.v, base1, len1, base2, len2, &mut *self.is_less)
        }
    }
}
