//! Multiset operations over any number of sorted sources.
//!
//! Every source must be sorted with respect to the `is_less` passed alongside it. Sources are
//! taken as `&[S]` with `S: AsRef<[T]>`, so `&[Vec<T>]`, `&[&[T]]` and arrays of arrays all work.

use std::borrow::Cow;
use std::iter::FusedIterator;

/// K-way ascending traversal of sorted sources.
///
/// Yields every element of every source exactly once together with the index of the source it
/// came from. Among equal heads the source listed first wins, so the traversal is stable. Each step
/// compares the heads of all sources that are not yet exhausted.
pub struct MergeIter<'a, T, F> {
    // Unconsumed tail of each non-exhausted source with the source index, in source order.
    heads: Vec<(&'a [T], usize)>,
    remaining: usize,
    is_less: F,
}

impl<'a, T, F> MergeIter<'a, T, F>
where
    F: FnMut(&T, &T) -> bool,
{
    pub fn new<S>(sources: &'a [S], is_less: F) -> Self
    where
        S: AsRef<[T]>,
    {
        // Empty sources are dropped up front but keep their index slot.
        let heads: Vec<(&'a [T], usize)> = sources
            .iter()
            .enumerate()
            .map(|(i, src)| {
                let src: &'a [T] = src.as_ref();
                (src, i)
            })
            .filter(|(src, _)| !src.is_empty())
            .collect();
        let remaining = heads.iter().map(|(src, _)| src.len()).sum();

        Self {
            heads,
            remaining,
            is_less,
        }
    }
}

impl<'a, T, F> Iterator for MergeIter<'a, T, F>
where
    F: FnMut(&T, &T) -> bool,
{
    type Item = (&'a T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let mut min = 0;
        for k in 1..self.heads.len() {
            // Strict comparison, on ties the earlier source stays the minimum.
            if (self.is_less)(&self.heads[k].0[0], &self.heads[min].0[0]) {
                min = k;
            }
        }

        let (src, src_index) = self.heads.get_mut(min)?;
        let src_index = *src_index;
        let tail: &'a [T] = *src;
        let (first, rest) = tail.split_first()?;
        *src = rest;

        if rest.is_empty() {
            self.heads.remove(min);
        }
        self.remaining -= 1;

        Some((first, src_index))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, F> ExactSizeIterator for MergeIter<'a, T, F> where F: FnMut(&T, &T) -> bool {}

impl<'a, T, F> FusedIterator for MergeIter<'a, T, F> where F: FnMut(&T, &T) -> bool {}

/// Calls `callback(element, source_index)` for every element of `sources` in ascending order.
pub fn merge_iterate<T, S, F, C>(sources: &[S], is_less: F, mut callback: C)
where
    S: AsRef<[T]>,
    F: FnMut(&T, &T) -> bool,
    C: FnMut(&T, usize),
{
    for (elem, src_index) in MergeIter::new(sources, is_less) {
        callback(elem, src_index);
    }
}

/// Merges all sources into one sorted sequence, keeping duplicates.
///
/// If exactly one source is non-empty it is returned as is without copying.
pub fn union<'a, T, S, F>(sources: &'a [S], is_less: F) -> Cow<'a, [T]>
where
    T: Clone,
    S: AsRef<[T]>,
    F: FnMut(&T, &T) -> bool,
{
    let mut non_empty = sources
        .iter()
        .map(|src| -> &'a [T] { src.as_ref() })
        .filter(|src| !src.is_empty());
    if let (Some(only), None) = (non_empty.next(), non_empty.next()) {
        return Cow::Borrowed(only);
    }

    let merged = MergeIter::new(sources, is_less);
    let mut out = Vec::with_capacity(merged.len());
    out.extend(merged.map(|(elem, _)| elem.clone()));
    Cow::Owned(out)
}

/// Returns the elements of `a` that are not equal to any element of `b`, in order.
///
/// Every element of `a` equal to some element of `b` is dropped, however often it repeats.
pub fn difference<T, F>(a: &[T], b: &[T], mut is_less: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> bool,
{
    let mut out = Vec::with_capacity(a.len());
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        if is_less(&a[i], &b[j]) {
            out.push(a[i].clone());
            i += 1;
        } else if is_less(&b[j], &a[i]) {
            j += 1;
        } else {
            // Keep b[j], later elements of `a` may equal it too.
            i += 1;
        }
    }

    out.extend_from_slice(&a[i..]);
    out
}

/// Returns the elements of the shortest source that have an equal element in every other source.
///
/// Duplicates are kept as often as they occur in the shortest source. Sources are visited shortest
/// first internally, the result does not depend on their order apart from which of several
/// equally short sources provides the elements.
pub fn intersection<T, S, F>(sources: &[S], mut is_less: F) -> Vec<T>
where
    T: Clone,
    S: AsRef<[T]>,
    F: FnMut(&T, &T) -> bool,
{
    let mut seqs: Vec<&[T]> = sources.iter().map(AsRef::as_ref).collect();
    seqs.sort_by_key(|seq| seq.len());

    let Some((shortest, others)) = seqs.split_first() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    // One forward-only cursor per other source.
    let mut cursors = vec![0; others.len()];

    'elems: for elem in shortest.iter() {
        for (seq, cursor) in others.iter().zip(cursors.iter_mut()) {
            while *cursor < seq.len() && is_less(&seq[*cursor], elem) {
                *cursor += 1;
            }
            if *cursor == seq.len() {
                // Nothing left to match against.
                break 'elems;
            }
            if is_less(elem, &seq[*cursor]) {
                continue 'elems;
            }
        }
        out.push(elem.clone());
    }

    out
}
