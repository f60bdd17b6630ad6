//! Domains that can be split into contiguous sub-spans.
//!
//! Every parallel primitive in this crate starts by cutting its domain into
//! sub-spans of at most `grain_size` elements with [`split`]. The sub-spans
//! are contiguous, ordered, and collectively exhaustive: concatenating them
//! reproduces the domain exactly once. The last one may be shorter than the
//! grain size, and an empty domain produces no sub-spans at all.
//!
//! The [`Splittable`] trait describes what a parallel loop needs from a
//! domain. It is implemented for:
//!
//! - [`IndexRange`] and [`core::ops::Range`] over primitive integers, whose
//!   sub-spans are themselves integer ranges;
//! - [`Range`], shared slices and shared vectors, whose sub-spans are
//!   sub-slices;
//! - [`RangeMut`], mutable slices and mutable vectors, whose sub-spans are
//!   disjoint mutable sub-slices.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::num::NonZeroUsize;
use core::ops;

use crate::error::Error;
use crate::error::Result;
use crate::parallel::fold_indexed;
use crate::parallel::fold_slice;

// -----------------------------------------------------------------------------
// Grain size

/// How many sub-spans, per thread, the default grain size aims for.
const SPANS_PER_THREAD: usize = 4;

/// Returns the grain size used when a domain doesn't specify one:
/// `max(1, ceil(len / (thread_count * 4)))`. A `thread_count` of zero is
/// treated as one.
pub fn default_grain_size(len: usize, thread_count: usize) -> NonZeroUsize {
    let buckets = thread_count.max(1).saturating_mul(SPANS_PER_THREAD);
    NonZeroUsize::new(len.div_ceil(buckets)).unwrap_or(NonZeroUsize::MIN)
}

/// Checks a user-provided grain size.
fn check_grain_size(grain_size: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(grain_size).ok_or(Error::InvalidGrainSize)
}

// -----------------------------------------------------------------------------
// Splitting

/// Splits the offsets `0..len` into contiguous sub-spans of at most
/// `grain_size` offsets each.
///
/// ```
/// # use core::num::NonZeroUsize;
/// let spans: Vec<_> = grainpool::split(7, NonZeroUsize::new(3).unwrap()).collect();
/// assert_eq!(spans, [0..3, 3..6, 6..7]);
/// ```
pub fn split(len: usize, grain_size: NonZeroUsize) -> Spans {
    Spans {
        next: 0,
        len,
        grain_size: grain_size.get(),
    }
}

/// Iterator over the sub-spans of `0..len`, returned by [`split`].
#[derive(Clone, Debug)]
pub struct Spans {
    next: usize,
    len: usize,
    grain_size: usize,
}

impl Iterator for Spans {
    type Item = ops::Range<usize>;

    fn next(&mut self) -> Option<ops::Range<usize>> {
        if self.next >= self.len {
            return None;
        }
        let low = self.next;
        let high = low.saturating_add(self.grain_size).min(self.len);
        self.next = high;
        Some(low..high)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.len - self.next.min(self.len)).div_ceil(self.grain_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Spans {}

impl FusedIterator for Spans {}

// -----------------------------------------------------------------------------
// Integer indices

/// A primitive integer type that can index an [`IndexRange`].
pub trait RangeIndex: Copy + Ord + Send + Sync + fmt::Display + 'static {
    /// Number of indices in `low..high`, or `None` if that number doesn't
    /// fit in a `usize`. Requires `low <= high`.
    fn distance(low: Self, high: Self) -> Option<usize>;

    /// The index `n` steps after `self`. The result must not overflow.
    fn offset(self, n: usize) -> Self;
}

macro_rules! impl_range_index {
    ( $( $t:ty ),* ) => {
        $(
            impl RangeIndex for $t {
                #[inline(always)]
                fn distance(low: Self, high: Self) -> Option<usize> {
                    usize::try_from(high.abs_diff(low)).ok()
                }

                #[inline(always)]
                fn offset(self, n: usize) -> Self {
                    // Arithmetic modulo the type's width; the true result is
                    // in range, so this is exact even for signed types.
                    self.wrapping_add(n as $t)
                }
            }
        )*
    };
}

impl_range_index!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

// -----------------------------------------------------------------------------
// Index ranges

/// A half-open integer domain `[first, last)` with an optional grain size.
///
/// ```
/// # use grainpool::IndexRange;
/// let range = IndexRange::with_grain_size(-5i32, 5, 4).unwrap();
/// let spans: Vec<_> = range.spans().collect();
/// assert_eq!(spans, [-5..-1, -1..3, 3..5]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRange<Idx> {
    first: Idx,
    last: Idx,
    len: usize,
    grain_size: Option<NonZeroUsize>,
}

impl<Idx: RangeIndex> IndexRange<Idx> {
    /// Creates a range using the default grain size of the pool it runs on.
    ///
    /// Fails with [`Error::MalformedRange`] if `first > last`, or with
    /// [`Error::RangeTooLarge`] if the range holds more than `usize::MAX`
    /// indices.
    pub fn new(first: Idx, last: Idx) -> Result<Self> {
        if first > last {
            return Err(Error::MalformedRange {
                first: first.to_string(),
                last: last.to_string(),
            });
        }
        let len = Idx::distance(first, last).ok_or_else(|| too_large(first, last))?;
        Ok(IndexRange {
            first,
            last,
            len,
            grain_size: None,
        })
    }

    /// Creates a range with an explicit grain size.
    ///
    /// Fails with [`Error::InvalidGrainSize`] if `grain_size` is zero, and
    /// otherwise like [`IndexRange::new`].
    pub fn with_grain_size(first: Idx, last: Idx, grain_size: usize) -> Result<Self> {
        let grain_size = check_grain_size(grain_size)?;
        let mut range = IndexRange::new(first, last)?;
        range.grain_size = Some(grain_size);
        Ok(range)
    }

    /// The first index in the range.
    pub fn first(&self) -> Idx {
        self.first
    }

    /// One past the last index in the range.
    pub fn last(&self) -> Idx {
        self.last
    }

    /// The number of indices in the range.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the range holds no indices.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The grain size given at construction, if any.
    pub fn grain_size(&self) -> Option<NonZeroUsize> {
        self.grain_size
    }

    /// Splits the range with its own grain size, or with a grain size of one
    /// if it doesn't have one.
    pub fn spans(&self) -> IndexSpans<Idx> {
        self.spans_with(self.grain_size.unwrap_or(NonZeroUsize::MIN))
    }

    /// Splits the range into sub-spans of at most `grain_size` indices.
    pub fn spans_with(&self, grain_size: NonZeroUsize) -> IndexSpans<Idx> {
        IndexSpans {
            first: self.first,
            offsets: split(self.len(), grain_size),
        }
    }
}

fn too_large<Idx: RangeIndex>(first: Idx, last: Idx) -> Error {
    Error::RangeTooLarge {
        first: first.to_string(),
        last: last.to_string(),
    }
}

/// Iterator over the sub-spans of an [`IndexRange`].
#[derive(Clone, Debug)]
pub struct IndexSpans<Idx> {
    first: Idx,
    offsets: Spans,
}

impl<Idx: RangeIndex> Iterator for IndexSpans<Idx> {
    type Item = ops::Range<Idx>;

    fn next(&mut self) -> Option<ops::Range<Idx>> {
        let offsets = self.offsets.next()?;
        Some(self.first.offset(offsets.start)..self.first.offset(offsets.end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<Idx: RangeIndex> ExactSizeIterator for IndexSpans<Idx> {}

impl<Idx: RangeIndex> FusedIterator for IndexSpans<Idx> {}

// -----------------------------------------------------------------------------
// Slice ranges

/// A shared slice with an optional grain size. Sub-spans are sub-slices.
#[derive(Debug)]
pub struct Range<'a, T> {
    slice: &'a [T],
    grain_size: Option<NonZeroUsize>,
}

impl<T> Clone for Range<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Range<'_, T> {}

impl<'a, T> Range<'a, T> {
    /// Covers the whole slice, using the default grain size of the pool it
    /// runs on.
    pub fn new(slice: &'a [T]) -> Self {
        Range {
            slice,
            grain_size: None,
        }
    }

    /// Covers the whole slice with an explicit grain size.
    ///
    /// Fails with [`Error::InvalidGrainSize`] if `grain_size` is zero.
    pub fn with_grain_size(slice: &'a [T], grain_size: usize) -> Result<Self> {
        Ok(Range {
            slice,
            grain_size: Some(check_grain_size(grain_size)?),
        })
    }

    /// Covers the elements `begin..end` of the slice.
    ///
    /// Fails with [`Error::MalformedRange`] if `begin > end` or if `end` is
    /// past the end of the slice.
    pub fn between(slice: &'a [T], begin: usize, end: usize) -> Result<Self> {
        check_bounds(begin, end, slice.len())?;
        Ok(Range::new(&slice[begin..end]))
    }

    /// Covers the elements `begin..end` of the slice with an explicit grain
    /// size.
    ///
    /// Fails with [`Error::InvalidGrainSize`] if `grain_size` is zero, and
    /// otherwise like [`Range::between`].
    pub fn between_with_grain_size(
        slice: &'a [T],
        begin: usize,
        end: usize,
        grain_size: usize,
    ) -> Result<Self> {
        let grain_size = check_grain_size(grain_size)?;
        let mut range = Range::between(slice, begin, end)?;
        range.grain_size = Some(grain_size);
        Ok(range)
    }

    /// The elements covered by the range.
    pub fn as_slice(&self) -> &'a [T] {
        self.slice
    }
}

/// A mutable slice with an optional grain size. Sub-spans are disjoint
/// mutable sub-slices, so each parallel task may write to its own elements.
#[derive(Debug)]
pub struct RangeMut<'a, T> {
    slice: &'a mut [T],
    grain_size: Option<NonZeroUsize>,
}

impl<'a, T> RangeMut<'a, T> {
    /// Covers the whole slice, using the default grain size of the pool it
    /// runs on.
    pub fn new(slice: &'a mut [T]) -> Self {
        RangeMut {
            slice,
            grain_size: None,
        }
    }

    /// Covers the whole slice with an explicit grain size.
    ///
    /// Fails with [`Error::InvalidGrainSize`] if `grain_size` is zero.
    pub fn with_grain_size(slice: &'a mut [T], grain_size: usize) -> Result<Self> {
        Ok(RangeMut {
            slice,
            grain_size: Some(check_grain_size(grain_size)?),
        })
    }

    /// Covers the elements `begin..end` of the slice.
    ///
    /// Fails with [`Error::MalformedRange`] if `begin > end` or if `end` is
    /// past the end of the slice.
    pub fn between(slice: &'a mut [T], begin: usize, end: usize) -> Result<Self> {
        check_bounds(begin, end, slice.len())?;
        Ok(RangeMut::new(&mut slice[begin..end]))
    }

    /// Covers the elements `begin..end` of the slice with an explicit grain
    /// size.
    ///
    /// Fails with [`Error::InvalidGrainSize`] if `grain_size` is zero, and
    /// otherwise like [`RangeMut::between`].
    pub fn between_with_grain_size(
        slice: &'a mut [T],
        begin: usize,
        end: usize,
        grain_size: usize,
    ) -> Result<Self> {
        let grain_size = check_grain_size(grain_size)?;
        let mut range = RangeMut::between(slice, begin, end)?;
        range.grain_size = Some(grain_size);
        Ok(range)
    }
}

fn check_bounds(begin: usize, end: usize, len: usize) -> Result<()> {
    if begin > end || end > len {
        return Err(Error::MalformedRange {
            first: begin.to_string(),
            last: end.to_string(),
        });
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Splittable

/// A domain that a parallel loop can cut into sub-spans.
///
/// The method names are prefixed so they don't shadow `len` and `split` on
/// slices and integer ranges while the trait is in scope.
pub trait Splittable: Sized {
    /// One contiguous piece of the domain, handed to one task.
    type Span: Send;

    /// The number of elements in the domain.
    fn domain_len(&self) -> usize;

    /// Returns true if the domain has no elements.
    fn is_domain_empty(&self) -> bool {
        self.domain_len() == 0
    }

    /// Fails if the domain can't be split exhaustively. Parallel loops call
    /// this before [`Splittable::into_spans`].
    fn check(&self) -> Result<()> {
        Ok(())
    }

    /// The grain size requested by the domain, if any. Domains without one
    /// are split with [`default_grain_size`].
    fn grain_size(&self) -> Option<NonZeroUsize> {
        None
    }

    /// Cuts the domain into ordered sub-spans of at most `grain_size`
    /// elements. See [`split`].
    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span>;
}

/// A domain whose elements can be folded with a binary operator.
pub trait Reducible: Splittable {
    /// The element type.
    type Item: Send;

    /// Folds one sub-span left to right with `op`, combining `UNROLL`
    /// elements per loop iteration. Returns `None` for an empty span.
    fn fold_span<const UNROLL: usize, Op>(span: Self::Span, op: &Op) -> Option<Self::Item>
    where
        Op: Fn(Self::Item, Self::Item) -> Self::Item;
}

impl<Idx: RangeIndex> Splittable for IndexRange<Idx> {
    type Span = ops::Range<Idx>;

    fn domain_len(&self) -> usize {
        self.len
    }

    fn grain_size(&self) -> Option<NonZeroUsize> {
        self.grain_size
    }

    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span> {
        self.spans_with(grain_size)
    }
}

impl<Idx: RangeIndex> Reducible for IndexRange<Idx> {
    type Item = Idx;

    fn fold_span<const UNROLL: usize, Op>(span: ops::Range<Idx>, op: &Op) -> Option<Idx>
    where
        Op: Fn(Idx, Idx) -> Idx,
    {
        fold_index_span::<UNROLL, Idx, Op>(span, op)
    }
}

/// Plain integer ranges are accepted directly. A range whose start is past
/// its end is empty, as it is for iteration. A range holding more than
/// `usize::MAX` indices fails [`Splittable::check`] with
/// [`Error::RangeTooLarge`].
impl<Idx: RangeIndex> Splittable for ops::Range<Idx> {
    type Span = ops::Range<Idx>;

    fn domain_len(&self) -> usize {
        core_range_len(self).unwrap_or(usize::MAX)
    }

    fn check(&self) -> Result<()> {
        match core_range_len(self) {
            Some(_) => Ok(()),
            None => Err(too_large(self.start, self.end)),
        }
    }

    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span> {
        IndexSpans {
            first: self.start,
            offsets: split(self.domain_len(), grain_size),
        }
    }
}

fn core_range_len<Idx: RangeIndex>(range: &ops::Range<Idx>) -> Option<usize> {
    if range.start < range.end {
        Idx::distance(range.start, range.end)
    } else {
        Some(0)
    }
}

impl<Idx: RangeIndex> Reducible for ops::Range<Idx> {
    type Item = Idx;

    fn fold_span<const UNROLL: usize, Op>(span: ops::Range<Idx>, op: &Op) -> Option<Idx>
    where
        Op: Fn(Idx, Idx) -> Idx,
    {
        fold_index_span::<UNROLL, Idx, Op>(span, op)
    }
}

fn fold_index_span<const UNROLL: usize, Idx, Op>(span: ops::Range<Idx>, op: &Op) -> Option<Idx>
where
    Idx: RangeIndex,
    Op: Fn(Idx, Idx) -> Idx,
{
    // Sub-spans are at most one grain long, so their length fits.
    let len = core_range_len(&span).unwrap_or(0);
    fold_indexed::<UNROLL, _, _, _>(len, |i| span.start.offset(i), op)
}

impl<'a, T: Sync> Splittable for Range<'a, T> {
    type Span = &'a [T];

    fn domain_len(&self) -> usize {
        self.slice.len()
    }

    fn grain_size(&self) -> Option<NonZeroUsize> {
        self.grain_size
    }

    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span> {
        self.slice.chunks(grain_size.get())
    }
}

impl<'a, T: Clone + Send + Sync> Reducible for Range<'a, T> {
    type Item = T;

    fn fold_span<const UNROLL: usize, Op>(span: &'a [T], op: &Op) -> Option<T>
    where
        Op: Fn(T, T) -> T,
    {
        fold_slice::<UNROLL, T, Op>(span, op)
    }
}

impl<'a, T: Send> Splittable for RangeMut<'a, T> {
    type Span = &'a mut [T];

    fn domain_len(&self) -> usize {
        self.slice.len()
    }

    fn grain_size(&self) -> Option<NonZeroUsize> {
        self.grain_size
    }

    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span> {
        self.slice.chunks_mut(grain_size.get())
    }
}

impl<'a, T: Sync> Splittable for &'a [T] {
    type Span = &'a [T];

    fn domain_len(&self) -> usize {
        <[T]>::len(self)
    }

    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span> {
        Range::new(self).into_spans(grain_size)
    }
}

impl<'a, T: Sync> Splittable for &'a Vec<T> {
    type Span = &'a [T];

    fn domain_len(&self) -> usize {
        Vec::len(self)
    }

    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span> {
        Range::new(self.as_slice()).into_spans(grain_size)
    }
}

impl<'a, T: Send> Splittable for &'a mut [T] {
    type Span = &'a mut [T];

    fn domain_len(&self) -> usize {
        <[T]>::len(self)
    }

    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span> {
        RangeMut::new(self).into_spans(grain_size)
    }
}

impl<'a, T: Send> Splittable for &'a mut Vec<T> {
    type Span = &'a mut [T];

    fn domain_len(&self) -> usize {
        Vec::len(self)
    }

    fn into_spans(self, grain_size: NonZeroUsize) -> impl Iterator<Item = Self::Span> {
        RangeMut::new(self.as_mut_slice()).into_spans(grain_size)
    }
}

impl<'a, T: Clone + Send + Sync> Reducible for &'a [T] {
    type Item = T;

    fn fold_span<const UNROLL: usize, Op>(span: &'a [T], op: &Op) -> Option<T>
    where
        Op: Fn(T, T) -> T,
    {
        fold_slice::<UNROLL, T, Op>(span, op)
    }
}

impl<'a, T: Clone + Send + Sync> Reducible for &'a Vec<T> {
    type Item = T;

    fn fold_span<const UNROLL: usize, Op>(span: &'a [T], op: &Op) -> Option<T>
    where
        Op: Fn(T, T) -> T,
    {
        fold_slice::<UNROLL, T, Op>(span, op)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::vec;

    fn grain(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn default_grain_sizes() {
        assert_eq!(default_grain_size(0, 4).get(), 1);
        assert_eq!(default_grain_size(1, 4).get(), 1);
        assert_eq!(default_grain_size(16, 4).get(), 1);
        assert_eq!(default_grain_size(17, 4).get(), 2);
        assert_eq!(default_grain_size(1000, 8).get(), 32);
        assert_eq!(default_grain_size(1000, 0).get(), 250);
    }

    #[test]
    fn split_is_exhaustive_and_non_overlapping() {
        for len in 0..80 {
            for grain_size in 1..(len + 3) {
                let spans: Vec<_> = split(len, grain(grain_size)).collect();
                assert_eq!(spans.len(), len.div_ceil(grain_size));
                assert_eq!(split(len, grain(grain_size)).len(), spans.len());

                let mut expected = 0;
                for span in &spans {
                    assert_eq!(span.start, expected, "gap or overlap at {expected}");
                    assert!(span.end > span.start);
                    assert!(span.len() <= grain_size);
                    expected = span.end;
                }
                assert_eq!(expected, len);

                let reassembled: Vec<usize> = spans.into_iter().flatten().collect();
                assert_eq!(reassembled, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn domain_smaller_than_grain_is_one_span() {
        let spans: Vec<_> = split(5, grain(100)).collect();
        assert_eq!(spans, [0..5]);
    }

    #[test]
    fn index_range_validation() {
        assert_eq!(
            IndexRange::new(5u32, 2),
            Err(Error::MalformedRange {
                first: "5".to_string(),
                last: "2".to_string()
            })
        );
        assert_eq!(
            IndexRange::with_grain_size(0u32, 10, 0),
            Err(Error::InvalidGrainSize)
        );
        let range = IndexRange::new(3i64, 3).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.spans().count(), 0);
    }

    #[test]
    fn signed_index_spans() {
        let range = IndexRange::with_grain_size(i8::MIN, i8::MAX, 100).unwrap();
        assert_eq!(range.len(), 255);
        let spans: Vec<_> = range.spans().collect();
        assert_eq!(spans, [-128..-28, -28..72, 72..127]);
    }

    #[test]
    fn wide_index_spans() {
        let range = IndexRange::with_grain_size(u64::MAX - 10, u64::MAX, 4).unwrap();
        let reassembled: Vec<u64> = range.spans().flatten().collect();
        assert_eq!(reassembled, (u64::MAX - 10..u64::MAX).collect::<Vec<_>>());
    }

    #[test]
    fn trait_in_scope_keeps_std_methods() {
        let span = 3..7usize;
        assert_eq!(span.len(), 4);
        assert!(!span.is_empty());
        let data = [1, 0, 2, 0, 3];
        assert_eq!(data[..].split(|&x| x == 0).count(), 3);
        assert_eq!((&data[..]).domain_len(), 5);
    }

    #[test]
    fn core_range_backwards_is_empty() {
        #[allow(clippy::reversed_empty_ranges)]
        let range = 10..3;
        assert_eq!(range.domain_len(), 0);
        assert_eq!(range.check(), Ok(()));
        assert_eq!(range.into_spans(grain(2)).count(), 0);
    }

    #[test]
    fn slice_ranges() {
        let data = [1, 2, 3, 4, 5, 6, 7];
        let range = Range::with_grain_size(&data, 3).unwrap();
        let spans: Vec<&[i32]> = range.into_spans(grain(3)).collect();
        assert_eq!(spans, [&data[0..3], &data[3..6], &data[6..7]]);

        let middle = Range::between(&data, 2, 5).unwrap();
        assert_eq!(middle.as_slice(), &[3, 4, 5]);
        assert!(Range::between(&data, 5, 2).is_err());
        assert!(Range::between(&data, 0, 8).is_err());
        assert_eq!(Range::with_grain_size(&data, 0).unwrap_err(), Error::InvalidGrainSize);

        let middle = Range::between_with_grain_size(&data, 1, 6, 2).unwrap();
        assert_eq!(middle.grain_size(), Some(grain(2)));
        let spans: Vec<&[i32]> = middle.into_spans(grain(2)).collect();
        assert_eq!(spans, [&data[1..3], &data[3..5], &data[5..6]]);
        assert!(Range::between_with_grain_size(&data, 6, 1, 2).is_err());
        assert_eq!(
            Range::between_with_grain_size(&data, 1, 6, 0).unwrap_err(),
            Error::InvalidGrainSize
        );
    }

    #[test]
    fn oversized_index_ranges_are_rejected() {
        assert_eq!(
            IndexRange::new(0u128, u128::MAX),
            Err(Error::RangeTooLarge {
                first: "0".to_string(),
                last: u128::MAX.to_string()
            })
        );
        assert!(matches!(
            IndexRange::with_grain_size(i128::MIN, 0, usize::MAX),
            Err(Error::RangeTooLarge { .. })
        ));
        assert_eq!((0u128..u128::MAX).check(), Err(too_large(0u128, u128::MAX)));

        // The widest representable domain is still covered exactly.
        let last = usize::MAX as u128 + 5;
        let range = IndexRange::with_grain_size(5u128, last, usize::MAX / 2 + 1).unwrap();
        assert_eq!(range.len(), usize::MAX);
        let spans: Vec<_> = range.spans().collect();
        assert_eq!(spans.first().map(|span| span.start), Some(5));
        assert_eq!(spans.last().map(|span| span.end), Some(last));
        assert!(spans.windows(2).all(|pair| pair[0].end == pair[1].start));
    }

    #[test]
    fn mutable_spans_are_disjoint() {
        let mut data = vec![0usize; 10];
        for (i, span) in RangeMut::new(&mut data[..]).into_spans(grain(4)).enumerate() {
            for x in span.iter_mut() {
                *x = i;
            }
        }
        assert_eq!(data, [0, 0, 0, 0, 1, 1, 1, 1, 2, 2]);

        let mut data = vec![0usize; 10];
        let range = RangeMut::between_with_grain_size(&mut data, 2, 9, 3).unwrap();
        for (i, span) in range.into_spans(grain(3)).enumerate() {
            span.fill(i + 1);
        }
        assert_eq!(data, [0, 0, 1, 1, 1, 2, 2, 2, 3, 0]);
    }
}
