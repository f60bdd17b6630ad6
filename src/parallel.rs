//! Parallel loops and reductions.
//!
//! Both primitives cut their domain into sub-spans, scatter one job per
//! sub-span onto the pool's queue, and block until a [`CountLatch`] private to
//! the call reports that every one of those jobs has been accounted for.
//! While blocked, the calling thread pops and runs queued jobs itself, so a
//! loop makes progress even on a pool without workers.

use alloc::vec::Vec;
use core::mem;
use core::num::NonZeroUsize;

use tracing::trace;

use crate::error::Error;
use crate::error::Result;
use crate::job::ScopedJob;
use crate::latch::CountLatch;
use crate::platform::*;
use crate::range::Reducible;
use crate::range::Splittable;
use crate::range::default_grain_size;
use crate::thread_pool::Shared;
use crate::thread_pool::ThreadPool;
use crate::unwind;

// -----------------------------------------------------------------------------
// Parallel loops

impl ThreadPool {
    /// Calls `f` once for every sub-span of `domain`, in parallel, and returns
    /// once all calls have finished.
    ///
    /// The domain is split into contiguous sub-spans of at most its grain
    /// size. Domains built without a grain size use
    /// [`default_grain_size`] for the current number of workers. Sub-spans are
    /// disjoint, so `f` can safely write through a [`RangeMut`] span. No order
    /// between sub-spans is guaranteed.
    ///
    /// An empty domain returns immediately. A domain failing
    /// [`Splittable::check`] returns its error before anything runs. If `f`
    /// panics, the remaining sub-spans still run, and the first panic is
    /// resumed on the calling thread. If some sub-spans were removed by
    /// [`ThreadPool::clear_task_queue`] before they ran, returns
    /// [`Error::SpansDiscarded`].
    ///
    /// ```
    /// # use grainpool::{IndexRange, ThreadPool};
    /// # use std::sync::atomic::{AtomicU64, Ordering};
    /// let pool = ThreadPool::new(2);
    /// let total = AtomicU64::new(0);
    /// pool.for_loop(IndexRange::with_grain_size(0u64, 100, 10).unwrap(), |span| {
    ///     total.fetch_add(span.sum::<u64>(), Ordering::Relaxed);
    /// })
    /// .unwrap();
    /// assert_eq!(total.into_inner(), 4950);
    /// ```
    ///
    /// [`RangeMut`]: crate::RangeMut
    pub fn for_loop<D, F>(&self, domain: D, f: F) -> Result<()>
    where
        D: Splittable,
        F: Fn(D::Span) + Sync,
    {
        domain.check()?;
        let grain_size = self.grain_size_for(&domain);
        let f = &f;
        let jobs: Vec<_> = domain
            .into_spans(grain_size)
            .map(|span| move || f(span))
            .collect();
        self.scatter(jobs)
    }

    /// Folds every element of `domain` with the associative operator `op`.
    ///
    /// Each sub-span is folded left to right by one job, then the partial
    /// results are combined in sub-span order on the calling thread. The
    /// result therefore equals a sequential left fold for any associative
    /// `op`. Returns [`Error::EmptyRange`] for an empty domain.
    ///
    /// ```
    /// # use grainpool::{ThreadPool, ops};
    /// let pool = ThreadPool::new(3);
    /// let data = vec![4, 8, 15, 16, 23, 42];
    /// assert_eq!(pool.reduce(&data, ops::max), Ok(42));
    /// assert_eq!(pool.reduce(&data, ops::sum), Ok(108));
    /// ```
    pub fn reduce<D, Op>(&self, domain: D, op: Op) -> Result<D::Item>
    where
        D: Reducible,
        Op: Fn(D::Item, D::Item) -> D::Item + Sync,
    {
        self.reduce_unrolled::<1, D, Op>(domain, op)
    }

    /// Like [`ThreadPool::reduce`], but each job folds `UNROLL` elements per
    /// loop iteration into a local partial before merging it into its
    /// accumulator. This only changes how the fold is associated, so the
    /// result is the same for any associative `op`.
    ///
    /// `UNROLL` must be at least one; zero is rejected at compile time.
    pub fn reduce_unrolled<const UNROLL: usize, D, Op>(&self, domain: D, op: Op) -> Result<D::Item>
    where
        D: Reducible,
        Op: Fn(D::Item, D::Item) -> D::Item + Sync,
    {
        domain.check()?;
        if domain.is_domain_empty() {
            return Err(Error::EmptyRange);
        }

        let grain_size = self.grain_size_for(&domain);
        let spans: Vec<D::Span> = domain.into_spans(grain_size).collect();
        let partials: Vec<Mutex<Option<D::Item>>> =
            spans.iter().map(|_| Mutex::new(None)).collect();

        let op = &op;
        let jobs: Vec<_> = spans
            .into_iter()
            .zip(&partials)
            .map(|(span, partial)| {
                move || {
                    let folded = D::fold_span::<UNROLL, Op>(span, op);
                    *partial.lock().unwrap_or_else(PoisonError::into_inner) = folded;
                }
            })
            .collect();
        self.scatter(jobs)?;

        partials
            .into_iter()
            .filter_map(|partial| partial.into_inner().unwrap_or_else(PoisonError::into_inner))
            .reduce(op)
            .ok_or(Error::EmptyRange)
    }

    fn grain_size_for<D: Splittable>(&self, domain: &D) -> NonZeroUsize {
        domain
            .grain_size()
            .unwrap_or_else(|| default_grain_size(domain.domain_len(), self.get_thread_count()))
    }

    /// Queues every job, then blocks until all of them have been executed or
    /// discarded. The jobs may borrow from the caller's stack.
    fn scatter<'scope, F>(&self, jobs: Vec<F>) -> Result<()>
    where
        F: FnOnce() + Send + 'scope,
    {
        if jobs.is_empty() {
            return Ok(());
        }

        trace!("scattering {} sub-span job(s)", jobs.len());

        let latch = Arc::new(CountLatch::new(jobs.len()));
        let job_refs = jobs
            .into_iter()
            .map(|f| {
                let job = ScopedJob::new(f, latch.clone());
                // SAFETY: We do not return until the latch reports that every
                // job has been executed or dropped, and a job drops its
                // closure before counting down. If waiting unwinds, the abort
                // guard below ends the process before the borrows expire.
                unsafe { job.into_job_ref() }
            })
            .collect();

        let abort_guard = unwind::AbortOnDrop;
        self.shared().push_all(job_refs);
        wait_for_latch(self.shared(), &latch);
        mem::forget(abort_guard);

        if let Some(payload) = latch.take_panic() {
            unwind::resume_unwinding(payload);
        }

        match latch.discarded() {
            0 => Ok(()),
            discarded => Err(Error::SpansDiscarded { discarded }),
        }
    }
}

/// Blocks until the latch is set, running queued jobs while it waits.
///
/// Jobs count down their latch before they are marked complete, and the
/// latch is checked with the pool lock held, so the completion signal can't
/// be missed.
fn wait_for_latch(shared: &Shared, latch: &CountLatch) {
    let mut state = shared.lock();
    loop {
        if latch.is_set() {
            return;
        }

        if let Some(job_ref) = Shared::claim_job(&mut state) {
            drop(state);
            shared.execute(job_ref);
            state = shared.lock();
            continue;
        }

        state = shared.wait_for_completion(state);
    }
}

// -----------------------------------------------------------------------------
// Sequential folds

/// Folds `get(0), get(1), ..., get(len - 1)` with `op`.
///
/// After the first element, elements are taken in groups of `UNROLL`. Each
/// group is folded into a partial which is then merged into the accumulator.
/// Leftover elements are folded one at a time.
pub(crate) fn fold_indexed<const UNROLL: usize, T, G, Op>(len: usize, get: G, op: &Op) -> Option<T>
where
    G: Fn(usize) -> T,
    Op: Fn(T, T) -> T,
{
    const { assert!(UNROLL > 0, "unroll factor must be at least one") };

    if len == 0 {
        return None;
    }

    let mut acc = get(0);
    let mut index = 1;
    let unrolled_end = 1 + (len - 1) / UNROLL * UNROLL;
    while index < unrolled_end {
        let mut partial = get(index);
        for offset in 1..UNROLL {
            partial = op(partial, get(index + offset));
        }
        acc = op(acc, partial);
        index += UNROLL;
    }
    while index < len {
        acc = op(acc, get(index));
        index += 1;
    }
    Some(acc)
}

/// Folds a slice with `op`, like [`fold_indexed`].
pub(crate) fn fold_slice<const UNROLL: usize, T, Op>(span: &[T], op: &Op) -> Option<T>
where
    T: Clone,
    Op: Fn(T, T) -> T,
{
    const { assert!(UNROLL > 0, "unroll factor must be at least one") };

    let (first, rest) = span.split_first()?;
    let mut acc = first.clone();
    let mut groups = rest.chunks_exact(UNROLL);
    for group in &mut groups {
        let partial = group[1..]
            .iter()
            .fold(group[0].clone(), |partial, item| op(partial, item.clone()));
        acc = op(acc, partial);
    }
    for item in groups.remainder() {
        acc = op(acc, item.clone());
    }
    Some(acc)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ops;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;

    fn concat(a: String, b: String) -> String {
        a + &b
    }

    #[test]
    fn fold_indexed_matches_sequential_sum() {
        for len in 0..40 {
            let expected = (len > 0).then(|| (0..len).sum::<usize>());
            assert_eq!(fold_indexed::<1, _, _, _>(len, |i| i, &ops::sum), expected);
            assert_eq!(fold_indexed::<3, _, _, _>(len, |i| i, &ops::sum), expected);
            assert_eq!(fold_indexed::<8, _, _, _>(len, |i| i, &ops::sum), expected);
        }
    }

    #[test]
    fn unrolled_folds_preserve_order() {
        let words: Vec<String> = "the quick brown fox jumps over the lazy dog"
            .split(' ')
            .map(ToString::to_string)
            .collect();
        let expected = words.concat();
        for unrolled in [
            fold_slice::<1, _, _>(&words, &concat),
            fold_slice::<2, _, _>(&words, &concat),
            fold_slice::<4, _, _>(&words, &concat),
            fold_slice::<16, _, _>(&words, &concat),
        ] {
            assert_eq!(unrolled.as_deref(), Some(expected.as_str()));
        }
        let indexed = fold_indexed::<4, _, _, _>(words.len(), |i| words[i].clone(), &concat);
        assert_eq!(indexed, Some(expected));
    }

    #[test]
    fn empty_and_single_folds() {
        assert_eq!(fold_slice::<4, u8, _>(&[], &ops::max), None);
        assert_eq!(fold_slice::<4, _, _>(&[9u8], &ops::max), Some(9));
        assert_eq!(fold_slice::<2, _, _>(&vec![3, 1, 2], &ops::min), Some(1));
    }

    #[test]
    fn reduce_on_pool_without_workers() {
        let pool = ThreadPool::new(0);
        let data: Vec<u32> = (1..=100).collect();
        assert_eq!(pool.reduce(&data, ops::sum), Ok(5050));
        assert_eq!(pool.reduce_unrolled::<4, _, _>(0u32..0, ops::sum), Err(Error::EmptyRange));
    }

    #[test]
    fn for_loop_writes_disjoint_spans() {
        let pool = ThreadPool::new(2);
        let mut data = vec![0usize; 97];
        pool.for_loop(crate::RangeMut::with_grain_size(&mut data, 10).unwrap(), |span| {
            for x in span {
                *x += 1;
            }
        })
        .unwrap();
        assert!(data.iter().all(|&x| x == 1));
    }
}
