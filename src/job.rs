//! This module defines an executable unit of work called a [`Job`]. Jobs are
//! what get scheduled on the thread-pool. There are two job types:
//! [`HeapJob`], which owns a `'static` closure, and [`ScopedJob`], which owns
//! a closure borrowing from the stack frame of a blocking `for_loop` or
//! `reduce` call.
//!
//! After a job is allocated, we refer to it by a [`JobRef`]. Job refs are
//! type-erased and can be sent between threads.
//!
//! Every job is either executed exactly once by exactly one thread, or
//! dropped unexecuted when the queue is cleared. It is never re-queued.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::mem;

use crate::latch::CountLatch;
use crate::unwind;

// -----------------------------------------------------------------------------
// Job

/// A job is a unit of work that may be executed by a worker thread. The
/// `execute` function consumes the job, so it can only ever run once.
pub trait Job: Send {
    /// Calling this function runs the job.
    fn execute(self: Box<Self>);
}

// -----------------------------------------------------------------------------
// JobRef

/// An owned, type-erased job, as stored in the queue.
pub struct JobRef {
    job: Box<dyn Job>,
}

impl JobRef {
    /// Type-erases a boxed job.
    #[inline(always)]
    pub fn new(job: Box<dyn Job>) -> JobRef {
        JobRef { job }
    }

    /// Executes the job, consuming the `JobRef`.
    #[inline(always)]
    pub fn execute(self) {
        self.job.execute();
    }
}

// -----------------------------------------------------------------------------
// Heap allocated work function

/// Represents a `'static` closure stored on the heap. Used to implement
/// `add_task` and the scheduling of future-bearing tasks.
pub struct HeapJob<F> {
    f: F,
}

impl<F> HeapJob<F>
where
    F: FnOnce() + Send + 'static,
{
    /// Allocates a new `HeapJob` on the heap.
    #[inline(always)]
    pub fn new(f: F) -> Box<Self> {
        Box::new(HeapJob { f })
    }

    /// Converts the heap job into a `JobRef`.
    #[inline(always)]
    pub fn into_job_ref(self: Box<Self>) -> JobRef {
        JobRef::new(self)
    }
}

impl<F> Job for HeapJob<F>
where
    F: FnOnce() + Send + 'static,
{
    #[inline(always)]
    fn execute(self: Box<Self>) {
        (self.f)();
    }
}

// -----------------------------------------------------------------------------
// Scoped work function

/// A job belonging to one blocking `for_loop` or `reduce` call. The closure
/// may borrow from the caller's stack; its lifetime is erased when the job is
/// converted into a `JobRef`.
///
/// The job counts down its call's [`CountLatch`] when it is dropped, whether
/// or not it was executed, and only after the closure (and everything it
/// borrows) is gone. A panic in the closure is recorded on the latch.
pub struct ScopedJob<'scope> {
    f: Option<Box<dyn FnOnce() + Send + 'scope>>,
    latch: Arc<CountLatch>,
}

impl<'scope> ScopedJob<'scope> {
    /// Allocates a new `ScopedJob` reporting to `latch`.
    pub fn new<F>(f: F, latch: Arc<CountLatch>) -> Box<Self>
    where
        F: FnOnce() + Send + 'scope,
    {
        Box::new(ScopedJob {
            f: Some(Box::new(f)),
            latch,
        })
    }

    /// Converts the scoped job into a `JobRef`, erasing its lifetime.
    ///
    /// # Safety
    ///
    /// The caller must not let anything borrowed by the closure go out of
    /// scope before the job's latch has been counted down, which happens
    /// when the `JobRef` is either executed or dropped.
    pub unsafe fn into_job_ref(self: Box<Self>) -> JobRef {
        let job: Box<dyn Job + 'scope> = self;
        // SAFETY: The two types differ only by the lifetime bound of the trait
        // object, which has no effect on layout. The caller ensures that the
        // borrowed data outlives the job.
        let job: Box<dyn Job + 'static> = unsafe { mem::transmute(job) };
        JobRef::new(job)
    }
}

impl Job for ScopedJob<'_> {
    fn execute(mut self: Box<Self>) {
        if let Some(f) = self.f.take() {
            if let Err(payload) = unwind::halt_unwinding(f) {
                self.latch.record_panic(payload);
            }
        }
        // The latch is counted down when `self` drops, just below.
    }
}

impl Drop for ScopedJob<'_> {
    fn drop(&mut self) {
        // Drop the closure first. If it's still here, the job never ran.
        let discarded = self.f.take().is_some();
        self.latch.count_down(discarded);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::platform::AtomicUsize;
    use crate::platform::Ordering;

    #[test]
    fn heap_job_runs_closure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let job_hits = hits.clone();
        let job_ref = HeapJob::new(move || {
            job_hits.fetch_add(1, Ordering::Relaxed);
        })
        .into_job_ref();
        job_ref.execute();
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn scoped_job_counts_down_when_executed_or_dropped() {
        let latch = Arc::new(CountLatch::new(3));
        let mut visited = [false; 2];
        {
            let (first, second) = visited.split_at_mut(1);
            let a = ScopedJob::new(|| first[0] = true, latch.clone());
            let b = ScopedJob::new(|| second[0] = true, latch.clone());
            let c = ScopedJob::new(|| panic!("scoped job panic"), latch.clone());
            a.execute();
            drop(b);
            c.execute();
        }
        assert_eq!(visited, [true, false]);
        assert!(latch.is_set());
        assert_eq!(latch.discarded(), 1);
        assert!(latch.take_panic().is_some());
    }
}
