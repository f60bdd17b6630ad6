//! A core concept in fork/join pools is the *latch*: a signaling mechanism
//! used to indicate when some set of jobs has finished.
//!
//! The [`CountLatch`] defined here is the completion barrier of a single
//! `for_loop` or `reduce` call. It is seeded with the exact number of jobs
//! scattered by that call, and each job counts it down exactly once. It does
//! not put threads to sleep on its own; the waiting thread sleeps on the
//! pool's completion condition variable and checks the latch when woken.

use alloc::boxed::Box;
use core::any::Any;

use crate::platform::*;

/// Counts outstanding jobs of one call, and remembers what went wrong.
pub struct CountLatch {
    /// Jobs that have not yet been executed or dropped.
    remaining: AtomicUsize,
    /// Jobs that were dropped without being executed.
    discarded: AtomicUsize,
    /// The first panic raised by one of the jobs.
    panic: Mutex<Option<Box<dyn Any + Send>>>,
}

impl CountLatch {
    /// Creates a latch expecting `count` jobs.
    pub fn new(count: usize) -> CountLatch {
        CountLatch {
            remaining: AtomicUsize::new(count),
            discarded: AtomicUsize::new(0),
            panic: Mutex::new(None),
        }
    }

    /// Checks to see if every job has been accounted for.
    #[inline(always)]
    pub fn is_set(&self) -> bool {
        self.remaining.load(Ordering::Acquire) == 0
    }

    /// Marks one job as finished. `discarded` is true when the job was
    /// dropped without running.
    #[inline]
    pub fn count_down(&self, discarded: bool) {
        if discarded {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
        let previous = self.remaining.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "latch counted down more times than seeded");
    }

    /// Returns how many jobs were dropped without running.
    pub fn discarded(&self) -> usize {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Stores a panic payload. Only the first one is kept.
    pub fn record_panic(&self, payload: Box<dyn Any + Send>) {
        let mut panic = self.panic.lock().unwrap_or_else(PoisonError::into_inner);
        if panic.is_none() {
            *panic = Some(payload);
        }
    }

    /// Takes the first recorded panic payload, if any.
    pub fn take_panic(&self) -> Option<Box<dyn Any + Send>> {
        self.panic.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}
