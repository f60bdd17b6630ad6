//! A FIFO thread pool with grain-size based parallel loops and reductions.
//!
//! Grainpool is built from three layers. At the bottom sits a [`ThreadPool`]:
//! a resizable set of worker threads sharing one mutex-guarded FIFO queue of
//! type-erased tasks. Tasks can be fire-and-forget ([`ThreadPool::add_task`])
//! or return a [`TaskHandle`] which yields the task's result, or reports its
//! panic, when joined.
//!
//! On top of the pool sit two data-parallel primitives:
//!
//! - [`ThreadPool::for_loop`] splits a domain (an [`IndexRange`], a slice, a
//!   [`RangeMut`] over a mutable slice) into contiguous sub-spans of at most
//!   `grain_size` elements, runs one task per sub-span, and returns once all
//!   of them completed.
//! - [`ThreadPool::reduce`] folds every sub-span with an associative binary
//!   operator, then combines the partial results in sub-span order on the
//!   calling thread. [`ThreadPool::reduce_unrolled`] additionally folds a
//!   fixed number of elements per loop iteration.
//!
//! Both primitives wait on a barrier private to the call, so concurrent loops
//! on the same pool never wait on each other's work. They may also borrow
//! from the caller's stack.
//!
//! ```
//! use grainpool::{IndexRange, ThreadPool, ops};
//!
//! let pool = ThreadPool::new(4);
//! let total = pool.reduce(IndexRange::new(1u64, 1001).unwrap(), ops::sum).unwrap();
//! assert_eq!(total, 500_500);
//! ```
//!
//! For callers that don't want to manage a pool, the free functions at the
//! crate root ([`task`], [`for_loop`], [`reduce`], ...) delegate to a lazily
//! constructed process-wide pool, see [`static_thread_pool`].

#![no_std]

// -----------------------------------------------------------------------------
// Boilerplate for building without the standard library

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod blocker;
mod error;
mod job;
mod latch;
pub mod ops;
mod parallel;
mod queue;
mod range;
mod task;
mod thread_pool;
mod unwind;

// -----------------------------------------------------------------------------
// Top-level exports

pub use error::Error;
pub use error::Result;
pub use range::IndexRange;
pub use range::IndexSpans;
pub use range::Range;
pub use range::RangeIndex;
pub use range::RangeMut;
pub use range::Reducible;
pub use range::Spans;
pub use range::Splittable;
pub use range::default_grain_size;
pub use range::split;
pub use task::TaskHandle;
pub use thread_pool::ThreadCount;
pub use thread_pool::ThreadPool;
pub use thread_pool::ThreadPoolBuilder;
pub use thread_pool::for_loop;
pub use thread_pool::get_thread_count;
pub use thread_pool::reduce;
pub use thread_pool::reduce_unrolled;
pub use thread_pool::set_thread_count;
pub use thread_pool::static_thread_pool;
pub use thread_pool::task;
pub use thread_pool::task_with_future;
pub use thread_pool::wait_for_tasks;

// -----------------------------------------------------------------------------
// Platform Support

// All the threading primitives used by the pool are re-exported from this
// module, so that they are named in one place.
mod platform {
    pub use alloc::sync::Arc;
    pub use core::sync::atomic::AtomicBool;
    pub use core::sync::atomic::AtomicU32;
    pub use core::sync::atomic::AtomicUsize;
    pub use core::sync::atomic::Ordering;
    pub use std::sync::Condvar;
    pub use std::sync::Mutex;
    pub use std::sync::MutexGuard;
    pub use std::sync::PoisonError;
    pub use std::thread::Builder as ThreadBuilder;
    pub use std::thread::JoinHandle;
    pub use std::thread::available_parallelism;
}
