//! Blocking a plain thread on the completion of a future.
//!
//! A [`TaskHandle`](crate::TaskHandle) is a future, but most callers simply
//! want to park until the task's result arrives. The [`Blocker`] here is a
//! futex-backed waker that lets [`block_on`] sleep between polls instead of
//! spinning.

use core::future::Future;
use core::pin::pin;
use core::task::Context;
use core::task::Poll;
use core::task::Waker;

use alloc::task::Wake;

use crate::platform::*;

// -----------------------------------------------------------------------------
// States

/// Nobody is sleeping, and no wake-up is pending.
const IDLE: u32 = 0;

/// The owning thread is sleeping or about to go to sleep.
const WAIT: u32 = 1;

/// The waker was called at least once since the owner last slept.
const WAKE: u32 = 2;

// -----------------------------------------------------------------------------
// Blocker

/// Parks its owning thread until a waker created from it is called.
pub struct Blocker {
    state: AtomicU32,
}

impl Blocker {
    /// Creates a new blocker.
    pub fn new() -> Self {
        Self {
            state: AtomicU32::new(IDLE),
        }
    }

    /// Blocks the thread until the waker is called. Returns immediately if it
    /// was called since the last time this returned.
    #[inline]
    pub fn block(&self) {
        let state = self.state.swap(WAIT, Ordering::Acquire);
        if state != WAKE {
            atomic_wait::wait(&self.state, WAIT);
        }
        self.state.store(IDLE, Ordering::Release);
    }
}

impl Wake for Blocker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        if self.state.swap(WAKE, Ordering::Release) == WAIT {
            atomic_wait::wake_all(&self.state);
        }
    }
}

// -----------------------------------------------------------------------------
// Block on

/// Polls a future to completion on the current thread, sleeping whenever it
/// is pending.
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let blocker = Arc::new(Blocker::new());
    // Wakers may be kept (and called) by the future's executor after we
    // return, so they hold their own reference to the blocker.
    let waker = Waker::from(blocker.clone());
    let mut ctx = Context::from_waker(&waker);
    let mut future = pin!(future);
    loop {
        match future.as_mut().poll(&mut ctx) {
            Poll::Ready(output) => return output,
            Poll::Pending => blocker.block(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn ready_future() {
        assert_eq!(block_on(async { 5 }), 5);
    }

    #[test]
    fn woken_from_another_thread() {
        let schedule = |runnable: async_task::Runnable| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                runnable.run();
            });
        };
        let (runnable, task) = async_task::spawn(async { "done" }, schedule);
        runnable.schedule();
        assert_eq!(block_on(task), "done");
    }

    #[test]
    fn wake_before_block_does_not_sleep() {
        let blocker = Arc::new(Blocker::new());
        let waker = Waker::from(blocker.clone());
        waker.wake_by_ref();
        blocker.block();
    }
}
