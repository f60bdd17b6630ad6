//! The caller's end of a task that produces a value.

use core::future::Future;
use core::pin::Pin;
use core::task::Context;
use core::task::Poll;

use async_task::FallibleTask;
use async_task::Task;

use crate::blocker;
use crate::error::Error;
use crate::error::Result;
use crate::unwind;

/// The outcome of the closure, as produced on the worker.
type Outcome<T> = std::thread::Result<T>;

/// A handle to a task spawned with
/// [`ThreadPool::add_task_with_future`](crate::ThreadPool::add_task_with_future).
///
/// The handle can be consumed with [`TaskHandle::get`], which blocks the
/// calling thread until the task has run, or awaited as a future. If the
/// closure panicked, the panic is caught on the worker and reported here as
/// [`Error::TaskPanicked`]. If the task was removed by
/// [`ThreadPool::clear_task_queue`](crate::ThreadPool::clear_task_queue)
/// before it ran, the handle reports [`Error::TaskDiscarded`].
///
/// Dropping the handle does not cancel the task; it still runs, and its
/// result is discarded.
#[must_use = "dropping a task handle discards the task's result"]
pub struct TaskHandle<T> {
    task: Option<FallibleTask<Outcome<T>>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(task: Task<Outcome<T>>) -> TaskHandle<T> {
        TaskHandle {
            task: Some(task.fallible()),
        }
    }

    /// Blocks the calling thread until the task has run, and returns its
    /// result.
    ///
    /// This never times out. Calling it on a task queued on a pool without
    /// any workers blocks until the pool is resized or dropped.
    pub fn get(mut self) -> Result<T> {
        match self.task.take() {
            Some(task) => settle(blocker::block_on(task)),
            None => Err(Error::TaskDiscarded),
        }
    }

    /// Returns true if the task has finished running (or was discarded), so
    /// that [`TaskHandle::get`] would not block.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(FallibleTask::is_finished)
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(task) = this.task.as_mut() else {
            return Poll::Ready(Err(Error::TaskDiscarded));
        };
        match Pin::new(task).poll(cx) {
            Poll::Ready(outcome) => {
                this.task = None;
                Poll::Ready(settle(outcome))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.detach();
        }
    }
}

/// Converts what came back from the worker into the caller's result.
fn settle<T>(outcome: Option<Outcome<T>>) -> Result<T> {
    match outcome {
        Some(Ok(value)) => Ok(value),
        Some(Err(payload)) => Err(Error::TaskPanicked {
            message: unwind::panic_message(&*payload),
        }),
        None => Err(Error::TaskDiscarded),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::string::ToString;
    use async_task::Runnable;

    #[test]
    fn settle_outcomes() {
        assert_eq!(settle(Some(Ok(3))), Ok(3));
        assert_eq!(settle::<u8>(None), Err(Error::TaskDiscarded));
        let payload = unwind::halt_unwinding::<_, u8>(|| panic!("bad task")).unwrap_err();
        assert_eq!(
            settle::<u8>(Some(Err(payload))),
            Err(Error::TaskPanicked {
                message: "bad task".to_string()
            })
        );
    }

    #[test]
    fn inline_task_handle() {
        let future = async { unwind::halt_unwinding(|| 11) };
        let (runnable, task) = async_task::spawn(future, |_: Runnable| {});
        let handle = TaskHandle::new(task);
        assert!(!handle.is_finished());
        runnable.run();
        assert!(handle.is_finished());
        assert_eq!(handle.get(), Ok(11));
    }

    #[test]
    fn dropped_runnable_is_discarded() {
        let future = async { unwind::halt_unwinding(|| 11) };
        let (runnable, task) = async_task::spawn(future, |_: Runnable| {});
        let handle = TaskHandle::new(task);
        drop(runnable);
        assert_eq!(handle.get(), Err(Error::TaskDiscarded));
    }
}
