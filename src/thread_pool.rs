//! This module contains the api and worker logic for the thread pool.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::String;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::Any;
use core::cmp;
use core::fmt;
use core::mem;
use core::num::NonZero;
use core::time::Duration;
use std::sync::LazyLock;
use std::thread;

use async_task::Runnable;
use tracing::debug;
use tracing::error;
use tracing::trace;
use tracing::trace_span;
use tracing::warn;

use crate::error::Result;
use crate::job::HeapJob;
use crate::job::JobRef;
use crate::platform::*;
use crate::queue::JobQueue;
use crate::range::Reducible;
use crate::range::Splittable;
use crate::task::TaskHandle;
use crate::unwind;

/// Signature of the hook called with the payload of a panicking
/// fire-and-forget task.
type PanicHandler = dyn Fn(Box<dyn Any + Send>) + Send + Sync;

// -----------------------------------------------------------------------------
// Configuration

/// How many worker threads a pool starts with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThreadCount {
    /// Spawn the number of threads returned by
    /// [`std::thread::available_parallelism()`], or one thread if that number
    /// is unavailable.
    #[default]
    AvailableParallelism,
    /// Spawn the given number of threads. Zero is allowed, but such a pool
    /// only runs tasks once it is resized, dropped, or helped by a blocking
    /// [`ThreadPool::for_loop`] or [`ThreadPool::reduce`] call.
    Count(usize),
}

impl ThreadCount {
    /// Resolves the thread count to a number.
    pub fn get(self) -> usize {
        match self {
            ThreadCount::AvailableParallelism => {
                available_parallelism().map(NonZero::get).unwrap_or(1)
            }
            ThreadCount::Count(count) => count,
        }
    }
}

impl From<usize> for ThreadCount {
    fn from(count: usize) -> Self {
        ThreadCount::Count(count)
    }
}

/// Configures and spawns a [`ThreadPool`].
///
/// ```
/// # use grainpool::{ThreadCount, ThreadPoolBuilder};
/// let pool = ThreadPoolBuilder::new()
///     .thread_count(ThreadCount::Count(2))
///     .thread_name("compute")
///     .panic_handler(|_payload| eprintln!("a task panicked"))
///     .build();
/// assert_eq!(pool.get_thread_count(), 2);
/// ```
#[derive(Default)]
pub struct ThreadPoolBuilder {
    thread_count: ThreadCount,
    thread_name: Option<String>,
    panic_handler: Option<Box<PanicHandler>>,
}

impl ThreadPoolBuilder {
    /// Creates a builder with the default settings: one thread per available
    /// core, and no panic handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial number of worker threads.
    pub fn thread_count(mut self, thread_count: impl Into<ThreadCount>) -> Self {
        self.thread_count = thread_count.into();
        self
    }

    /// Sets the prefix used to name worker threads. Workers are named
    /// `"{prefix} {index}"`.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = Some(prefix.into());
        self
    }

    /// Sets a hook called with the payload of every panicking
    /// fire-and-forget task. The panic is logged either way.
    pub fn panic_handler<H>(mut self, handler: H) -> Self
    where
        H: Fn(Box<dyn Any + Send>) + Send + Sync + 'static,
    {
        self.panic_handler = Some(Box::new(handler));
        self
    }

    /// Spawns the pool.
    pub fn build(self) -> ThreadPool {
        let thread_count = self.thread_count.get();
        debug!("building thread pool with {} thread(s)", thread_count);
        if thread_count == 0 {
            warn!("thread pool built without workers; queued tasks wait for a resize");
        }

        let thread_pool = ThreadPool {
            shared: Arc::new(Shared {
                state: Mutex::new(ThreadPoolState {
                    queue: JobQueue::new(),
                    in_flight: 0,
                    paused: false,
                    shutdown: false,
                }),
                job_is_ready: Condvar::new(),
                job_completed: Condvar::new(),
                panic_handler: self.panic_handler,
            }),
            managed_threads: Mutex::new(ManagedThreads {
                workers: Vec::new(),
                next_index: 0,
            }),
            thread_count: AtomicUsize::new(0),
            thread_name: self
                .thread_name
                .unwrap_or_else(|| "grainpool worker".to_string()),
        };
        thread_pool.set_thread_count(thread_count);
        thread_pool
    }
}

impl fmt::Debug for ThreadPoolBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPoolBuilder")
            .field("thread_count", &self.thread_count)
            .field("thread_name", &self.thread_name)
            .field("panic_handler", &self.panic_handler.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Thread pool types

/// The `ThreadPool` object owns a set of worker threads and a FIFO queue of
/// tasks which the workers execute.
///
/// # Submitting work
///
/// [`ThreadPool::add_task`] queues a fire-and-forget closure;
/// [`ThreadPool::add_task_with_future`] queues a closure and returns a
/// [`TaskHandle`] for its result. Tasks are dequeued in the order they were
/// added. [`ThreadPool::wait_for_tasks`] blocks until every task has run.
///
/// The data-parallel primitives [`ThreadPool::for_loop`] and
/// [`ThreadPool::reduce`] are built on the same queue.
///
/// # Resizing
///
/// Pools can be resized at any time with [`ThreadPool::set_thread_count`],
/// [`ThreadPool::grow`] or [`ThreadPool::shrink`]. Resizing never loses
/// queued work, and never interrupts a running task: workers told to stop do
/// so the next time they look for a task.
///
/// # Shutdown
///
/// Dropping the pool unpauses it, runs every task still in the queue, and
/// joins all worker threads.
pub struct ThreadPool {
    shared: Arc<Shared>,
    managed_threads: Mutex<ManagedThreads>,
    thread_count: AtomicUsize,
    thread_name: String,
}

/// The part of the pool shared with the worker threads.
pub(crate) struct Shared {
    state: Mutex<ThreadPoolState>,
    /// Signaled when a job is queued, the pool is unpaused, or workers must
    /// re-check their halt flags.
    job_is_ready: Condvar,
    /// Signaled when a job completes or is discarded, and when the pool is
    /// paused or unpaused.
    job_completed: Condvar,
    panic_handler: Option<Box<PanicHandler>>,
}

pub(crate) struct ThreadPoolState {
    queue: JobQueue,
    /// Jobs queued or running.
    in_flight: usize,
    paused: bool,
    shutdown: bool,
}

impl ThreadPoolState {
    /// Jobs `wait_for_tasks` waits on. While paused, queued jobs will not
    /// start, so only running jobs count.
    fn pending(&self) -> usize {
        if self.paused {
            self.in_flight - self.queue.len()
        } else {
            self.in_flight
        }
    }
}

/// Manages threads spawned by the pool.
struct ManagedThreads {
    /// Stores thread controls for workers spawned by the pool.
    workers: Vec<ManagedWorker>,
    /// The index given to the next worker, used in thread names and logs.
    next_index: usize,
}

/// A worker thread that is managed by the pool.
struct ManagedWorker {
    index: usize,
    control: ThreadControl,
}

/// Used to manage the lifecycle of a thread.
struct ThreadControl {
    /// Tells the thread to shut down when set to true.
    halt: Arc<AtomicBool>,
    /// The handle used to wait for the thread to complete.
    handle: JoinHandle<()>,
}

// -----------------------------------------------------------------------------
// Shared state

impl Shared {
    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, ThreadPoolState> {
        // User code never runs while the lock is held, so the state is
        // consistent even if the lock was poisoned.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_for_job<'a>(
        &self,
        state: MutexGuard<'a, ThreadPoolState>,
    ) -> MutexGuard<'a, ThreadPoolState> {
        self.job_is_ready
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait_for_completion<'a>(
        &self,
        state: MutexGuard<'a, ThreadPoolState>,
    ) -> MutexGuard<'a, ThreadPoolState> {
        self.job_completed
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a job to the back of the queue and wakes one worker.
    pub(crate) fn push(&self, job_ref: JobRef) {
        let mut state = self.lock();
        state.queue.push_back(job_ref);
        state.in_flight += 1;
        drop(state);
        self.job_is_ready.notify_one();
    }

    /// Adds several jobs to the back of the queue, in order, and wakes every
    /// worker.
    pub(crate) fn push_all(&self, job_refs: Vec<JobRef>) {
        let mut state = self.lock();
        state.in_flight += job_refs.len();
        for job_ref in job_refs {
            state.queue.push_back(job_ref);
        }
        drop(state);
        self.job_is_ready.notify_all();
    }

    /// Claims the job at the front of the queue, unless the pool is paused.
    #[inline]
    pub(crate) fn claim_job(state: &mut ThreadPoolState) -> Option<JobRef> {
        if state.paused {
            None
        } else {
            state.queue.pop_front()
        }
    }

    /// Runs a claimed job. Must be called without holding the lock.
    ///
    /// A panic escaping the job is caught here, so that the calling loop
    /// survives it; it is logged and handed to the panic handler. Jobs with a
    /// result or belonging to a parallel loop catch their own panics, so only
    /// fire-and-forget tasks ever get here.
    pub(crate) fn execute(&self, job_ref: JobRef) {
        let _completion = CompletionGuard { shared: self };
        if let Err(payload) = unwind::halt_unwinding(|| job_ref.execute()) {
            error!(
                "fire-and-forget task panicked: {}",
                unwind::panic_message(&*payload)
            );
            if let Some(handler) = &self.panic_handler {
                if unwind::halt_unwinding(|| handler(payload)).is_err() {
                    error!("panic handler panicked");
                }
            }
        }
    }
}

/// Marks a job as completed when dropped, so the in-flight count stays
/// accurate on every exit path.
struct CompletionGuard<'a> {
    shared: &'a Shared,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.in_flight -= 1;
        drop(state);
        self.shared.job_completed.notify_all();
    }
}

// -----------------------------------------------------------------------------
// Thread pool creation and maintenance

impl Default for ThreadPool {
    /// Creates a pool with one worker per available core.
    fn default() -> Self {
        ThreadPoolBuilder::new().build()
    }
}

impl ThreadPool {
    /// Creates a new thread pool with `thread_count` workers.
    ///
    /// A pool with zero workers is allowed. Tasks on it only run once the pool
    /// is resized or dropped, so calling [`ThreadPool::wait_for_tasks`] or
    /// [`TaskHandle::get`] on it before then blocks forever.
    pub fn new(thread_count: usize) -> ThreadPool {
        ThreadPoolBuilder::new().thread_count(thread_count).build()
    }

    /// Creates a builder for a thread pool.
    pub fn builder() -> ThreadPoolBuilder {
        ThreadPoolBuilder::new()
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    /// Returns the number of worker threads.
    pub fn get_thread_count(&self) -> usize {
        self.thread_count.load(Ordering::Acquire)
    }

    /// Resizes the pool to `thread_count` workers and returns the new size.
    ///
    /// Growing spawns new workers. Shrinking tells the surplus workers to
    /// exit once they finish their current task, and waits for them to do
    /// so. Queued tasks are never lost. The new size may be smaller than
    /// requested if the operating system refuses to spawn more threads.
    pub fn set_thread_count(&self, thread_count: usize) -> usize {
        self.resize(|_| thread_count)
    }

    /// Adds the given number of workers. Returns the new size of the pool.
    ///
    /// See [`ThreadPool::set_thread_count`] for more information.
    pub fn grow(&self, added_threads: usize) -> usize {
        self.resize(|current_size| current_size.saturating_add(added_threads))
    }

    /// Removes the given number of workers. Returns the new size of the
    /// pool.
    ///
    /// See [`ThreadPool::set_thread_count`] for more information.
    pub fn shrink(&self, terminated_threads: usize) -> usize {
        self.resize(|current_size| current_size.saturating_sub(terminated_threads))
    }

    #[cold]
    fn resize<F>(&self, get_size: F) -> usize
    where
        F: FnOnce(usize) -> usize,
    {
        debug!("starting thread pool resize");

        // Only one thread can resize the pool at a time.
        let mut managed_threads = self
            .managed_threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current_size = managed_threads.workers.len();
        let new_size = get_size(current_size);

        trace!(
            "attempting to resize thread pool from {} to {} thread(s)",
            current_size, new_size
        );

        match new_size.cmp(&current_size) {
            cmp::Ordering::Equal => {
                debug!("completed thread pool resize, size unchanged");
                return current_size;
            }
            cmp::Ordering::Greater => {
                for _ in current_size..new_size {
                    let index = managed_threads.next_index;
                    debug!("spawning managed worker with index {}", index);
                    let halt = Arc::new(AtomicBool::new(false));
                    let worker_halt = halt.clone();
                    let shared = self.shared.clone();
                    let spawned = ThreadBuilder::new()
                        .name(format!("{} {index}", self.thread_name))
                        .spawn(move || managed_worker(&shared, index, &worker_halt));
                    match spawned {
                        Ok(handle) => {
                            managed_threads.next_index += 1;
                            let control = ThreadControl { halt, handle };
                            managed_threads
                                .workers
                                .push(ManagedWorker { index, control });
                        }
                        Err(err) => {
                            error!("failed to spawn worker thread: {}", err);
                            break;
                        }
                    }
                }
                self.thread_count
                    .store(managed_threads.workers.len(), Ordering::Release);
            }
            cmp::Ordering::Less => {
                // Pull the workers we intend to halt out of the thread manager.
                let terminating_workers = managed_threads.workers.split_off(new_size);
                self.thread_count.store(new_size, Ordering::Release);
                drop(managed_threads);

                // Workers check their halt flag with the state lock held, so
                // setting it under the lock means none of them can miss the
                // wake-up below.
                let state = self.shared.lock();
                for worker in &terminating_workers {
                    worker.control.halt.store(true, Ordering::Relaxed);
                }
                drop(state);
                self.shared.job_is_ready.notify_all();

                join_workers(terminating_workers);
            }
        }

        let size = self.get_thread_count();
        debug!("completed thread pool resize to {} thread(s)", size);
        size
    }
}

/// Waits for the workers to fully halt.
fn join_workers(workers: Vec<ManagedWorker>) {
    let current_thread = thread::current().id();
    for worker in workers {
        // A task may resize or drop the pool it runs on, in which case we
        // can't wait for ourselves.
        if worker.control.handle.thread().id() == current_thread {
            continue;
        }
        if worker.control.handle.join().is_err() {
            error!("worker {} exited with a panic", worker.index);
        }
    }
}

// -----------------------------------------------------------------------------
// Thread pool scheduling api

impl ThreadPool {
    /// Queues a fire-and-forget task.
    ///
    /// Fire-and-forget tasks cannot report failure: if the closure panics, the
    /// panic is caught on the worker, logged, and passed to the panic handler
    /// configured with [`ThreadPoolBuilder::panic_handler`]. The worker then
    /// moves on to the next task.
    #[inline]
    pub fn add_task<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(HeapJob::new(f).into_job_ref());
    }

    /// Queues a task and returns a handle to its result. A panic in the
    /// closure is reported by the handle.
    pub fn add_task_with_future<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let shared = self.shared.clone();
        // The future completes on its first poll, so it's only ever
        // scheduled once: right below.
        let schedule = move |runnable: Runnable| {
            shared.push(
                HeapJob::new(move || {
                    runnable.run();
                })
                .into_job_ref(),
            );
        };
        let future = async move { unwind::halt_unwinding(f) };
        let (runnable, task) = async_task::spawn(future, schedule);
        runnable.schedule();
        TaskHandle::new(task)
    }

    /// Blocks the calling thread until no task is queued or running.
    ///
    /// While the pool is paused, tasks in the queue can't start, so this only
    /// waits for the tasks that are already running.
    pub fn wait_for_tasks(&self) {
        let mut state = self.shared.lock();
        while state.pending() > 0 {
            state = self.shared.wait_for_completion(state);
        }
    }

    /// Like [`ThreadPool::wait_for_tasks`], but gives up after `timeout`.
    /// Returns true if the pool became idle in time.
    pub fn wait_for_tasks_timeout(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        let (state, _) = self
            .shared
            .job_completed
            .wait_timeout_while(state, timeout, |state| state.pending() > 0)
            .unwrap_or_else(PoisonError::into_inner);
        state.pending() == 0
    }

    /// Removes every task that has not started yet. Tasks already running are
    /// unaffected. Handles of discarded tasks report
    /// [`Error::TaskDiscarded`](crate::Error::TaskDiscarded).
    ///
    /// Returns the number of tasks removed.
    pub fn clear_task_queue(&self) -> usize {
        let mut state = self.shared.lock();
        let discarded: VecDeque<JobRef> = state.queue.take_all();
        state.in_flight -= discarded.len();
        drop(state);

        let count = discarded.len();
        debug!("discarding {} queued task(s)", count);

        // Dropping jobs may run arbitrary destructors, so it happens outside
        // the lock. Waiters are woken afterwards.
        drop(discarded);
        let state = self.shared.lock();
        drop(state);
        self.shared.job_completed.notify_all();
        count
    }

    /// Stops workers from starting new tasks. Running tasks are not
    /// interrupted. Tasks can still be added while the pool is paused.
    pub fn pause(&self) {
        debug!("pausing thread pool");
        let mut state = self.shared.lock();
        state.paused = true;
        drop(state);
        self.shared.job_completed.notify_all();
    }

    /// Lets workers start new tasks again.
    pub fn unpause(&self) {
        debug!("unpausing thread pool");
        let mut state = self.shared.lock();
        state.paused = false;
        drop(state);
        self.shared.job_is_ready.notify_all();
        self.shared.job_completed.notify_all();
    }

    /// Returns true if the pool is paused.
    pub fn is_paused(&self) -> bool {
        self.shared.lock().paused
    }

    /// Returns the number of tasks waiting in the queue.
    pub fn get_tasks_queued(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Returns the number of tasks currently running.
    pub fn get_tasks_running(&self) -> usize {
        let state = self.shared.lock();
        state.in_flight - state.queue.len()
    }

    /// Returns the number of tasks either queued or running.
    pub fn get_tasks_total(&self) -> usize {
        self.shared.lock().in_flight
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ThreadPool")
            .field("thread_count", &self.get_thread_count())
            .field("tasks_queued", &state.queue.len())
            .field("tasks_total", &state.in_flight)
            .field("paused", &state.paused)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Shutdown

impl Drop for ThreadPool {
    fn drop(&mut self) {
        debug!("shutting down thread pool");

        let mut state = self.shared.lock();
        state.shutdown = true;
        state.paused = false;
        drop(state);
        self.shared.job_is_ready.notify_all();

        // Workers drain the queue before exiting.
        let workers = mem::take(
            &mut self
                .managed_threads
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .workers,
        );
        join_workers(workers);

        // Without workers, whatever is left runs here.
        loop {
            let job_ref = Shared::claim_job(&mut self.shared.lock());
            match job_ref {
                Some(job_ref) => self.shared.execute(job_ref),
                None => break,
            }
        }

        debug!("thread pool shut down");
    }
}

// -----------------------------------------------------------------------------
// Main worker loop

/// This is the main loop for a worker thread. Workers wait for jobs while the
/// queue is empty or the pool is paused, execute jobs in queue order, and exit
/// when halted or when the pool shuts down with an empty queue.
fn managed_worker(shared: &Shared, index: usize, halt: &AtomicBool) {
    let span = trace_span!("worker", index);
    let _enter = span.enter();

    trace!("starting managed worker");

    let mut state = shared.lock();
    loop {
        if halt.load(Ordering::Relaxed) {
            break;
        }

        if let Some(job_ref) = Shared::claim_job(&mut state) {
            drop(state);
            shared.execute(job_ref);
            state = shared.lock();
            continue;
        }

        if state.shutdown && state.queue.is_empty() {
            break;
        }

        state = shared.wait_for_job(state);
    }
    drop(state);

    trace!("exiting managed worker");
}

// -----------------------------------------------------------------------------
// Global thread pool api

static THREAD_POOL: LazyLock<ThreadPool> = LazyLock::new(ThreadPool::default);

/// Returns the process-wide thread pool, creating it on first use with one
/// worker per available core.
///
/// The pool lives for the rest of the process. Rust never drops statics, so
/// tasks still queued when the process exits are not run; call
/// [`wait_for_tasks`] first if they matter.
pub fn static_thread_pool() -> &'static ThreadPool {
    &THREAD_POOL
}

/// Returns the number of workers of the global pool.
///
/// See [`ThreadPool::get_thread_count`].
pub fn get_thread_count() -> usize {
    static_thread_pool().get_thread_count()
}

/// Resizes the global pool.
///
/// See [`ThreadPool::set_thread_count`].
pub fn set_thread_count(thread_count: usize) -> usize {
    static_thread_pool().set_thread_count(thread_count)
}

/// Queues a fire-and-forget task on the global pool.
///
/// The global pool is never dropped, so a task still queued when the process
/// exits never runs. Call [`wait_for_tasks`] before returning from `main` if
/// the task must complete.
///
/// See [`ThreadPool::add_task`].
pub fn task<F>(f: F)
where
    F: FnOnce() + Send + 'static,
{
    static_thread_pool().add_task(f);
}

/// Queues a task on the global pool and returns a handle to its result.
///
/// Like [`task`], the task is lost if the process exits before it runs and
/// nobody waits for it.
///
/// See [`ThreadPool::add_task_with_future`].
pub fn task_with_future<F, T>(f: F) -> TaskHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    static_thread_pool().add_task_with_future(f)
}

/// Blocks until the global pool is idle.
///
/// See [`ThreadPool::wait_for_tasks`].
pub fn wait_for_tasks() {
    static_thread_pool().wait_for_tasks();
}

/// Runs a parallel loop on the global pool.
///
/// See [`ThreadPool::for_loop`].
pub fn for_loop<D, F>(domain: D, f: F) -> Result<()>
where
    D: Splittable,
    F: Fn(D::Span) + Sync,
{
    static_thread_pool().for_loop(domain, f)
}

/// Runs a parallel reduction on the global pool.
///
/// See [`ThreadPool::reduce`].
pub fn reduce<D, Op>(domain: D, op: Op) -> Result<D::Item>
where
    D: Reducible,
    Op: Fn(D::Item, D::Item) -> D::Item + Sync,
{
    static_thread_pool().reduce(domain, op)
}

/// Runs a parallel reduction with loop unrolling on the global pool.
///
/// See [`ThreadPool::reduce_unrolled`].
pub fn reduce_unrolled<const UNROLL: usize, D, Op>(domain: D, op: Op) -> Result<D::Item>
where
    D: Reducible,
    Op: Fn(D::Item, D::Item) -> D::Item + Sync,
{
    static_thread_pool().reduce_unrolled::<UNROLL, D, Op>(domain, op)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn thread_count_resolution() {
        assert_eq!(ThreadCount::Count(3).get(), 3);
        assert!(ThreadCount::AvailableParallelism.get() >= 1);
        assert_eq!(ThreadCount::from(5), ThreadCount::Count(5));
    }

    #[test]
    fn pending_ignores_queue_while_paused() {
        let mut state = ThreadPoolState {
            queue: JobQueue::new(),
            in_flight: 0,
            paused: false,
            shutdown: false,
        };
        state.queue.push_back(HeapJob::new(|| {}).into_job_ref());
        state.in_flight = 3;
        assert_eq!(state.pending(), 3);
        state.paused = true;
        assert_eq!(state.pending(), 2);
        assert!(Shared::claim_job(&mut state).is_none());
        state.paused = false;
        assert!(Shared::claim_job(&mut state).is_some());
    }
}
