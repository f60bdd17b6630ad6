//! The shared FIFO job queue.
//!
//! The queue itself is not synchronized; it lives inside the pool state and
//! is only ever touched while the pool lock is held.

use alloc::collections::VecDeque;

use crate::job::JobRef;

/// A first-in first-out queue of jobs. Insertion order is execution order.
pub struct JobQueue {
    job_refs: VecDeque<JobRef>,
}

impl JobQueue {
    pub const fn new() -> JobQueue {
        JobQueue {
            job_refs: VecDeque::new(),
        }
    }

    #[inline(always)]
    pub fn push_back(&mut self, job_ref: JobRef) {
        self.job_refs.push_back(job_ref);
    }

    #[inline(always)]
    pub fn pop_front(&mut self) -> Option<JobRef> {
        self.job_refs.pop_front()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.job_refs.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.job_refs.is_empty()
    }

    /// Removes every queued job, handing them back to the caller so they can
    /// be dropped outside the pool lock.
    pub fn take_all(&mut self) -> VecDeque<JobRef> {
        core::mem::take(&mut self.job_refs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::job::HeapJob;
    use crate::platform::Arc;
    use crate::platform::Mutex;
    use alloc::vec::Vec;

    #[test]
    fn pops_in_insertion_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut queue = JobQueue::new();
        for i in 0..5 {
            let order = order.clone();
            queue.push_back(HeapJob::new(move || order.lock().unwrap().push(i)).into_job_ref());
        }
        assert_eq!(queue.len(), 5);
        while let Some(job_ref) = queue.pop_front() {
            job_ref.execute();
        }
        assert!(queue.is_empty());
        assert_eq!(*order.lock().unwrap(), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn take_all_empties_queue() {
        let mut queue = JobQueue::new();
        queue.push_back(HeapJob::new(|| {}).into_job_ref());
        queue.push_back(HeapJob::new(|| {}).into_job_ref());
        let taken = queue.take_all();
        assert_eq!(taken.len(), 2);
        assert!(queue.is_empty());
        assert!(queue.pop_front().is_none());
    }
}
