//! Tests specifically for miri

#![cfg(miri)]

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use grainpool::Error;
use grainpool::RangeMut;
use grainpool::ThreadPool;
use grainpool::ops;

/// Loop bodies borrow from the caller's stack through type-erased jobs.
#[test]
fn scoped_borrows() {
    let pool = ThreadPool::new(2);
    let mut data = vec![1u32; 64];
    pool.for_loop(RangeMut::with_grain_size(&mut data, 8).unwrap(), |span| {
        for x in span {
            *x += 1;
        }
    })
    .unwrap();
    assert_eq!(pool.reduce(&data, ops::sum), Ok(128));
}

/// Jobs dropped from the queue release their borrows and count down.
#[test]
fn discarded_scoped_jobs() {
    let pool = ThreadPool::new(1);
    pool.pause();
    let data = vec![0u8; 16];
    std::thread::scope(|s| {
        let caller = s.spawn(|| pool.reduce(&data, ops::max));
        while pool.get_tasks_queued() == 0 {
            std::thread::yield_now();
        }
        pool.clear_task_queue();
        assert!(matches!(
            caller.join().unwrap(),
            Err(Error::SpansDiscarded { .. })
        ));
    });
    pool.unpause();
}

/// Task handles are woken from worker threads.
#[test]
fn task_handles() {
    let pool = ThreadPool::new(2);
    let counter = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let counter = counter.clone();
            pool.add_task_with_future(move || counter.fetch_add(i, Ordering::Relaxed))
        })
        .collect();
    for handle in handles {
        handle.get().unwrap();
    }
    assert_eq!(counter.load(Ordering::Relaxed), 6);
}
