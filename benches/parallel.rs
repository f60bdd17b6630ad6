//! A benchmark for data-parallel loops and reductions over a flat slice.

use divan::Bencher;
use divan::black_box;
use grainpool::Range;
use grainpool::ThreadPool;
use grainpool::ops;
use rayon::prelude::*;

// -----------------------------------------------------------------------------
// Workload

// Returns an iterator over the slice lengths.
const LENGTHS: &[usize] = &[1_000, 100_000, 10_000_000];
fn lengths() -> impl Iterator<Item = usize> {
    LENGTHS.iter().copied()
}

fn data(len: usize) -> Vec<u64> {
    (0..len as u64).collect()
}

fn expected(len: usize) -> u64 {
    let n = len as u64;
    n * (n - 1) / 2
}

// -----------------------------------------------------------------------------
// Reduction

#[divan::bench(args = lengths())]
fn baseline(bencher: Bencher, len: usize) {
    let data = data(len);
    bencher.bench_local(|| {
        assert_eq!(black_box(&data).iter().sum::<u64>(), expected(len));
    });
}

#[divan::bench(args = lengths())]
fn grainpool_reduce(bencher: Bencher, len: usize) {
    let pool = ThreadPool::default();
    let data = data(len);
    bencher.bench_local(|| {
        assert_eq!(pool.reduce(black_box(&data), ops::sum), Ok(expected(len)));
    });
}

#[divan::bench(args = lengths())]
fn grainpool_unrolled(bencher: Bencher, len: usize) {
    let pool = ThreadPool::default();
    let data = data(len);
    bencher.bench_local(|| {
        let result = pool.reduce_unrolled::<8, _, _>(black_box(&data), ops::sum);
        assert_eq!(result, Ok(expected(len)));
    });
}

#[divan::bench(args = lengths())]
fn rayon(bencher: Bencher, len: usize) {
    let data = data(len);
    bencher.bench_local(|| {
        assert_eq!(black_box(&data).par_iter().sum::<u64>(), expected(len));
    });
}

// -----------------------------------------------------------------------------
// Parallel for

#[divan::bench(args = lengths())]
fn grainpool_for_loop(bencher: Bencher, len: usize) {
    let pool = ThreadPool::default();
    let mut data = data(len);
    bencher.bench_local(|| {
        pool.for_loop(&mut data, |span| {
            for x in span {
                *x = x.wrapping_mul(3);
            }
        })
        .unwrap();
    });
}

#[divan::bench(args = lengths())]
fn rayon_for_each(bencher: Bencher, len: usize) {
    let mut data = data(len);
    bencher.bench_local(|| {
        data.par_chunks_mut(4096).for_each(|chunk| {
            for x in chunk {
                *x = x.wrapping_mul(3);
            }
        });
    });
}

#[divan::bench(args = lengths())]
fn grainpool_fixed_grain(bencher: Bencher, len: usize) {
    let pool = ThreadPool::default();
    let data = data(len);
    bencher.bench_local(|| {
        let range = Range::with_grain_size(black_box(&data), 4096).unwrap();
        assert_eq!(pool.reduce(range, ops::sum), Ok(expected(len)));
    });
}

fn main() {
    divan::main();
}
