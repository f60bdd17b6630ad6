//! Binary operators for [`reduce`](crate::ThreadPool::reduce).
//!
//! These are plain functions, so they can be passed by name:
//! `pool.reduce(&data, ops::sum)`. All of them are associative.

use core::ops::Add;
use core::ops::Mul;

/// Returns `a + b`.
#[inline]
pub fn sum<T: Add<Output = T>>(a: T, b: T) -> T {
    a + b
}

/// Returns `a * b`.
#[inline]
pub fn prod<T: Mul<Output = T>>(a: T, b: T) -> T {
    a * b
}

/// Returns the smaller argument, or `a` if they compare equal or are
/// unordered.
#[inline]
pub fn min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a { b } else { a }
}

/// Returns the larger argument, or `a` if they compare equal or are
/// unordered.
#[inline]
pub fn max<T: PartialOrd>(a: T, b: T) -> T {
    if b > a { b } else { a }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integer_ops() {
        assert_eq!(sum(2, 3), 5);
        assert_eq!(prod(4u64, 5), 20);
        assert_eq!(min(-1i8, 7), -1);
        assert_eq!(max(-1i8, 7), 7);
    }

    #[test]
    fn float_ops_keep_first_on_ties() {
        assert_eq!(min(1.5, 1.5), 1.5);
        assert_eq!(max(0.0f64, -0.0).to_bits(), 0.0f64.to_bits());
        assert_eq!(sum(0.25, 0.5), 0.75);
        assert_eq!(prod(0.5f32, 4.0), 2.0);
    }
}
