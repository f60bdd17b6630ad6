//! Errors reported by the thread pool and the parallel primitives.

use alloc::string::String;
use thiserror::Error;

/// Error type for grainpool operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A range was constructed with a grain size of zero.
    #[error("grain size must be greater than zero")]
    InvalidGrainSize,

    /// A range was constructed with its first index after its last index.
    #[error("malformed range: first index {first} is after last index {last}")]
    MalformedRange {
        /// The first index, as passed to the constructor.
        first: String,
        /// The last index, as passed to the constructor.
        last: String,
    },

    /// An integer range holds more indices than fit in a `usize`, so it
    /// can't be split exhaustively.
    #[error("range from {first} to {last} holds more than usize::MAX indices")]
    RangeTooLarge {
        /// The first index of the range.
        first: String,
        /// One past the last index of the range.
        last: String,
    },

    /// A reduction was requested over a domain with no elements. There is no
    /// identity element available for an arbitrary operator.
    #[error("cannot reduce an empty range")]
    EmptyRange,

    /// A task with a result panicked while running.
    #[error("task panicked: {message}")]
    TaskPanicked {
        /// The panic message, if the payload was a string.
        message: String,
    },

    /// A task with a result was removed from the queue before it ran.
    #[error("task was discarded before it ran")]
    TaskDiscarded,

    /// Some sub-span tasks of a parallel loop or reduction were removed from
    /// the queue before they ran.
    #[error("{discarded} sub-span task(s) were discarded before they ran")]
    SpansDiscarded {
        /// How many sub-spans never ran.
        discarded: usize,
    },
}

/// Result type alias for grainpool operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
