//! Errors shared across the epicycle workspace.

use thiserror::Error;

/// Errors surfaced by series construction, insertion and multiplication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The two operand series carry different symbol sets.
    #[error("incompatible symbol sets")]
    IncompatibleSymbols,

    /// A term whose key does not fit the series symbol set was inserted.
    #[error("term key is incompatible with the symbol set")]
    IncompatibleTerm,

    /// Integer arithmetic overflowed while combining keys or counting terms.
    #[error("arithmetic overflow")]
    Overflow,

    /// The bucket array could not be allocated.
    #[error("out of memory while sizing the term container")]
    OutOfMemory,

    /// A multiplication functor was constructed with the wrong activity flag.
    #[error("inconsistent activity flag for truncator")]
    TruncatorFlagMismatch,

    /// A bucket index was requested from a container with no buckets.
    #[error("bucket index on a container with zero buckets")]
    ZeroDivision,
}
