//! # epicycle-mul
//!
//! The parallel sparse series multiplication engine.
//!
//! Multiplication proceeds in two fork-join phases. First the left operand
//! is split into contiguous blocks, one per worker; each worker walks its
//! block of term pairs in cache-sized tiles and combines partial products
//! into a private accumulator, pre-sized by a Monte-Carlo density estimate.
//! Then the per-worker accumulators are merged into one by partitioning the
//! destination bucket space, so no bucket is ever touched by two workers.
//!
//! Truncation plugs in through the [`Truncator`] trait: a skipping truncator
//! sorts the operands and prunes whole tail ranges, a filtering truncator
//! drops individual products at insertion.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod estimate;
pub mod functor;
mod merge;
pub mod multiplier;
pub mod tiler;
pub mod truncate;


pub use estimate::{estimate_final_series_size, rehash_for_estimate};
pub use functor::MulFunctor;
pub use multiplier::SeriesMultiplier;
pub use tiler::{blocked_multiplication, BLOCK_SIZE};
pub use truncate::{NullTruncator, Truncator};
