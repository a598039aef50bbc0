//! The truncation contract.
//!
//! A truncator decides which product terms a multiplication may discard. It
//! comes in three flavours: inactive (keep everything), filtering (drop
//! individual terms at insertion) and skipping (a term order under which,
//! once one pair of a row is skippable, the whole tail of the row is).
//! The flavour is part of the type, so inactive paths compile to nothing.

use std::cmp::Ordering;

use epicycle_algebra::{Coefficient, Key, Term};

/// Decides which product terms a multiplication may discard.
pub trait Truncator<C: Coefficient, K: Key<C>>: Send + Sync {
    /// True if [`Truncator::skip`] is meaningful for this type.
    ///
    /// A skipping truncator must make `skip(t1, t2)` monotone in the second
    /// argument once both operands are sorted by [`Truncator::compare_terms`].
    const IS_SKIPPING: bool;

    /// True if [`Truncator::filter`] is meaningful for this type.
    const IS_FILTERING: bool;

    /// Returns true if this instance truncates at all.
    fn is_active(&self) -> bool;

    /// Strict weak order used to sort operands before skipping.
    fn compare_terms(&self, _a: &Term<C, K>, _b: &Term<C, K>) -> Ordering {
        Ordering::Equal
    }

    /// Returns true if the product of `t1` and `t2` (and, after sorting, of
    /// `t1` and every later term) can be pruned without being computed.
    fn skip(&self, _t1: &Term<C, K>, _t2: &Term<C, K>) -> bool {
        false
    }

    /// Returns true if the single product term `t` should be dropped.
    fn filter(&self, _t: &Term<C, K>) -> bool {
        false
    }
}

/// Truncator that never truncates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTruncator;

impl<C: Coefficient, K: Key<C>> Truncator<C, K> for NullTruncator {
    const IS_SKIPPING: bool = false;
    const IS_FILTERING: bool = false;

    fn is_active(&self) -> bool {
        false
    }
}
