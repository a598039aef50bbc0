//! The per-pair multiplication functor.
//!
//! A functor glues one multiplication job together: the two term-pointer
//! arrays (a sub-range of the first operand, all of the second), the
//! truncator, the owned target series and the product scratch. The tiler and
//! the density estimator both drive multiplications through it.
//!
//! The `ACTIVE` const parameter mirrors the truncator's runtime activity
//! flag, so that skip and filter checks vanish from inactive instantiations.

use epicycle_algebra::{Coefficient, Error, Key, ProductBuf, Series, Term};

use crate::truncate::Truncator;

/// Term-by-term multiplication state for one worker.
pub struct MulFunctor<'a, C: Coefficient, K: Key<C>, T: Truncator<C, K>, const ACTIVE: bool> {
    terms1: Vec<&'a Term<C, K>>,
    terms2: Vec<&'a Term<C, K>>,
    trunc: &'a T,
    target: Series<C, K>,
    scratch: ProductBuf<C, K>,
}

impl<'a, C, K, T, const ACTIVE: bool> MulFunctor<'a, C, K, T, ACTIVE>
where
    C: Coefficient,
    K: Key<C>,
    T: Truncator<C, K>,
{
    /// Creates a functor over the given term pointers, truncator and target.
    ///
    /// With an active skipping truncator, both pointer arrays are sorted by
    /// the truncator's term order so that row tails can be pruned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatorFlagMismatch`] when `ACTIVE` disagrees with
    /// `trunc.is_active()`.
    pub fn new(
        terms1: Vec<&'a Term<C, K>>,
        terms2: Vec<&'a Term<C, K>>,
        trunc: &'a T,
        target: Series<C, K>,
    ) -> Result<Self, Error> {
        if ACTIVE != trunc.is_active() {
            return Err(Error::TruncatorFlagMismatch);
        }
        let mut functor = Self {
            terms1,
            terms2,
            trunc,
            target,
            scratch: ProductBuf::new(),
        };
        if ACTIVE && T::IS_SKIPPING {
            let trunc = functor.trunc;
            functor
                .terms1
                .sort_unstable_by(|a, b| trunc.compare_terms(a, b));
            functor
                .terms2
                .sort_unstable_by(|a, b| trunc.compare_terms(a, b));
        }
        Ok(functor)
    }

    /// Number of terms in the first operand range.
    #[must_use]
    pub fn len1(&self) -> usize {
        self.terms1.len()
    }

    /// Number of terms in the second operand.
    #[must_use]
    pub fn len2(&self) -> usize {
        self.terms2.len()
    }

    /// Whether the pair `(i, j)` (and, after sorting, the whole row tail)
    /// can be pruned.
    #[must_use]
    pub fn skip(&self, i: usize, j: usize) -> bool {
        ACTIVE && T::IS_SKIPPING && self.trunc.skip(self.terms1[i], self.terms2[j])
    }

    /// Whether a single product term should be dropped at insertion.
    #[must_use]
    pub fn filter(&self, term: &Term<C, K>) -> bool {
        ACTIVE && T::IS_FILTERING && self.trunc.filter(term)
    }

    /// Multiplies the `i`-th term of the first range by the `j`-th of the
    /// second, leaving the products in the scratch buffer.
    ///
    /// # Errors
    ///
    /// Propagates key arithmetic failures.
    pub fn multiply(&mut self, i: usize, j: usize) -> Result<(), Error> {
        debug_assert!(i < self.terms1.len() && j < self.terms2.len());
        self.scratch.clear();
        K::multiply(
            self.terms1[i],
            self.terms2[j],
            self.target.symbols(),
            &mut self.scratch,
        )
    }

    /// Forwards the scratch products into the target series.
    ///
    /// With `CHECK_FILTER` set, each product is tested against the filter
    /// first, except for skipping truncators, where filtering is assumed to
    /// be subsumed by the skip bound.
    ///
    /// # Errors
    ///
    /// Propagates insertion failures.
    pub fn insert<const CHECK_FILTER: bool>(&mut self) -> Result<(), Error> {
        for idx in 0..self.scratch.len() {
            if CHECK_FILTER && !T::IS_SKIPPING && self.filter(&self.scratch[idx]) {
                continue;
            }
            let term = self.scratch[idx].clone();
            self.target.insert(term)?;
        }
        Ok(())
    }

    /// How many of the current scratch products the filter would drop.
    #[must_use]
    pub fn count_filtered(&self) -> usize {
        self.scratch.iter().filter(|t| self.filter(t)).count()
    }

    /// Number of terms currently in the target.
    #[must_use]
    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    /// Maximum load factor of the target's container.
    #[must_use]
    pub fn target_max_load_factor(&self) -> f64 {
        self.target.container().max_load_factor()
    }

    /// Empties the target, keeping its bucket capacity.
    pub fn clear_target(&mut self) {
        self.target.clear();
    }

    /// Rehashes the target to at least `n_buckets` buckets.
    ///
    /// # Errors
    ///
    /// Propagates container rehash failures.
    pub fn rehash_target(&mut self, n_buckets: usize) -> Result<(), Error> {
        self.target.container_mut().rehash(n_buckets)
    }

    /// Consumes the functor, yielding the accumulated target series.
    #[must_use]
    pub fn into_target(self) -> Series<C, K> {
        self.target
    }
}
