//! The multiplication driver.
//!
//! A [`SeriesMultiplier`] is built from two operand series with equal symbol
//! sets and computes their product on demand. The driver decides the worker
//! count from the configured maximum, the amount of work available and the
//! size of the first operand (work is partitioned along it), then runs
//! either the plain single-threaded path or the fork-join path with one
//! private accumulator per worker followed by a bucket-partitioned merge.

use rayon::prelude::*;

use epicycle_algebra::{settings, Coefficient, Error, Key, Series, Term};

use crate::estimate::{estimate_final_series_size, rehash_for_estimate};
use crate::functor::MulFunctor;
use crate::merge::final_merge;
use crate::tiler::blocked_multiplication;
use crate::truncate::Truncator;

/// Multiplies two series with identical symbol sets.
pub struct SeriesMultiplier<'a, C: Coefficient, K: Key<C>> {
    s1: &'a Series<C, K>,
    v1: Vec<&'a Term<C, K>>,
    v2: Vec<&'a Term<C, K>>,
}

impl<'a, C, K> SeriesMultiplier<'a, C, K>
where
    C: Coefficient,
    K: Key<C>,
{
    /// Creates a multiplier over two operand series.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleSymbols`] when the operands' symbol sets
    /// differ.
    pub fn new(s1: &'a Series<C, K>, s2: &'a Series<C, K>) -> Result<Self, Error> {
        if s1.symbols() != s2.symbols() {
            return Err(Error::IncompatibleSymbols);
        }
        Ok(Self {
            s1,
            v1: s1.iter().collect(),
            v2: s2.iter().collect(),
        })
    }

    /// Computes the product, honouring the given truncator.
    ///
    /// Offers the strong guarantee: on error the operands are untouched and
    /// no partial result escapes.
    ///
    /// # Errors
    ///
    /// Propagates functor construction, arithmetic and allocation failures.
    pub fn multiply<T: Truncator<C, K>>(&self, trunc: &T) -> Result<Series<C, K>, Error> {
        if trunc.is_active() {
            self.execute::<T, true>(trunc)
        } else {
            self.execute::<T, false>(trunc)
        }
    }

    fn execute<T: Truncator<C, K>, const ACTIVE: bool>(
        &self,
        trunc: &T,
    ) -> Result<Series<C, K>, Error> {
        if self.v1.is_empty() || self.v2.is_empty() {
            return Ok(Series::new(self.s1.symbols().clone()));
        }
        let size1 = self.v1.len();
        let work = size1 as u128 * self.v2.len() as u128;
        let mut n_threads = settings::max_threads().max(1) as u128;
        if n_threads != 1 {
            let min_work = u128::from(settings::min_work_per_thread());
            if work / n_threads < min_work {
                n_threads = (work / min_work).max(1);
            }
        }
        let n_threads = usize::try_from(n_threads).unwrap_or(usize::MAX).min(size1);
        // Nested multiplications (e.g. from series-valued coefficients) must
        // not fan out again from inside a pool worker.
        if n_threads == 1 || rayon::current_thread_index().is_some() {
            let target = Series::new(self.s1.symbols().clone());
            let mut f =
                MulFunctor::<'_, C, K, T, ACTIVE>::new(self.v1.clone(), self.v2.clone(), trunc, target)?;
            rehash_for_estimate(&mut f);
            blocked_multiplication(&mut f)?;
            Ok(f.into_target())
        } else {
            self.execute_parallel::<T, ACTIVE>(trunc, n_threads)
        }
    }

    fn execute_parallel<T: Truncator<C, K>, const ACTIVE: bool>(
        &self,
        trunc: &T,
        n_threads: usize,
    ) -> Result<Series<C, K>, Error> {
        let symbols = self.s1.symbols().clone();
        let size1 = self.v1.len();
        let block = size1 / n_threads;
        let ranges: Vec<std::ops::Range<usize>> = (0..n_threads)
            .map(|i| {
                let start = i * block;
                let end = if i == n_threads - 1 { size1 } else { start + block };
                start..end
            })
            .collect();
        // Populate phase: one private accumulator per block of the first
        // operand. Every sibling runs to completion; the first failure in
        // block order wins afterwards.
        let outcomes: Vec<Result<Series<C, K>, Error>> = ranges
            .into_par_iter()
            .map(|range| {
                let target = Series::new(symbols.clone());
                let mut f = MulFunctor::<'_, C, K, T, ACTIVE>::new(
                    self.v1[range].to_vec(),
                    self.v2.clone(),
                    trunc,
                    target,
                )?;
                rehash_for_estimate(&mut f);
                blocked_multiplication(&mut f)?;
                Ok(f.into_target())
            })
            .collect();
        let mut partials = Vec::with_capacity(n_threads);
        for outcome in outcomes {
            partials.push(outcome?);
        }
        // Size the merge target from an estimate over the whole pair range.
        let mut scratch = MulFunctor::<'_, C, K, T, ACTIVE>::new(
            self.v1.clone(),
            self.v2.clone(),
            trunc,
            Series::new(symbols.clone()),
        )?;
        let final_estimate = estimate_final_series_size(&mut scratch).unwrap_or(0).max(1);
        drop(scratch);
        let max_load_factor = settings::max_load_factor();
        // A per-worker accumulator that is already big enough can serve as
        // the merge target directly.
        #[allow(clippy::cast_precision_loss)]
        let candidate = partials.iter().position(|s| {
            s.container().bucket_count() as f64 * s.container().max_load_factor()
                >= final_estimate as f64
        });
        let mut target = match candidate {
            Some(pos) => partials.remove(pos),
            None => {
                let mut fresh = Series::new(symbols);
                #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let buckets = (final_estimate as f64 / max_load_factor).ceil() as usize;
                fresh.container_mut().rehash(buckets)?;
                fresh
            }
        };
        final_merge(&mut target, partials, n_threads)?;
        Ok(target)
    }
}
