//! The hashed term accumulator.
//!
//! [`TermSet`] is the container partial products are combined into during
//! series multiplication. It is a power-of-two bucket array in which each
//! bucket stores its first term inline and spills collisions into the same
//! chain. The bucket of a key is a pure function of the key hash and the
//! bucket count; the parallel merge phase relies on this to partition the
//! bucket space across workers so that no two workers touch the same bucket.
//!
//! The set itself is symbol-agnostic: ignorability checks during combining
//! insertion receive the symbol set from the owning series.

use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};

use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::error::Error;
use crate::settings;
use crate::symbol::SymbolSet;
use crate::term::{Coefficient, Key, Term};

/// A single bucket: first term inline, collisions chained in place.
pub type Bucket<C, K> = SmallVec<[Term<C, K>; 1]>;

type FxBuild = BuildHasherDefault<FxHasher>;

/// Hashed multiset of terms, keyed by the key part.
#[derive(Clone, Debug)]
pub struct TermSet<C, K> {
    buckets: Vec<Bucket<C, K>>,
    len: usize,
    max_load_factor: f64,
}

impl<C, K> Default for TermSet<C, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, K> TermSet<C, K> {
    /// Creates an empty set with no buckets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            len: 0,
            max_load_factor: settings::max_load_factor(),
        }
    }

    /// Returns the number of stored terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no terms are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the current load factor (0.0 for a bucket-less set).
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            0.0
        } else {
            self.len as f64 / self.buckets.len() as f64
        }
    }

    /// Returns the maximum load factor this set was built with.
    #[must_use]
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Removes all terms, keeping the bucket array and its capacity.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Iterates over all stored terms in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &Term<C, K>> {
        self.buckets.iter().flatten()
    }

    /// Histogram of chain length to number of buckets with that length.
    #[must_use]
    pub fn evaluate_sparsity(&self) -> Vec<usize> {
        let mut histogram = Vec::new();
        for bucket in &self.buckets {
            let n = bucket.len();
            if n >= histogram.len() {
                histogram.resize(n + 1, 0);
            }
            histogram[n] += 1;
        }
        histogram
    }

    /// Overwrites the stored term count.
    ///
    /// Low-level: used by the merge phase, which inserts into buckets
    /// directly and accounts for growth separately.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    /// Mutable access to the raw bucket array.
    ///
    /// Low-level: the merge phase splits this slice into disjoint ranges so
    /// that each worker owns a contiguous run of buckets.
    pub fn raw_buckets_mut(&mut self) -> &mut [Bucket<C, K>] {
        &mut self.buckets
    }

    fn wipe(&mut self) {
        self.buckets = Vec::new();
        self.len = 0;
    }
}

impl<C: Coefficient, K: Key<C>> TermSet<C, K> {
    fn hash_of(key: &K) -> u64 {
        let mut h = FxBuild::default().build_hasher();
        key.hash(&mut h);
        h.finish()
    }

    /// Bucket of `key` in a table of `bucket_count` buckets.
    ///
    /// Pure function of the key content and the capacity; every `TermSet`
    /// with the same bucket count agrees on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroDivision`] when `bucket_count` is zero.
    pub fn bucket_for(key: &K, bucket_count: usize) -> Result<usize, Error> {
        if bucket_count == 0 {
            return Err(Error::ZeroDivision);
        }
        debug_assert!(bucket_count.is_power_of_two());
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self::hash_of(key) as usize & (bucket_count - 1))
    }

    /// Bucket of `key` in this set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroDivision`] when the set has no buckets.
    pub fn bucket_index(&self, key: &K) -> Result<usize, Error> {
        Self::bucket_for(key, self.buckets.len())
    }

    /// Looks up the term with an equal key.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&Term<C, K>> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = Self::bucket_for(key, self.buckets.len()).ok()?;
        self.buckets[bucket].iter().find(|t| t.key == *key)
    }

    /// Position of the term with an equal key within `bucket`'s chain.
    #[must_use]
    pub fn position_in(&self, bucket: usize, key: &K) -> Option<usize> {
        self.buckets[bucket].iter().position(|t| t.key == *key)
    }

    /// Inserts `term` into `bucket` without probing.
    ///
    /// Precondition: no stored term has an equal key, and `bucket` is the
    /// term's bucket in the current table. Neither the load-factor invariant
    /// nor the bucket count is maintained; callers that over-fill the table
    /// must rehash afterwards.
    pub fn unique_insert(&mut self, term: Term<C, K>, bucket: usize) {
        debug_assert!(self.position_in(bucket, &term.key).is_none());
        self.buckets[bucket].push(term);
        self.len += 1;
    }

    /// Inserts `term`, combining coefficients with an existing term of equal
    /// key and erasing the result if it cancels to an ignorable term.
    ///
    /// Returns true if the stored term count strictly grew.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if growing the bucket array fails; the
    /// container is left empty in that case.
    pub fn insert(&mut self, term: Term<C, K>, symbols: &SymbolSet) -> Result<bool, Error> {
        if term.is_ignorable(symbols) {
            return Ok(false);
        }
        if self.buckets.is_empty() {
            self.rehash(1)?;
        }
        let bucket = self.bucket_index(&term.key)?;
        if let Some(pos) = self.position_in(bucket, &term.key) {
            let existing = &mut self.buckets[bucket][pos];
            existing.coeff += term.coeff;
            if existing.is_ignorable(symbols) {
                self.buckets[bucket].swap_remove(pos);
                self.len -= 1;
            }
            Ok(false)
        } else {
            self.buckets[bucket].push(term);
            self.len += 1;
            if self.load_factor() > self.max_load_factor {
                #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let needed = (self.len as f64 / self.max_load_factor).ceil() as usize;
                self.rehash(needed)?;
            }
            Ok(true)
        }
    }

    /// Moves all terms into a new bucket array with capacity at least
    /// `n_buckets` (rounded up to a power of two, minimum 1).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the new array cannot be allocated,
    /// or [`Error::Overflow`] if the requested capacity cannot be
    /// represented. The container is left empty on failure.
    pub fn rehash(&mut self, n_buckets: usize) -> Result<(), Error> {
        let Some(new_count) = n_buckets.max(1).checked_next_power_of_two() else {
            self.wipe();
            return Err(Error::Overflow);
        };
        if new_count == self.buckets.len() {
            return Ok(());
        }
        let mut new_buckets: Vec<Bucket<C, K>> = Vec::new();
        if new_buckets.try_reserve_exact(new_count).is_err() {
            self.wipe();
            return Err(Error::OutOfMemory);
        }
        new_buckets.resize_with(new_count, SmallVec::new);
        let old = std::mem::replace(&mut self.buckets, new_buckets);
        for term in old.into_iter().flatten() {
            let bucket = Self::bucket_for(&term.key, new_count)
                .expect("new bucket count is non-zero");
            self.buckets[bucket].push(term);
        }
        Ok(())
    }
}

impl<C, K> IntoIterator for TermSet<C, K> {
    type Item = Term<C, K>;
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Bucket<C, K>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::testkey::LabelKey;

    fn set() -> TermSet<i64, LabelKey> {
        TermSet::new()
    }

    #[test]
    fn empty_find_returns_none() {
        let s = set();
        assert!(s.find(&LabelKey(0)).is_none());
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn bucket_lookup_on_zero_capacity_is_an_error() {
        let s = set();
        assert_eq!(s.bucket_index(&LabelKey(1)), Err(Error::ZeroDivision));
    }

    #[test]
    fn insert_then_find() {
        let symbols = SymbolSet::new();
        let mut s = set();
        assert!(s.insert(Term::new(3, LabelKey(7)), &symbols).unwrap());
        let found = s.find(&LabelKey(7)).unwrap();
        assert_eq!(found.coeff, 3);
        assert!(s.find(&LabelKey(8)).is_none());
    }

    #[test]
    fn insert_combines_coefficients() {
        let symbols = SymbolSet::new();
        let mut s = set();
        assert!(s.insert(Term::new(3, LabelKey(7)), &symbols).unwrap());
        assert!(!s.insert(Term::new(4, LabelKey(7)), &symbols).unwrap());
        assert_eq!(s.len(), 1);
        assert_eq!(s.find(&LabelKey(7)).unwrap().coeff, 7);
    }

    #[test]
    fn cancellation_erases_the_term() {
        let symbols = SymbolSet::new();
        let mut s = set();
        s.insert(Term::new(5, LabelKey(1)), &symbols).unwrap();
        s.insert(Term::new(-5, LabelKey(1)), &symbols).unwrap();
        assert!(s.is_empty());
        assert!(s.find(&LabelKey(1)).is_none());
    }

    #[test]
    fn ignorable_terms_are_not_stored() {
        let symbols = SymbolSet::new();
        let mut s = set();
        assert!(!s.insert(Term::new(0, LabelKey(1)), &symbols).unwrap());
        assert!(s.is_empty());
    }

    #[test]
    fn load_factor_invariant_holds_under_growth() {
        let symbols = SymbolSet::new();
        let mut s = set();
        for i in 0..1000 {
            s.insert(Term::new(1, LabelKey(i)), &symbols).unwrap();
            assert!(s.load_factor() <= s.max_load_factor());
        }
        assert_eq!(s.len(), 1000);
        for i in 0..1000 {
            assert_eq!(s.find(&LabelKey(i)).unwrap().coeff, 1);
        }
    }

    #[test]
    fn rehash_preserves_contents() {
        let symbols = SymbolSet::new();
        let mut s = set();
        for i in 0..100 {
            s.insert(Term::new(i as i64, LabelKey(i)), &symbols).unwrap();
        }
        s.rehash(4096).unwrap();
        assert_eq!(s.bucket_count(), 4096);
        assert_eq!(s.len(), 100);
        for i in 1..100 {
            assert_eq!(s.find(&LabelKey(i)).unwrap().coeff, i as i64);
        }
    }

    #[test]
    fn rehash_rounds_up_to_a_power_of_two() {
        let mut s = set();
        s.rehash(1000).unwrap();
        assert_eq!(s.bucket_count(), 1024);
        s.rehash(1).unwrap();
        assert_eq!(s.bucket_count(), 1);
    }

    #[test]
    fn unique_insert_places_into_the_given_bucket() {
        let mut s = set();
        s.rehash(8).unwrap();
        let term = Term::new(2, LabelKey(5));
        let bucket = s.bucket_index(&term.key).unwrap();
        s.unique_insert(term, bucket);
        assert_eq!(s.len(), 1);
        assert_eq!(s.find(&LabelKey(5)).unwrap().coeff, 2);
    }

    #[test]
    fn bucket_for_is_stable_across_instances() {
        let mut a = set();
        let mut b = set();
        a.rehash(64).unwrap();
        b.rehash(64).unwrap();
        for i in 0..200 {
            assert_eq!(
                a.bucket_index(&LabelKey(i)).unwrap(),
                b.bucket_index(&LabelKey(i)).unwrap()
            );
        }
    }

    #[test]
    fn clear_keeps_bucket_capacity() {
        let symbols = SymbolSet::new();
        let mut s = set();
        for i in 0..50 {
            s.insert(Term::new(1, LabelKey(i)), &symbols).unwrap();
        }
        let buckets = s.bucket_count();
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.bucket_count(), buckets);
    }

    #[test]
    fn sparsity_histogram_accounts_for_every_bucket() {
        let symbols = SymbolSet::new();
        let mut s = set();
        for i in 0..32 {
            s.insert(Term::new(1, LabelKey(i * 1031)), &symbols).unwrap();
        }
        let histogram = s.evaluate_sparsity();
        assert_eq!(histogram.iter().sum::<usize>(), s.bucket_count());
        let terms: usize = histogram
            .iter()
            .enumerate()
            .map(|(chain_len, count)| chain_len * count)
            .sum();
        assert_eq!(terms, s.len());
    }

    #[test]
    fn into_iter_drains_all_terms() {
        let symbols = SymbolSet::new();
        let mut s = set();
        for i in 0..20 {
            s.insert(Term::new(1, LabelKey(i)), &symbols).unwrap();
        }
        let mut drained: Vec<u64> = s.into_iter().map(|t| t.key.0).collect();
        drained.sort_unstable();
        assert_eq!(drained, (0..20).collect::<Vec<_>>());
    }
}
