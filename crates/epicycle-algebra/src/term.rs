//! Terms and the coefficient/key contracts.
//!
//! A term is a coefficient–key pair. Coefficients come from a semiring and
//! only ever combine through their arithmetic; keys carry the structural part
//! (exponents, trigonometric multipliers) and define hashing, equality and
//! the key-multiplication rule.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{AddAssign, Neg, Sub};

use num_traits::{One, Zero};
use smallvec::SmallVec;

use crate::error::Error;
use crate::symbol::SymbolSet;

/// Largest number of product terms a single key multiplication may produce.
pub const MAX_ARITY: usize = 4;

/// Scratch storage for the products of one term-by-term multiplication.
///
/// Inline for every supported arity, so key products never allocate when the
/// key itself is inline.
pub type ProductBuf<C, K> = SmallVec<[Term<C, K>; MAX_ARITY]>;

/// Contract for series coefficients.
///
/// A coefficient is a semiring element: default-constructible to zero via
/// [`Zero`], with a multiplicative identity via [`One`], in-place addition,
/// subtraction and negation. Everything here is blanket-implemented, so any
/// type with the listed bounds is usable as a coefficient.
pub trait Coefficient:
    Clone
    + PartialEq
    + Debug
    + Send
    + Sync
    + Zero
    + One
    + Neg<Output = Self>
    + Sub<Output = Self>
    + AddAssign
{
}

impl<T> Coefficient for T where
    T: Clone
        + PartialEq
        + Debug
        + Send
        + Sync
        + Zero
        + One
        + Neg<Output = T>
        + Sub<Output = T>
        + AddAssign
{
}

/// In-place exact division by two.
///
/// Keys of arity greater than one split a product across several output terms
/// via angle-sum identities, each carrying half the coefficient product.
/// Coefficient types paired with such keys must implement this trait.
pub trait Halvable {
    /// Divides the value by two in place.
    fn halve(&mut self);
}

impl Halvable for f64 {
    fn halve(&mut self) {
        *self *= 0.5;
    }
}

/// Contract for series keys.
///
/// A key hashes and compares by content, knows whether it fits a symbol set,
/// and defines how two keys multiply. Multiplying two terms produces exactly
/// [`Key::ARITY`] output terms, written into a [`ProductBuf`].
pub trait Key<C: Coefficient>: Clone + Eq + Hash + Debug + Send + Sync + Sized {
    /// Number of product terms a single key multiplication produces.
    const ARITY: usize;

    /// Returns true if the key fits the given symbol set.
    fn is_compatible(&self, symbols: &SymbolSet) -> bool;

    /// Returns true if any term carrying this key is structurally zero.
    fn is_ignorable(&self, _symbols: &SymbolSet) -> bool {
        false
    }

    /// Multiplies `t1` by `t2`, appending exactly [`Key::ARITY`] product
    /// terms to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] if key arithmetic overflows.
    fn multiply(
        t1: &Term<C, Self>,
        t2: &Term<C, Self>,
        symbols: &SymbolSet,
        out: &mut ProductBuf<C, Self>,
    ) -> Result<(), Error>;

    /// Renders the key against a symbol set, for display purposes.
    fn render(&self, symbols: &SymbolSet) -> String;
}

/// A single coefficient–key pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Term<C, K> {
    /// The coefficient part.
    pub coeff: C,
    /// The key part.
    pub key: K,
}

impl<C: Coefficient, K: Key<C>> Term<C, K> {
    /// Creates a new term.
    #[must_use]
    pub fn new(coeff: C, key: K) -> Self {
        Self { coeff, key }
    }

    /// Returns true if the term contributes nothing to a series.
    #[must_use]
    pub fn is_ignorable(&self, symbols: &SymbolSet) -> bool {
        self.coeff.is_zero() || self.key.is_ignorable(symbols)
    }

    /// Returns true if the term's key fits the given symbol set.
    #[must_use]
    pub fn is_compatible(&self, symbols: &SymbolSet) -> bool {
        self.key.is_compatible(symbols)
    }
}


#[cfg(test)]
mod tests {
    use super::testkey::LabelKey;
    use super::*;

    #[test]
    fn ignorable_on_zero_coefficient() {
        let symbols = SymbolSet::new();
        let t = Term::new(0i64, LabelKey(3));
        assert!(t.is_ignorable(&symbols));
        let t = Term::new(2i64, LabelKey(3));
        assert!(!t.is_ignorable(&symbols));
    }

    #[test]
    fn multiply_produces_arity_terms() {
        let symbols = SymbolSet::new();
        let a = Term::new(2i64, LabelKey(1));
        let b = Term::new(3i64, LabelKey(4));
        let mut out = ProductBuf::new();
        LabelKey::multiply(&a, &b, &symbols, &mut out).unwrap();
        assert_eq!(out.len(), <LabelKey as Key<i64>>::ARITY);
        assert_eq!(out[0], Term::new(6i64, LabelKey(5)));
    }

    #[test]
    fn multiply_overflow_is_reported() {
        let symbols = SymbolSet::new();
        let a = Term::new(1i64, LabelKey(u64::MAX));
        let b = Term::new(1i64, LabelKey(1));
        let mut out = ProductBuf::new();
        assert_eq!(
            LabelKey::multiply(&a, &b, &symbols, &mut out),
            Err(Error::Overflow)
        );
    }
}
