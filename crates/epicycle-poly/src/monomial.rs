//! Exponent-packed polynomial monomial keys.
//!
//! Exponents are packed into a single u64 so that equality, hashing and
//! bucket placement operate on one word. Multiplying two monomials adds
//! exponents lane by lane, with an overflow check per lane.

use epicycle_algebra::{Coefficient, Error, Key, ProductBuf, SymbolSet, Term};

/// A bit-packed monomial key, one product term per key multiplication.
///
/// Each exponent gets 21 bits; up to [`PackedMonomial::MAX_VARS`] variables
/// fit in the word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct PackedMonomial(u64);

impl PackedMonomial {
    /// Bits per exponent.
    const BITS_PER_EXP: u32 = 21;
    /// Maximum variables that fit in the packed word.
    pub const MAX_VARS: usize = 3;
    /// Mask for a single exponent.
    const EXP_MASK: u64 = (1 << Self::BITS_PER_EXP) - 1;

    /// Creates the monomial 1 (all exponents zero).
    #[must_use]
    pub const fn unit() -> Self {
        Self(0)
    }

    /// Creates the monomial `x_i`.
    ///
    /// # Panics
    ///
    /// Panics unless `i < num_vars <= MAX_VARS`.
    #[must_use]
    pub fn var(i: usize, num_vars: usize) -> Self {
        assert!(i < num_vars);
        assert!(num_vars <= Self::MAX_VARS);
        Self(1 << (i as u32 * Self::BITS_PER_EXP))
    }

    /// Creates a monomial from exponents.
    ///
    /// # Panics
    ///
    /// Panics if more than [`PackedMonomial::MAX_VARS`] exponents are given
    /// or an exponent does not fit its lane.
    #[must_use]
    pub fn from_exponents(exps: &[u32]) -> Self {
        assert!(exps.len() <= Self::MAX_VARS);
        let mut packed = 0u64;
        for (i, &e) in exps.iter().enumerate() {
            assert!(u64::from(e) <= Self::EXP_MASK);
            packed |= u64::from(e) << (i as u32 * Self::BITS_PER_EXP);
        }
        Self(packed)
    }

    /// Returns the exponent of variable `i`.
    #[must_use]
    pub fn exponent(&self, i: usize) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let e = (self.0 >> (i as u32 * Self::BITS_PER_EXP)) & Self::EXP_MASK;
        e as u32
    }

    /// Computes the total degree over the first `num_vars` variables.
    #[must_use]
    pub fn total_degree(&self, num_vars: usize) -> u32 {
        (0..num_vars).map(|i| self.exponent(i)).sum()
    }

    /// Multiplies two monomials by adding exponents lane by lane.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] if any exponent sum does not fit its
    /// lane.
    pub fn try_mul(&self, other: &Self, num_vars: usize) -> Result<Self, Error> {
        let mut packed = 0u64;
        for i in 0..num_vars {
            let e = u64::from(self.exponent(i)) + u64::from(other.exponent(i));
            if e > Self::EXP_MASK {
                return Err(Error::Overflow);
            }
            packed |= e << (i as u32 * Self::BITS_PER_EXP);
        }
        Ok(Self(packed))
    }
}

impl<C: Coefficient> Key<C> for PackedMonomial {
    const ARITY: usize = 1;

    fn is_compatible(&self, symbols: &SymbolSet) -> bool {
        let n = symbols.len();
        n <= Self::MAX_VARS && (n..Self::MAX_VARS).all(|i| self.exponent(i) == 0)
    }

    fn multiply(
        t1: &Term<C, Self>,
        t2: &Term<C, Self>,
        symbols: &SymbolSet,
        out: &mut ProductBuf<C, Self>,
    ) -> Result<(), Error> {
        let key = t1.key.try_mul(&t2.key, symbols.len())?;
        out.push(Term::new(t1.coeff.clone() * t2.coeff.clone(), key));
        Ok(())
    }

    fn render(&self, symbols: &SymbolSet) -> String {
        let mut parts = Vec::new();
        for i in 0..symbols.len() {
            let e = self.exponent(i);
            if e > 0 {
                let name = symbols.name(i).unwrap_or("?");
                if e == 1 {
                    parts.push(name.to_string());
                } else {
                    parts.push(format!("{name}^{e}"));
                }
            }
        }
        if parts.is_empty() {
            "1".to_string()
        } else {
            parts.join("*")
        }
    }
}
