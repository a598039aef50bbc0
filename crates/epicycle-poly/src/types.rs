//! Ready-made series types and term constructors.

use epicycle_algebra::{Coefficient, Halvable, Series, Term};

use crate::monomial::PackedMonomial;
use crate::trig::{TrigKey, TrigKind};

/// A sparse multivariate polynomial.
pub type Polynomial<C> = Series<C, PackedMonomial>;

/// A Poisson series: a sum of cosines and sines of integer combinations of
/// the symbols.
pub type PoissonSeries<C> = Series<C, TrigKey>;

/// Builds a polynomial term from a coefficient and exponents.
///
/// # Panics
///
/// Panics if the exponents do not fit a [`PackedMonomial`].
#[must_use]
pub fn monomial_term<C: Coefficient>(coeff: C, exponents: &[u32]) -> Term<C, PackedMonomial> {
    Term::new(coeff, PackedMonomial::from_exponents(exponents))
}

/// Builds a canonical `coeff · cos(n·θ)` term.
#[must_use]
pub fn cos_term<C>(coeff: C, multipliers: &[i32]) -> Term<C, TrigKey>
where
    C: Coefficient + Halvable,
{
    let (key, negate) = TrigKey::new(TrigKind::Cos, multipliers);
    Term::new(if negate { -coeff } else { coeff }, key)
}

/// Builds a canonical `coeff · sin(n·θ)` term.
#[must_use]
pub fn sin_term<C>(coeff: C, multipliers: &[i32]) -> Term<C, TrigKey>
where
    C: Coefficient + Halvable,
{
    let (key, negate) = TrigKey::new(TrigKind::Sin, multipliers);
    Term::new(if negate { -coeff } else { coeff }, key)
}
