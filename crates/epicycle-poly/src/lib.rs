//! # epicycle-poly
//!
//! Concrete term types for the epicycle series engine:
//! - [`Rational`]: exact rational coefficients
//! - [`PackedMonomial`]: exponent-packed polynomial keys (one product term
//!   per key multiplication)
//! - [`TrigKey`]: trigonometric Poisson keys (two product terms per key
//!   multiplication, via the product-to-sum identities)
//! - [`TotalDegreeTruncator`]: degree-cutoff truncation for polynomials

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod degree;
pub mod monomial;
pub mod rational;
pub mod trig;
pub mod types;

#[cfg(test)]
mod proptests;

pub use degree::TotalDegreeTruncator;
pub use monomial::PackedMonomial;
pub use rational::Rational;
pub use trig::{TrigKey, TrigKind};
pub use types::{cos_term, monomial_term, sin_term, PoissonSeries, Polynomial};
