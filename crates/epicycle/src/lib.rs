//! # Epicycle
//!
//! Sparse algebraic series arithmetic for Rust.
//!
//! Epicycle represents a series as a sum of coefficient–key terms over a
//! shared symbol set and multiplies two of them with a parallel term-by-term
//! engine: cache-sized pair tiling, truncation-aware skipping, Monte-Carlo
//! pre-sizing of the hashed accumulator and a bucket-partitioned merge of
//! per-worker results.
//!
//! ## Quick start
//!
//! ```rust
//! use epicycle::prelude::*;
//!
//! let symbols = SymbolSet::from_names(["x"]);
//! // (x + 1)·(x − 1)
//! let a = Polynomial::from_terms(
//!     symbols.clone(),
//!     [monomial_term(1i64, &[1]), monomial_term(1, &[0])],
//! )
//! .unwrap();
//! let b = Polynomial::from_terms(
//!     symbols,
//!     [monomial_term(1i64, &[1]), monomial_term(-1, &[0])],
//! )
//! .unwrap();
//! let product = SeriesMultiplier::new(&a, &b)
//!     .unwrap()
//!     .multiply(&NullTruncator)
//!     .unwrap();
//! assert_eq!(product.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use epicycle_algebra as algebra;
pub use epicycle_mul as mul;
pub use epicycle_poly as poly;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use epicycle_algebra::{settings, Error, Series, SymbolSet, Term};
    pub use epicycle_mul::{NullTruncator, SeriesMultiplier, Truncator};
    pub use epicycle_poly::{
        cos_term, monomial_term, sin_term, PackedMonomial, PoissonSeries, Polynomial, Rational,
        TotalDegreeTruncator, TrigKey, TrigKind,
    };
}
