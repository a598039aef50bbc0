//! # epicycle-algebra
//!
//! Foundation types for the epicycle sparse series engine.
//!
//! This crate provides:
//! - Ordered symbol sets shared by series operands
//! - The [`Coefficient`] and [`Key`] contracts term types implement
//! - [`TermSet`]: the hashed accumulator partial products are combined into
//! - [`Series`]: a symbol set plus a keyed multiset of terms
//! - Process-global engine settings read atomically on hot paths

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod series;
pub mod settings;
pub mod symbol;
pub mod term;
pub mod term_set;

pub use error::Error;
pub use series::Series;
pub use symbol::SymbolSet;
pub use term::{Coefficient, Halvable, Key, ProductBuf, Term, MAX_ARITY};
pub use term_set::{Bucket, TermSet};
