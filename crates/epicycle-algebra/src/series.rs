//! Series: a symbol set plus a hashed multiset of terms.
//!
//! A series owns its symbol set and a [`TermSet`] container. Insertion keeps
//! the container canonical: every stored key is compatible with the symbol
//! set, no stored term is ignorable, and coefficients of equal keys are
//! combined.

use std::fmt;

use crate::error::Error;
use crate::symbol::SymbolSet;
use crate::term::{Coefficient, Key, Term};
use crate::term_set::TermSet;

/// A sparse algebraic series over a symbol set.
#[derive(Clone, Debug)]
pub struct Series<C, K> {
    symbols: SymbolSet,
    container: TermSet<C, K>,
}

impl<C, K> Series<C, K> {
    /// Creates an empty series over the given symbol set.
    #[must_use]
    pub fn new(symbols: SymbolSet) -> Self {
        Self {
            symbols,
            container: TermSet::new(),
        }
    }

    /// Returns the symbol set.
    #[must_use]
    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Returns the term container.
    #[must_use]
    pub fn container(&self) -> &TermSet<C, K> {
        &self.container
    }

    /// Returns the term container mutably.
    ///
    /// Low-level: callers are responsible for keeping the container
    /// canonical with respect to the symbol set.
    pub fn container_mut(&mut self) -> &mut TermSet<C, K> {
        &mut self.container
    }

    /// Consumes the series into its symbol set and container.
    #[must_use]
    pub fn into_parts(self) -> (SymbolSet, TermSet<C, K>) {
        (self.symbols, self.container)
    }

    /// Returns the number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.container.len()
    }

    /// Returns true if the series is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    /// Iterates over the terms in container order.
    pub fn iter(&self) -> impl Iterator<Item = &Term<C, K>> {
        self.container.iter()
    }

    /// Removes all terms.
    pub fn clear(&mut self) {
        self.container.clear();
    }
}

impl<C: Coefficient, K: Key<C>> Series<C, K> {
    /// Builds a series from terms, combining equal keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleTerm`] if any key does not fit the
    /// symbol set, and propagates container errors.
    pub fn from_terms<I>(symbols: SymbolSet, terms: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Term<C, K>>,
    {
        let mut series = Self::new(symbols);
        for term in terms {
            series.insert(term)?;
        }
        Ok(series)
    }

    /// Inserts a term, combining coefficients with an existing term of equal
    /// key and erasing the result if it cancels.
    ///
    /// Returns true if the term count strictly grew.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleTerm`] if the key does not fit the
    /// symbol set, and propagates container errors.
    pub fn insert(&mut self, term: Term<C, K>) -> Result<bool, Error> {
        if !term.is_compatible(&self.symbols) {
            return Err(Error::IncompatibleTerm);
        }
        self.container.insert(term, &self.symbols)
    }

    /// Looks up the term with an equal key.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&Term<C, K>> {
        self.container.find(key)
    }
}

impl<C: Coefficient, K: Key<C>> PartialEq for Series<C, K> {
    /// Multiset equality: same symbols, same terms, regardless of bucket
    /// layout.
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
            && self.len() == other.len()
            && self
                .iter()
                .all(|t| other.find(&t.key).is_some_and(|o| o.coeff == t.coeff))
    }
}

impl<C: Coefficient, K: Key<C>> fmt::Display for Series<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        let mut parts: Vec<String> = self
            .iter()
            .map(|t| {
                let key = t.key.render(&self.symbols);
                if key == "1" {
                    format!("{:?}", t.coeff)
                } else {
                    format!("{:?}*{key}", t.coeff)
                }
            })
            .collect();
        parts.sort();
        write!(f, "{}", parts.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::testkey::LabelKey;

    #[test]
    fn from_terms_combines_and_cancels() {
        let symbols = SymbolSet::from_names(["x"]);
        let series = Series::from_terms(
            symbols,
            [
                Term::new(2i64, LabelKey(0)),
                Term::new(3, LabelKey(1)),
                Term::new(-2, LabelKey(0)),
            ],
        )
        .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.find(&LabelKey(1)).unwrap().coeff, 3);
    }

    #[test]
    fn multiset_equality_ignores_insertion_order() {
        let symbols = SymbolSet::from_names(["x"]);
        let a = Series::from_terms(
            symbols.clone(),
            [Term::new(1i64, LabelKey(0)), Term::new(2, LabelKey(1))],
        )
        .unwrap();
        let b = Series::from_terms(
            symbols,
            [Term::new(2i64, LabelKey(1)), Term::new(1, LabelKey(0))],
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn equality_distinguishes_symbol_sets() {
        let a = Series::<i64, LabelKey>::new(SymbolSet::from_names(["x"]));
        let b = Series::<i64, LabelKey>::new(SymbolSet::from_names(["y"]));
        assert_ne!(a, b);
    }

    #[test]
    fn display_zero() {
        let series = Series::<i64, LabelKey>::new(SymbolSet::new());
        assert_eq!(series.to_string(), "0");
    }
}
