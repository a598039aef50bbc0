//! Property-based tests for series multiplication.

use proptest::prelude::*;

use epicycle_algebra::{Key, SymbolSet};
use epicycle_mul::{NullTruncator, SeriesMultiplier};

use crate::monomial::PackedMonomial;
use crate::types::{monomial_term, Polynomial};

fn symbols() -> SymbolSet {
    SymbolSet::from_names(["x", "y"])
}

// Strategy for small two-variable polynomials with i64 coefficients.
fn small_poly() -> impl Strategy<Value = Polynomial<i64>> {
    proptest::collection::vec(((0u32..8, 0u32..8), -50i64..50), 0..8).prop_map(|terms| {
        Polynomial::from_terms(
            symbols(),
            terms
                .into_iter()
                .map(|((e1, e2), c)| monomial_term(c, &[e1, e2])),
        )
        .unwrap()
    })
}

fn mul(a: &Polynomial<i64>, b: &Polynomial<i64>) -> Polynomial<i64> {
    SeriesMultiplier::new(a, b)
        .unwrap()
        .multiply(&NullTruncator)
        .unwrap()
}

proptest! {
    #[test]
    fn mul_commutative(a in small_poly(), b in small_poly()) {
        prop_assert_eq!(mul(&a, &b), mul(&b, &a));
    }

    #[test]
    fn mul_associative(a in small_poly(), b in small_poly(), c in small_poly()) {
        prop_assert_eq!(mul(&mul(&a, &b), &c), mul(&a, &mul(&b, &c)));
    }

    #[test]
    fn mul_by_zero_is_zero(a in small_poly()) {
        let zero = Polynomial::<i64>::new(symbols());
        prop_assert!(mul(&a, &zero).is_empty());
        prop_assert!(mul(&zero, &a).is_empty());
    }

    #[test]
    fn mul_by_one_is_identity(a in small_poly()) {
        let one = Polynomial::from_terms(symbols(), [monomial_term(1i64, &[0, 0])]).unwrap();
        prop_assert_eq!(mul(&a, &one), a.clone());
        prop_assert_eq!(mul(&one, &a), a);
    }

    #[test]
    fn product_size_is_bounded(a in small_poly(), b in small_poly()) {
        let product = mul(&a, &b);
        let arity = <PackedMonomial as Key<i64>>::ARITY;
        prop_assert!(product.len() <= a.len() * b.len() * arity);
    }

    #[test]
    fn container_invariant_after_multiplication(a in small_poly(), b in small_poly()) {
        let product = mul(&a, &b);
        let container = product.container();
        prop_assert!(container.load_factor() <= container.max_load_factor());
        for term in product.iter() {
            prop_assert_eq!(&container.find(&term.key).unwrap().coeff, &term.coeff);
        }
    }
}
