//! Total-degree truncation for polynomial series.

use std::cmp::Ordering;

use epicycle_algebra::{Coefficient, Term};
use epicycle_mul::Truncator;

use crate::monomial::PackedMonomial;

/// Skipping truncator keeping only terms of total degree up to a limit.
///
/// Operands sorted by ascending total degree make the skip bound monotone:
/// once `deg(t1) + deg(t2)` exceeds the limit for some `t2`, it does for
/// every later `t2` as well.
#[derive(Clone, Copy, Debug)]
pub struct TotalDegreeTruncator {
    limit: u32,
}

impl TotalDegreeTruncator {
    /// Creates a truncator keeping total degrees up to `limit`.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    /// Returns the degree limit.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn degree<C>(term: &Term<C, PackedMonomial>) -> u32 {
        term.key.total_degree(PackedMonomial::MAX_VARS)
    }
}

impl<C: Coefficient> Truncator<C, PackedMonomial> for TotalDegreeTruncator {
    const IS_SKIPPING: bool = true;
    const IS_FILTERING: bool = true;

    fn is_active(&self) -> bool {
        true
    }

    fn compare_terms(
        &self,
        a: &Term<C, PackedMonomial>,
        b: &Term<C, PackedMonomial>,
    ) -> Ordering {
        Self::degree(a).cmp(&Self::degree(b))
    }

    fn skip(&self, t1: &Term<C, PackedMonomial>, t2: &Term<C, PackedMonomial>) -> bool {
        Self::degree(t1) + Self::degree(t2) > self.limit
    }

    fn filter(&self, t: &Term<C, PackedMonomial>) -> bool {
        Self::degree(t) > self.limit
    }
}
