//! Trigonometric keys for Poisson series.
//!
//! A key stands for `cos(n·θ)` or `sin(n·θ)`, where `n` is a vector of
//! integer multipliers over the symbol set (one entry per symbol). The
//! product of two keys splits across the product-to-sum identities:
//!
//! ```text
//! cos a · cos b = (cos(a−b) + cos(a+b)) / 2
//! sin a · sin b = (cos(a−b) − cos(a+b)) / 2
//! sin a · cos b = (sin(a+b) + sin(a−b)) / 2
//! cos a · sin b = (sin(a+b) − sin(a−b)) / 2
//! ```
//!
//! so the key has arity 2 and requires coefficients that can be halved.
//! Keys are kept canonical: the first non-zero multiplier is positive, with
//! the sign folded into the coefficient for sines (`sin(−a) = −sin a`).

use smallvec::SmallVec;

use epicycle_algebra::{Coefficient, Error, Halvable, Key, ProductBuf, SymbolSet, Term};

/// Whether a trigonometric key is a cosine or a sine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TrigKind {
    /// `cos(n·θ)`
    Cos,
    /// `sin(n·θ)`
    Sin,
}

type Multipliers = SmallVec<[i32; 4]>;

/// A trigonometric key: `cos` or `sin` of an integer combination of the
/// symbols.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TrigKey {
    multipliers: Multipliers,
    kind: TrigKind,
}

impl TrigKey {
    /// Creates a canonical key from multipliers.
    ///
    /// Returns the key together with a flag telling the caller to negate the
    /// coefficient (true only for sines whose multiplier vector had to be
    /// flipped).
    ///
    /// # Panics
    ///
    /// Panics if a multiplier is `i32::MIN` (its negation is not
    /// representable).
    #[must_use]
    pub fn new(kind: TrigKind, multipliers: &[i32]) -> (Self, bool) {
        Self::canonical(kind, multipliers.iter().copied().collect())
            .expect("multiplier negation overflowed")
    }

    fn canonical(kind: TrigKind, mut multipliers: Multipliers) -> Option<(Self, bool)> {
        let flip = multipliers
            .iter()
            .find(|&&m| m != 0)
            .is_some_and(|&m| m < 0);
        if flip {
            for m in &mut multipliers {
                *m = m.checked_neg()?;
            }
        }
        let negate = flip && kind == TrigKind::Sin;
        Some((Self { multipliers, kind }, negate))
    }

    /// Returns the multiplier vector.
    #[must_use]
    pub fn multipliers(&self) -> &[i32] {
        &self.multipliers
    }

    /// Returns the cos/sin flavour.
    #[must_use]
    pub fn kind(&self) -> TrigKind {
        self.kind
    }
}

fn push_product<C>(
    out: &mut ProductBuf<C, TrigKey>,
    coeff: C,
    kind: TrigKind,
    multipliers: Multipliers,
) -> Result<(), Error>
where
    C: Coefficient + Halvable,
{
    let (key, negate) = TrigKey::canonical(kind, multipliers).ok_or(Error::Overflow)?;
    out.push(Term::new(if negate { -coeff } else { coeff }, key));
    Ok(())
}

impl<C: Coefficient + Halvable> Key<C> for TrigKey {
    const ARITY: usize = 2;

    fn is_compatible(&self, symbols: &SymbolSet) -> bool {
        self.multipliers.len() == symbols.len()
    }

    fn is_ignorable(&self, _symbols: &SymbolSet) -> bool {
        // sin(0) contributes nothing; cos(0) is the constant term.
        self.kind == TrigKind::Sin && self.multipliers.iter().all(|&m| m == 0)
    }

    fn multiply(
        t1: &Term<C, Self>,
        t2: &Term<C, Self>,
        symbols: &SymbolSet,
        out: &mut ProductBuf<C, Self>,
    ) -> Result<(), Error> {
        debug_assert_eq!(t1.key.multipliers.len(), symbols.len());
        debug_assert_eq!(t2.key.multipliers.len(), symbols.len());
        let mut coeff = t1.coeff.clone() * t2.coeff.clone();
        coeff.halve();
        let n = t1.key.multipliers.len();
        let mut plus = Multipliers::with_capacity(n);
        let mut minus = Multipliers::with_capacity(n);
        for i in 0..n {
            let a = t1.key.multipliers[i];
            let b = t2.key.multipliers[i];
            plus.push(a.checked_add(b).ok_or(Error::Overflow)?);
            minus.push(a.checked_sub(b).ok_or(Error::Overflow)?);
        }
        use TrigKind::{Cos, Sin};
        match (t1.key.kind, t2.key.kind) {
            (Cos, Cos) => {
                push_product(out, coeff.clone(), Cos, minus)?;
                push_product(out, coeff, Cos, plus)?;
            }
            (Sin, Sin) => {
                push_product(out, coeff.clone(), Cos, minus)?;
                push_product(out, -coeff, Cos, plus)?;
            }
            (Sin, Cos) => {
                push_product(out, coeff.clone(), Sin, plus)?;
                push_product(out, coeff, Sin, minus)?;
            }
            (Cos, Sin) => {
                push_product(out, coeff.clone(), Sin, plus)?;
                push_product(out, -coeff, Sin, minus)?;
            }
        }
        Ok(())
    }

    fn render(&self, symbols: &SymbolSet) -> String {
        let mut arg = String::new();
        for (i, &m) in self.multipliers.iter().enumerate() {
            if m == 0 {
                continue;
            }
            if arg.is_empty() {
                if m < 0 {
                    arg.push('-');
                }
            } else {
                arg.push_str(if m < 0 { " - " } else { " + " });
            }
            let magnitude = m.unsigned_abs();
            if magnitude != 1 {
                arg.push_str(&format!("{magnitude}*"));
            }
            arg.push_str(symbols.name(i).unwrap_or("?"));
        }
        if arg.is_empty() {
            arg.push('0');
        }
        let head = match self.kind {
            TrigKind::Cos => "cos",
            TrigKind::Sin => "sin",
        };
        format!("{head}({arg})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;

    fn q(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    #[test]
    fn canonical_sign() {
        let (cos, negate) = TrigKey::new(TrigKind::Cos, &[-1, 2]);
        assert_eq!(cos.multipliers(), &[1, -2]);
        assert!(!negate);
        let (sin, negate) = TrigKey::new(TrigKind::Sin, &[-1, 2]);
        assert_eq!(sin.multipliers(), &[1, -2]);
        assert!(negate);
        let (zero, negate) = TrigKey::new(TrigKind::Sin, &[0, 0]);
        assert_eq!(zero.multipliers(), &[0, 0]);
        assert!(!negate);
    }

    #[test]
    fn sin_zero_is_ignorable() {
        let symbols = SymbolSet::from_names(["x", "y"]);
        let (sin0, _) = TrigKey::new(TrigKind::Sin, &[0, 0]);
        let (cos0, _) = TrigKey::new(TrigKind::Cos, &[0, 0]);
        assert!(<TrigKey as Key<Rational>>::is_ignorable(&sin0, &symbols));
        assert!(!<TrigKey as Key<Rational>>::is_ignorable(&cos0, &symbols));
    }

    #[test]
    fn cos_times_cos() {
        // cos(x)·cos(y) = cos(x−y)/2 + cos(x+y)/2
        let symbols = SymbolSet::from_names(["x", "y"]);
        let (cx, _) = TrigKey::new(TrigKind::Cos, &[1, 0]);
        let (cy, _) = TrigKey::new(TrigKind::Cos, &[0, 1]);
        let t1 = Term::new(q(1, 1), cx);
        let t2 = Term::new(q(1, 1), cy);
        let mut out = ProductBuf::new();
        TrigKey::multiply(&t1, &t2, &symbols, &mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].key, TrigKey::new(TrigKind::Cos, &[1, -1]).0);
        assert_eq!(out[0].coeff, q(1, 2));
        assert_eq!(out[1].key, TrigKey::new(TrigKind::Cos, &[1, 1]).0);
        assert_eq!(out[1].coeff, q(1, 2));
    }

    #[test]
    fn sin_times_sin_flips_the_sum_sign() {
        // sin(x)·sin(x) = cos(0)/2 − cos(2x)/2
        let symbols = SymbolSet::from_names(["x"]);
        let (sx, _) = TrigKey::new(TrigKind::Sin, &[1]);
        let t = Term::new(q(1, 1), sx);
        let mut out = ProductBuf::new();
        TrigKey::multiply(&t, &t, &symbols, &mut out).unwrap();
        assert_eq!(out[0].key, TrigKey::new(TrigKind::Cos, &[0]).0);
        assert_eq!(out[0].coeff, q(1, 2));
        assert_eq!(out[1].key, TrigKey::new(TrigKind::Cos, &[2]).0);
        assert_eq!(out[1].coeff, q(-1, 2));
    }

    #[test]
    fn mixed_products_stay_antisymmetric() {
        // sin(x)·cos(y) + cos(y)·sin(x) = sin(x+y) + sin(x−y)
        let symbols = SymbolSet::from_names(["x", "y"]);
        let (sx, _) = TrigKey::new(TrigKind::Sin, &[1, 0]);
        let (cy, _) = TrigKey::new(TrigKind::Cos, &[0, 1]);
        let ts = Term::new(q(1, 1), sx);
        let tc = Term::new(q(1, 1), cy);
        let mut sc = ProductBuf::new();
        TrigKey::multiply(&ts, &tc, &symbols, &mut sc).unwrap();
        let mut cs = ProductBuf::new();
        TrigKey::multiply(&tc, &ts, &symbols, &mut cs).unwrap();
        // Both orders must agree term for term once canonicalised.
        for product in sc.iter() {
            let twin = cs.iter().find(|t| t.key == product.key).unwrap();
            assert_eq!(twin.coeff, product.coeff);
        }
    }

    #[test]
    fn multiplier_overflow_is_detected() {
        let symbols = SymbolSet::from_names(["x"]);
        let (big, _) = TrigKey::new(TrigKind::Cos, &[i32::MAX]);
        let t = Term::new(q(1, 1), big);
        let mut out = ProductBuf::new();
        assert_eq!(
            TrigKey::multiply(&t, &t, &symbols, &mut out),
            Err(Error::Overflow)
        );
    }

    #[test]
    fn rendering() {
        let symbols = SymbolSet::from_names(["x", "y"]);
        let (k, _) = TrigKey::new(TrigKind::Cos, &[1, -2]);
        assert_eq!(
            <TrigKey as Key<Rational>>::render(&k, &symbols),
            "cos(x - 2*y)"
        );
        let (k0, _) = TrigKey::new(TrigKind::Cos, &[0, 0]);
        assert_eq!(<TrigKey as Key<Rational>>::render(&k0, &symbols), "cos(0)");
    }
}
