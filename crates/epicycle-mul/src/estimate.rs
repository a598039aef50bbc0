//! Monte-Carlo estimation of the final term count.
//!
//! Multiplying random pairs drawn from two sparse operands produces its
//! first duplicate key after roughly the square root of the final term count
//! (the birthday bound). The estimator runs a handful of randomised sweeps,
//! records how many products arrive before the first non-growing insertion,
//! and squares the mean to recover the count. Products the truncator would
//! filter discount the estimate proportionally.
//!
//! All counters use checked arithmetic; overflow aborts the estimate and the
//! caller falls back to the un-sized insertion path.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use epicycle_algebra::{settings, Coefficient, Error, Key};

use crate::functor::MulFunctor;
use crate::truncate::Truncator;

/// Number of randomised sweeps.
const TRIALS: u64 = 10;

/// Sparsity multiplier absorbing the bias of the birthday model.
const MULTIPLIER: u64 = 4;

/// Smallest pair count for which pre-sizing pays for the estimate.
const MIN_WORK_FOR_ESTIMATE: u128 = 100_000;

fn integer_sqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let shift = (128 - n.leading_zeros()).div_ceil(2);
    let mut x = 1u128 << shift;
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Estimates the number of terms the full product of the functor's ranges
/// would contain.
///
/// The functor's target is used as scratch space and is left empty.
///
/// # Errors
///
/// Returns [`Error::Overflow`] if a counter or the final estimate cannot be
/// represented, and propagates multiplication failures.
pub fn estimate_final_series_size<C, K, T, const ACTIVE: bool>(
    f: &mut MulFunctor<'_, C, K, T, ACTIVE>,
) -> Result<usize, Error>
where
    C: Coefficient,
    K: Key<C>,
    T: Truncator<C, K>,
{
    let size1 = f.len1();
    let size2 = f.len2();
    if size1 == 0 || size2 == 0 {
        return Ok(0);
    }
    let arity = K::ARITY as u64;
    // Largest number of random products before which a duplicate must show
    // up, if the birthday model holds.
    let max_m = integer_sqrt(size1 as u128 * size2 as u128 / u128::from(MULTIPLIER));
    let mut idx1: Vec<usize> = (0..size1).collect();
    let mut idx2: Vec<usize> = (0..size2).collect();
    // One engine for the whole call keeps the estimate deterministic; each
    // worker owns its functor, so no state is shared across threads.
    let mut rng = ChaCha8Rng::seed_from_u64(settings::estimator_seed());
    let mut total: u64 = 0;
    let mut filtered: u64 = 0;
    for _ in 0..TRIALS {
        idx1.shuffle(&mut rng);
        idx2.shuffle(&mut rng);
        let mut count: u64 = 0;
        let mut count_filtered: u64 = 0;
        let mut i1 = 0usize;
        let mut i2 = 0usize;
        while u128::from(count) < max_m {
            if i1 == idx1.len() {
                // Each wrap of the first operand rotates the second by one,
                // so successive laps pair different indices.
                i1 = 0;
                idx2.rotate_right(1);
                i2 = 0;
            }
            if i2 == idx2.len() {
                i2 = 0;
            }
            f.multiply(idx1[i1], idx2[i2])?;
            // Insert unfiltered; the filtered fraction is tallied separately.
            f.insert::<false>()?;
            let new_count = count.checked_add(arity).ok_or(Error::Overflow)?;
            if f.target_len() as u64 != new_count {
                // First duplicate (or cancellation): the sweep is over.
                break;
            }
            count_filtered = count_filtered
                .checked_add(f.count_filtered() as u64)
                .ok_or(Error::Overflow)?;
            count = new_count;
            i1 += 1;
            i2 += 1;
        }
        total = total.checked_add(count).ok_or(Error::Overflow)?;
        filtered = filtered.checked_add(count_filtered).ok_or(Error::Overflow)?;
        f.clear_target();
    }
    if total == 0 {
        return Ok(0);
    }
    debug_assert!(total >= filtered);
    let mean = u128::from(total / TRIALS);
    let numerator = mean
        .checked_mul(mean)
        .and_then(|n| n.checked_mul(u128::from(MULTIPLIER)))
        .and_then(|n| n.checked_mul(u128::from(total - filtered)))
        .ok_or(Error::Overflow)?;
    usize::try_from(numerator / u128::from(total)).map_err(|_| Error::Overflow)
}

/// Pre-sizes the functor's target from a density estimate, when the pair
/// count makes the estimate worthwhile.
///
/// Returns the estimate on success. Estimation or rehash failures degrade to
/// the un-sized path: the target is cleared and `None` returned.
pub fn rehash_for_estimate<C, K, T, const ACTIVE: bool>(
    f: &mut MulFunctor<'_, C, K, T, ACTIVE>,
) -> Option<usize>
where
    C: Coefficient,
    K: Key<C>,
    T: Truncator<C, K>,
{
    let work = f.len1() as u128 * f.len2() as u128;
    if work < MIN_WORK_FOR_ESTIMATE {
        return None;
    }
    match estimate_final_series_size(f) {
        Ok(size) => {
            #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let buckets = (size as f64 / f.target_max_load_factor()).ceil() as usize;
            match f.rehash_target(buckets) {
                Ok(()) => Some(size),
                Err(_) => {
                    f.clear_target();
                    None
                }
            }
        }
        Err(_) => {
            f.clear_target();
            None
        }
    }
}
