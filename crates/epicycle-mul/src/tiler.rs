//! Blocked iteration over term pairs.
//!
//! Pairs `(i, j)` are walked in row-major order within square tiles so that
//! the two slabs of term pointers being combined stay resident in cache.
//! The remainder strips to the right of and below the tiled region, and the
//! corner, are swept afterwards.
//!
//! Within a row, the inner loop breaks at the first skippable pair: with an
//! active skipping truncator both operands are sorted by the truncator's
//! order, so every later pair of the row is skippable too.

use epicycle_algebra::{Coefficient, Error, Key};

use crate::functor::MulFunctor;
use crate::truncate::Truncator;

/// Side length of a tile of term pairs.
pub const BLOCK_SIZE: usize = 256;

/// Runs every non-pruned pair of the functor's ranges through
/// multiplication and insertion.
///
/// # Errors
///
/// Propagates multiplication and insertion failures.
pub fn blocked_multiplication<C, K, T, const ACTIVE: bool>(
    f: &mut MulFunctor<'_, C, K, T, ACTIVE>,
) -> Result<(), Error>
where
    C: Coefficient,
    K: Key<C>,
    T: Truncator<C, K>,
{
    let size1 = f.len1();
    let size2 = f.len2();
    let nblocks1 = size1 / BLOCK_SIZE;
    let nblocks2 = size2 / BLOCK_SIZE;
    // Start of the irregular (remainder) ranges.
    let i_ir_start = nblocks1 * BLOCK_SIZE;
    let j_ir_start = nblocks2 * BLOCK_SIZE;
    for n1 in 0..nblocks1 {
        let i_start = n1 * BLOCK_SIZE;
        let i_end = i_start + BLOCK_SIZE;
        // Regular tiles.
        for n2 in 0..nblocks2 {
            let j_start = n2 * BLOCK_SIZE;
            let j_end = j_start + BLOCK_SIZE;
            for i in i_start..i_end {
                for j in j_start..j_end {
                    if f.skip(i, j) {
                        break;
                    }
                    f.multiply(i, j)?;
                    f.insert::<true>()?;
                }
            }
        }
        // Regular rows against the right remainder.
        for i in i_start..i_end {
            for j in j_ir_start..size2 {
                if f.skip(i, j) {
                    break;
                }
                f.multiply(i, j)?;
                f.insert::<true>()?;
            }
        }
    }
    // Bottom remainder against the regular columns.
    for n2 in 0..nblocks2 {
        let j_start = n2 * BLOCK_SIZE;
        let j_end = j_start + BLOCK_SIZE;
        for i in i_ir_start..size1 {
            for j in j_start..j_end {
                if f.skip(i, j) {
                    break;
                }
                f.multiply(i, j)?;
                f.insert::<true>()?;
            }
        }
    }
    // The corner.
    for i in i_ir_start..size1 {
        for j in j_ir_start..size2 {
            if f.skip(i, j) {
                break;
            }
            f.multiply(i, j)?;
            f.insert::<true>()?;
        }
    }
    Ok(())
}
