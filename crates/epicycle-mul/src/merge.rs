//! Bucket-partitioned merge of per-worker accumulators.
//!
//! The merge never locks the target. Every source term is first staged as a
//! `(destination bucket, term)` record; the bucket is a pure function of the
//! key and the target's bucket count, so it can be computed without touching
//! the target. The staged records are then ordered by destination bucket and
//! split at the worker range boundaries; each worker receives the matching
//! records together with a disjoint `&mut` slice of the target's buckets.
//! No bucket is ever visible to two workers.
//!
//! Workers count their net insertions; the container size is fixed up once
//! after the join, and a final load-factor check rehashes if the pre-sizing
//! estimate fell short.

use rayon::prelude::*;

use epicycle_algebra::{Bucket, Coefficient, Error, Key, Series, Term, TermSet};

/// Drains `sources` into `target`.
///
/// Precondition: `target` has a non-zero bucket count, normally sized so
/// that all merges fit without rehash.
pub(crate) fn final_merge<C, K>(
    target: &mut Series<C, K>,
    sources: Vec<Series<C, K>>,
    n_threads: usize,
) -> Result<(), Error>
where
    C: Coefficient,
    K: Key<C>,
{
    debug_assert!(n_threads > 1);
    let bucket_count = target.container().bucket_count();
    debug_assert!(bucket_count > 0);
    let symbols = target.symbols().clone();

    // Stage every source term with its destination bucket, in parallel
    // across sources.
    let staged_per_source: Vec<Result<Vec<(usize, Term<C, K>)>, Error>> = sources
        .into_par_iter()
        .map(|source| {
            let (_, container) = source.into_parts();
            container
                .into_iter()
                .map(|term| {
                    let bucket = TermSet::<C, K>::bucket_for(&term.key, bucket_count)?;
                    Ok((bucket, term))
                })
                .collect()
        })
        .collect();
    let mut staged: Vec<(usize, Term<C, K>)> = Vec::new();
    for outcome in staged_per_source {
        staged.extend(outcome?);
    }

    // Order by destination bucket, then cut into one group per worker range.
    staged.par_sort_unstable_by_key(|(bucket, _)| *bucket);
    let block = bucket_count / n_threads;
    let ranges: Vec<std::ops::Range<usize>> = (0..n_threads)
        .map(|k| {
            let start = k * block;
            let end = if k == n_threads - 1 { bucket_count } else { start + block };
            start..end
        })
        .collect();
    let mut groups: Vec<Vec<(usize, Term<C, K>)>> = Vec::with_capacity(n_threads);
    let mut rest = staged;
    for range in ranges.iter().take(n_threads - 1) {
        let cut = rest.partition_point(|(bucket, _)| *bucket < range.end);
        let tail = rest.split_off(cut);
        groups.push(rest);
        rest = tail;
    }
    groups.push(rest);

    // Hand each worker its disjoint slice of target buckets.
    let container = target.container_mut();
    let len_before = container.len();
    let mut slices: Vec<&mut [Bucket<C, K>]> = Vec::with_capacity(n_threads);
    let mut buckets_rest = container.raw_buckets_mut();
    for range in ranges.iter().take(n_threads - 1) {
        let (head, tail) = buckets_rest.split_at_mut(range.len());
        slices.push(head);
        buckets_rest = tail;
    }
    slices.push(buckets_rest);
    let starts: Vec<usize> = ranges.iter().map(|r| r.start).collect();

    let delta: isize = slices
        .into_par_iter()
        .zip(groups.into_par_iter())
        .zip(starts.into_par_iter())
        .map(|((slice, group), start)| {
            let mut delta: isize = 0;
            for (bucket, term) in group {
                let chain = &mut slice[bucket - start];
                match chain.iter().position(|t| t.key == term.key) {
                    Some(pos) => {
                        chain[pos].coeff += term.coeff;
                        if chain[pos].is_ignorable(&symbols) {
                            chain.swap_remove(pos);
                            delta -= 1;
                        }
                    }
                    None => {
                        chain.push(term);
                        delta += 1;
                    }
                }
            }
            delta
        })
        .sum();

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    let new_len = (len_before as isize + delta) as usize;
    container.set_len(new_len);
    if container.load_factor() > container.max_load_factor() {
        #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let buckets = (new_len as f64 / container.max_load_factor()).ceil() as usize;
        container.rehash(buckets)?;
    }
    Ok(())
}
