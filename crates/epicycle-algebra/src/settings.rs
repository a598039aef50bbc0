//! Process-global engine settings.
//!
//! The multiplier reads these values on every call, so they are stored in
//! atomics rather than behind a lock. Setters exist for tuning and tests;
//! values apply to multiplications started after the store.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;

/// Upper bound on worker threads per multiplication; 0 means one per CPU.
static MAX_THREADS: AtomicUsize = AtomicUsize::new(0);

/// Minimum term-by-term multiplications each worker must be given.
static MIN_WORK_PER_THREAD: AtomicU64 = AtomicU64::new(100_000);

/// Maximum load factor of term containers, stored as f64 bits (default 1.0).
static MAX_LOAD_FACTOR: AtomicU64 = AtomicU64::new(0x3FF0_0000_0000_0000);

/// Seed for the density estimator's random engine.
static ESTIMATOR_SEED: AtomicU64 = AtomicU64::new(42);

/// Returns the maximum number of worker threads per multiplication.
///
/// When unset (or set to 0), resolves to the number of available CPUs.
#[must_use]
pub fn max_threads() -> usize {
    match MAX_THREADS.load(Ordering::Relaxed) {
        0 => thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        n => n,
    }
}

/// Sets the maximum number of worker threads; 0 restores auto-detection.
pub fn set_max_threads(n: usize) {
    MAX_THREADS.store(n, Ordering::Relaxed);
}

/// Returns the minimum amount of work (pair multiplications) per thread.
#[must_use]
pub fn min_work_per_thread() -> u64 {
    MIN_WORK_PER_THREAD.load(Ordering::Relaxed).max(1)
}

/// Sets the minimum amount of work per thread (clamped to at least 1).
pub fn set_min_work_per_thread(work: u64) {
    MIN_WORK_PER_THREAD.store(work.max(1), Ordering::Relaxed);
}

/// Returns the maximum load factor new term containers are built with.
#[must_use]
pub fn max_load_factor() -> f64 {
    f64::from_bits(MAX_LOAD_FACTOR.load(Ordering::Relaxed))
}

/// Sets the maximum load factor for new term containers.
///
/// # Panics
///
/// Panics unless `factor` is finite and positive.
pub fn set_max_load_factor(factor: f64) {
    assert!(factor.is_finite() && factor > 0.0, "load factor must be finite and positive");
    MAX_LOAD_FACTOR.store(factor.to_bits(), Ordering::Relaxed);
}

/// Returns the seed used by the density estimator's random engine.
#[must_use]
pub fn estimator_seed() -> u64 {
    ESTIMATOR_SEED.load(Ordering::Relaxed)
}

/// Sets the density estimator seed.
pub fn set_estimator_seed(seed: u64) {
    ESTIMATOR_SEED.store(seed, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert!(max_threads() >= 1);
        assert_eq!(min_work_per_thread(), 100_000);
        assert!((max_load_factor() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn round_trips() {
        set_estimator_seed(7);
        assert_eq!(estimator_seed(), 7);
        set_estimator_seed(42);
    }
}
