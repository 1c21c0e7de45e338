//! Benchmark inputs and baselines for the tidyset containers.
//!
//! - [`random_keys`]: deterministic pseudo-random keys from a seed
//! - [`sorted_keys`]: the same keys, sorted and deduplicated
//! - [`SortedVec`]: a plain `Vec` kept sorted with `partition_point`, the
//!   baseline a flat set has to beat

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate `n` keys in `[0, range)` from a seeded ChaCha8 stream.
///
/// The same `(n, range, seed)` always yields the same keys, so runs are
/// comparable across machines.
pub fn random_keys(n: usize, range: u64, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.next_u64() % range.max(1)).collect()
}

/// [`random_keys`], sorted with duplicates removed.
pub fn sorted_keys(n: usize, range: u64, seed: u64) -> Vec<u64> {
    let mut keys = random_keys(n, range, seed);
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Sorted, duplicate-free `Vec` baseline.
#[derive(Clone, Debug, Default)]
pub struct SortedVec<T> {
    items: Vec<T>,
}

impl<T: Ord> SortedVec<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert `value` unless an equal one is present.
    pub fn insert(&mut self, value: T) -> bool {
        let p = self.items.partition_point(|e| *e < value);
        if self.items.get(p) == Some(&value) {
            return false;
        }
        self.items.insert(p, value);
        true
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.binary_search(value).is_ok()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
