//! Chained hash table keyed by strings.
//!
//! Used for incident lookup by id and by location, and for the resource
//! pool. Keys hash with a polynomial rolling hash
//! `Σ code(c_i) · 31^i mod bucket_count`; collisions chain in per-bucket
//! vectors that preserve insertion order.
//!
//! # Growth
//! After an insert that adds a new key, if `len / bucket_count` exceeds the
//! load-factor threshold (0.7 by default), the bucket count doubles and every
//! pair is re-inserted. Amortized insert stays O(1).
//!
//! # Reference
//! Knuth (1998), "The Art of Computer Programming", Vol. 3, §6.4 (Hashing)

use serde::Serialize;
use tracing::debug;

/// Default load-factor threshold that triggers growth.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.7;

const HASH_BASE: u64 = 31;

/// Separate-chaining hash table.
#[derive(Debug, Clone)]
pub struct IndexTable<V> {
    buckets: Vec<Vec<(String, V)>>,
    count: usize,
    max_load_factor: f64,
}

/// Bucket occupancy report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    /// Current bucket count.
    pub buckets: usize,
    /// Stored pairs.
    pub count: usize,
    /// `count / buckets`.
    pub load_factor: f64,
    /// Buckets holding at least one pair.
    pub non_empty_buckets: usize,
    /// Longest chain.
    pub max_chain_length: usize,
    /// Mean chain length over non-empty buckets.
    pub avg_chain_length: f64,
}

impl<V> IndexTable<V> {
    /// Creates a table with `buckets` initial buckets (at least 1).
    pub fn new(buckets: usize) -> Self {
        Self::with_load_factor(buckets, DEFAULT_MAX_LOAD_FACTOR)
    }

    /// Creates a table with a custom growth threshold.
    pub fn with_load_factor(buckets: usize, max_load_factor: f64) -> Self {
        let buckets = buckets.max(1);
        Self {
            buckets: Self::empty_buckets(buckets),
            count: 0,
            max_load_factor,
        }
    }

    fn empty_buckets(n: usize) -> Vec<Vec<(String, V)>> {
        (0..n).map(|_| Vec::new()).collect()
    }

    fn bucket_index(&self, key: &str) -> usize {
        polynomial_hash(key, self.buckets.len())
    }

    /// Inserts or overwrites the value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let index = self.bucket_index(&key);
        let bucket = &mut self.buckets[index];

        if let Some(slot) = bucket.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
            return;
        }

        bucket.push((key, value));
        self.count += 1;

        if self.load_factor() > self.max_load_factor {
            self.grow();
        }
    }

    fn grow(&mut self) {
        let new_size = self.buckets.len() * 2;
        debug!(
            from = self.buckets.len(),
            to = new_size,
            count = self.count,
            "index table rehash"
        );

        let old = std::mem::replace(&mut self.buckets, Self::empty_buckets(new_size));
        for (key, value) in old.into_iter().flatten() {
            let index = self.bucket_index(&key);
            self.buckets[index].push((key, value));
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.buckets[self.bucket_index(key)]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.bucket_index(key);
        self.buckets[index]
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Every value in `key`'s bucket whose key matches.
    ///
    /// `insert` overwrites, so this yields at most one value for tables built
    /// only through `insert`.
    pub fn get_all(&self, key: &str) -> Vec<&V> {
        self.buckets[self.bucket_index(key)]
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }

    /// Removes `key`, returning its value.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];
        let position = bucket.iter().position(|(k, _)| k == key)?;
        self.count -= 1;
        Some(bucket.remove(position).1)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All keys, bucket by bucket.
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(k, _)| k).collect()
    }

    /// All values, bucket by bucket.
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, v)| v).collect()
    }

    /// All pairs, bucket by bucket.
    pub fn items(&self) -> Vec<(&str, &V)> {
        self.iter().collect()
    }

    /// Iterates pairs bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.buckets
            .iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates values mutably, bucket by bucket.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.buckets.iter_mut().flatten().map(|(_, v)| v)
    }

    /// Stored pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current bucket count.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// `len / bucket_count`.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.buckets.len() as f64
    }

    /// Removes every pair, keeping the current bucket count.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.count = 0;
    }

    /// Bucket occupancy report.
    pub fn stats(&self) -> TableStats {
        let non_empty = self.buckets.iter().filter(|b| !b.is_empty()).count();
        let max_chain = self.buckets.iter().map(Vec::len).max().unwrap_or(0);
        TableStats {
            buckets: self.buckets.len(),
            count: self.count,
            load_factor: self.load_factor(),
            non_empty_buckets: non_empty,
            max_chain_length: max_chain,
            avg_chain_length: if non_empty > 0 {
                self.count as f64 / non_empty as f64
            } else {
                0.0
            },
        }
    }
}

impl<V> Default for IndexTable<V> {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Polynomial rolling hash of `key` reduced modulo `modulus`.
///
/// Reduces at every step, so the result equals the exact (unbounded)
/// polynomial value mod `modulus` without overflow.
pub fn polynomial_hash(key: &str, modulus: usize) -> usize {
    let m = modulus.max(1) as u64;
    let mut hash = 0u64;
    let mut power = 1 % m;
    for c in key.chars() {
        hash = (hash + (c as u64 % m) * power) % m;
        power = (power * HASH_BASE) % m;
    }
    hash as usize
}
