//! Vector and kernel caches
//!
//! Vectorizing a string walks an `alphabet_len^k` tree, so both the
//! per-string feature vectors and the pairwise kernel values are cached.
//! The kernel is symmetric, so kernel values are keyed by an unordered
//! string pair stored in one canonical direction. Entries are never
//! evicted; cache lifetime is engine lifetime.

use std::collections::HashMap;

use crate::core::SparseVector;

/// Cache key for kernel values, normalized so the pair is order-insensitive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PairKey {
    a: String,
    b: String,
}

impl PairKey {
    /// Create a normalized cache key where `a <= b`
    pub(crate) fn new(x1: &str, x2: &str) -> Self {
        if x1 <= x2 {
            Self {
                a: x1.to_string(),
                b: x2.to_string(),
            }
        } else {
            Self {
                a: x2.to_string(),
                b: x1.to_string(),
            }
        }
    }

    pub(crate) fn into_pair(self) -> (String, String) {
        (self.a, self.b)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache of feature vectors keyed by normalized string
#[derive(Debug, Default)]
pub struct VectorCache {
    entries: HashMap<String, SparseVector>,
    hits: u64,
    misses: u64,
}

impl VectorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-seeded with already-computed vectors
    pub fn with_entries(entries: HashMap<String, SparseVector>) -> Self {
        Self {
            entries,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up the vector for a normalized string
    pub fn get(&mut self, normalized: &str) -> Option<&SparseVector> {
        if let Some(vector) = self.entries.get(normalized) {
            self.hits += 1;
            Some(vector)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Insert a computed vector
    pub fn insert(&mut self, normalized: String, vector: SparseVector) {
        self.entries.insert(normalized, vector);
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.entries.contains_key(normalized)
    }

    /// Borrow the underlying entries (used for snapshots)
    pub fn entries(&self) -> &HashMap<String, SparseVector> {
        &self.entries
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }
}

/// Cache of pairwise kernel values, stored triangularly
#[derive(Debug, Default)]
pub struct KernelCache {
    entries: HashMap<PairKey, u64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the kernel value of a normalized string pair, either order
    pub fn get(&mut self, x1: &str, x2: &str) -> Option<u64> {
        if let Some(&value) = self.entries.get(&PairKey::new(x1, x2)) {
            self.hits += 1;
            Some(value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Store a kernel value, one direction per pair
    pub fn insert(&mut self, x1: &str, x2: &str, value: u64) {
        self.entries.insert(PairKey::new(x1, x2), value);
    }

    /// Iterate stored pairs in their canonical direction (used for snapshots)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u64)> + '_ {
        self.entries
            .iter()
            .map(|(key, &value)| (key.a.as_str(), key.b.as_str(), value))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_normalization() {
        let key1 = PairKey::new("ACGT", "AAAA");
        let key2 = PairKey::new("AAAA", "ACGT");
        assert_eq!(key1, key2);
        assert_eq!(key1.into_pair(), ("AAAA".to_string(), "ACGT".to_string()));
    }

    #[test]
    fn test_vector_cache_basic() {
        let mut cache = VectorCache::new();

        assert!(cache.get("ACG").is_none());
        assert_eq!(cache.stats().misses, 1);

        cache.insert("ACG".to_string(), SparseVector::new(vec![6], vec![1]));
        assert_eq!(cache.get("ACG").unwrap().get(6), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_vector_cache_pre_seeding() {
        let mut seeded = HashMap::new();
        seeded.insert("GG".to_string(), SparseVector::new(vec![10], vec![1]));

        let mut cache = VectorCache::with_entries(seeded);
        assert!(cache.contains("GG"));
        assert!(cache.get("GG").is_some());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_kernel_cache_symmetric_access() {
        let mut cache = KernelCache::new();

        assert_eq!(cache.get("A", "B"), None);

        cache.insert("A", "B", 5);
        assert_eq!(cache.get("A", "B"), Some(5));
        assert_eq!(cache.get("B", "A"), Some(5));
        assert_eq!(cache.stats().hits, 2);

        // Inserting the reversed pair overwrites, not duplicates
        cache.insert("B", "A", 7);
        assert_eq!(cache.stats().size, 1);
        assert_eq!(cache.get("A", "B"), Some(7));
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = KernelCache::new();
        assert_eq!(cache.stats().hit_rate(), 0.0);

        cache.get("A", "B");
        cache.get("B", "C");
        assert_eq!(cache.stats().hit_rate(), 0.0);

        cache.insert("A", "B", 1);
        cache.get("A", "B");
        cache.get("A", "B");

        // 2 hits, 2 misses = 50%
        assert_eq!(cache.stats().hit_rate(), 0.5);
    }
}
