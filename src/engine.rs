//! Kernel engine: cached vectorization and pairwise kernel values
//!
//! # Quick Start
//!
//! ```rust
//! use mismatch_kernel::{Alphabet, MismatchKernel};
//!
//! # fn main() -> mismatch_kernel::Result<()> {
//! let alphabet = Alphabet::new("ACGT".chars())?;
//! let mut engine = MismatchKernel::new(alphabet, 3, 1)?;
//!
//! let value = engine.kernel("ACGTACGT", "TACGTT")?;
//! let (normalized, vector) = engine.vectorize("ACG-TAC")?;
//! assert_eq!(normalized, "ACGTAC");
//! assert!(vector.nnz() > 0);
//! # let _ = value;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use log::debug;

use crate::alphabet::Alphabet;
use crate::cache::{CacheStats, KernelCache, VectorCache};
use crate::core::{Result, SparseVector};
use crate::tree::MismatchTree;

/// (k,m)-mismatch kernel engine
///
/// Owns the mismatch tree plus a vector cache (normalized string ->
/// feature vector) and a kernel cache (unordered string pair -> value).
/// The kernel value is the raw dot product of the two feature vectors;
/// no normalization is applied (see [`MismatchKernel::normalized_kernel`]
/// for the optional cosine transform).
pub struct MismatchKernel {
    tree: MismatchTree,
    vectors: VectorCache,
    kernels: KernelCache,
}

impl MismatchKernel {
    /// Create an engine with empty caches
    ///
    /// Parameter validation happens here, eagerly: an empty or duplicated
    /// alphabet is rejected by [`Alphabet::new`], and `k`/`m` bounds by
    /// [`MismatchTree::new`].
    pub fn new(alphabet: Alphabet, k: usize, m: usize) -> Result<Self> {
        let tree = MismatchTree::new(alphabet, k, m)?;
        debug!(
            "mismatch kernel engine: k={}, m={}, {} symbols, {} leaves",
            tree.k(),
            tree.m(),
            tree.alphabet().len(),
            tree.leaf_count()
        );
        Ok(Self {
            tree,
            vectors: VectorCache::new(),
            kernels: KernelCache::new(),
        })
    }

    /// Pre-seed the vector cache with already-computed feature vectors
    ///
    /// Keys must be normalized strings; vectors found here are returned
    /// without recomputation.
    pub fn with_vectors(mut self, vectors: HashMap<String, SparseVector>) -> Self {
        self.vectors = VectorCache::with_entries(vectors);
        self
    }

    /// Pre-seed the kernel cache from a triangular kernel matrix
    ///
    /// The matrix shape is `normalized -> (normalized -> value)` with at
    /// most one direction stored per pair; both directions are accepted
    /// and collapse onto the canonical one.
    pub fn with_kernel_matrix(mut self, matrix: HashMap<String, HashMap<String, u64>>) -> Self {
        for (x1, row) in &matrix {
            for (x2, &value) in row {
                self.kernels.insert(x1, x2, value);
            }
        }
        self
    }

    /// The underlying mismatch tree
    pub fn tree(&self) -> &MismatchTree {
        &self.tree
    }

    /// Filter a raw input down to alphabet symbols
    pub fn normalize(&self, raw: &str) -> String {
        self.tree.alphabet().filter(raw)
    }

    /// Normalize an input and return its feature vector, computing and
    /// caching it on first sight
    ///
    /// A failed vectorization writes nothing to the cache.
    pub fn vectorize(&mut self, raw: &str) -> Result<(String, SparseVector)> {
        let normalized = self.normalize(raw);
        if let Some(vector) = self.vectors.get(&normalized) {
            return Ok((normalized, vector.clone()));
        }

        let vector = self.tree.vectorize(&normalized)?;
        debug!(
            "vectorized {:?}: {} of {} indices nonzero",
            normalized,
            vector.nnz(),
            self.tree.leaf_count()
        );
        self.vectors.insert(normalized.clone(), vector.clone());
        Ok((normalized, vector))
    }

    /// Kernel value between two raw strings
    ///
    /// Both inputs are normalized first; the pair is looked up in the
    /// kernel cache in either direction before any vectorization happens.
    /// The result is an exact integer: survivor counts are integers and
    /// the dot product is summed in `u64`.
    pub fn kernel(&mut self, x1: &str, x2: &str) -> Result<u64> {
        let n1 = self.normalize(x1);
        let n2 = self.normalize(x2);

        if let Some(value) = self.kernels.get(&n1, &n2) {
            return Ok(value);
        }

        let (n1, v1) = self.vectorize(&n1)?;
        let (n2, v2) = self.vectorize(&n2)?;
        let value = dot_product_sparse(&v1, &v2);
        self.kernels.insert(&n1, &n2, value);
        Ok(value)
    }

    /// Cosine-normalized kernel: `k(x1,x2) / sqrt(k(x1,x1) * k(x2,x2))`
    ///
    /// This is deliberately a separate operation; [`MismatchKernel::kernel`]
    /// always returns the raw dot product.
    pub fn normalized_kernel(&mut self, x1: &str, x2: &str) -> Result<f64> {
        let raw = self.kernel(x1, x2)? as f64;
        let self1 = self.kernel(x1, x1)? as f64;
        let self2 = self.kernel(x2, x2)? as f64;
        if self1 == 0.0 || self2 == 0.0 {
            return Ok(0.0);
        }
        Ok(raw / (self1 * self2).sqrt())
    }

    /// The vector cache (read-only; used for snapshots and stats)
    pub fn vector_cache(&self) -> &VectorCache {
        &self.vectors
    }

    /// The kernel cache (read-only; used for snapshots and stats)
    pub fn kernel_cache(&self) -> &KernelCache {
        &self.kernels
    }

    /// Statistics of the vector cache
    pub fn vector_cache_stats(&self) -> CacheStats {
        self.vectors.stats()
    }

    /// Statistics of the kernel cache
    pub fn kernel_cache_stats(&self) -> CacheStats {
        self.kernels.stats()
    }
}

/// Compute the dot product of two sparse vectors
///
/// Both index lists are sorted, so a merge walk visits each entry once and
/// multiplies only indices present in both vectors.
fn dot_product_sparse(x: &SparseVector, y: &SparseVector) -> u64 {
    let mut result = 0u64;
    let mut i = 0;
    let mut j = 0;

    while i < x.indices.len() && j < y.indices.len() {
        let x_idx = x.indices[i];
        let y_idx = y.indices[j];

        if x_idx == y_idx {
            result += x.values[i] as u64 * y.values[j] as u64;
            i += 1;
            j += 1;
        } else if x_idx < y_idx {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}
