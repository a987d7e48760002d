//! Core type definitions for the mismatch kernel

use std::collections::HashMap;

/// Sparse feature vector with sorted indices
///
/// Indices live in the leaf enumeration space of the mismatch tree,
/// `[0, alphabet_len^k)`, so they are `u64` rather than `usize`. Values are
/// survivor counts and therefore always positive where present; absent
/// indices are implicitly zero (DOK semantics).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<u64>,
    /// Survivor counts corresponding to indices
    pub values: Vec<u32>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<u64>, values: Vec<u32>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: u64) -> u32 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0,
        }
    }

    /// Compute the squared L2 norm (the self-kernel)
    pub fn norm_squared(&self) -> u64 {
        self.values.iter().map(|&v| v as u64 * v as u64).sum()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Convert to a dictionary-of-keys mapping
    pub fn to_dok(&self) -> HashMap<u64, u32> {
        self.iter().collect()
    }

    /// Build from a dictionary-of-keys mapping, dropping explicit zeros
    pub fn from_dok(dok: &HashMap<u64, u32>) -> Self {
        let (indices, values): (Vec<_>, Vec<_>) =
            dok.iter().filter(|&(_, &v)| v > 0).map(|(&i, &v)| (i, v)).unzip();
        Self::new(indices, values)
    }
}
