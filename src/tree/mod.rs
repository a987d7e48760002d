//! Mismatch tree construction and vectorization
//!
//! The (k,m)-mismatch tree is the implicit trie of all `alphabet_len^k`
//! strings of length k over the alphabet. A depth-first walk of that trie
//! carries, per distinct k-mer of the input, a running mismatch count
//! against the path taken so far; a k-mer is pruned as soon as its count
//! exceeds m. The number of k-mers still alive at a leaf is the feature
//! value for that leaf's enumeration index.
//!
//! The tree is never materialized. Only the tables along the active
//! root-to-node path are kept, so memory during a walk is O(k) tables.

use std::collections::HashSet;

use crate::alphabet::Alphabet;
use crate::core::{KernelError, Result, SparseVector};

/// One surviving (k-mer, mismatch budget) pair in a node table
///
/// K-mers are referred to by the stable id assigned when the k-mer set is
/// collected, so child-table construction never touches string data.
#[derive(Clone, Copy, Debug)]
struct KmerEntry {
    kmer_id: u32,
    mismatches: u32,
}

/// Bounded-depth enumerator of the (k,m)-mismatch feature space
#[derive(Clone, Debug)]
pub struct MismatchTree {
    alphabet: Alphabet,
    k: usize,
    m: usize,
    /// `strides[d]` = number of leaves under a node at depth d
    /// (`alphabet_len^(k-d)`); `strides[0]` is the full index space.
    strides: Vec<u64>,
}

impl MismatchTree {
    /// Create a tree for the given alphabet and (k, m) parameters
    ///
    /// Parameters are validated eagerly: k must be positive, m must be
    /// strictly less than k (m >= k would make every k-mer survive every
    /// leaf), and the index space `alphabet_len^k` must fit in a `u64`.
    pub fn new(alphabet: Alphabet, k: usize, m: usize) -> Result<Self> {
        if k == 0 {
            return Err(KernelError::InvalidParameter(
                "k must be positive".to_string(),
            ));
        }
        if m >= k {
            return Err(KernelError::InvalidParameter(format!(
                "m ({}) must be less than k ({})",
                m, k
            )));
        }

        let mut strides = vec![1u64; k + 1];
        for depth in (0..k).rev() {
            strides[depth] = strides[depth + 1]
                .checked_mul(alphabet.len() as u64)
                .ok_or_else(|| {
                    KernelError::InvalidParameter(format!(
                        "index space {}^{} does not fit in 64 bits",
                        alphabet.len(),
                        k
                    ))
                })?;
        }

        Ok(Self {
            alphabet,
            k,
            m,
            strides,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn m(&self) -> usize {
        self.m
    }

    /// Total number of leaves, `alphabet_len^k`
    pub fn leaf_count(&self) -> u64 {
        self.strides[0]
    }

    /// The length-k string a leaf enumeration index stands for
    ///
    /// Leaves are enumerated depth-first in alphabet order, which makes the
    /// index the base-`alphabet_len` numeral of the string.
    pub fn leaf_string(&self, mut index: u64) -> String {
        let base = self.alphabet.len() as u64;
        let mut ordinals = vec![0u8; self.k];
        for slot in ordinals.iter_mut().rev() {
            *slot = (index % base) as u8;
            index /= base;
        }
        ordinals.iter().map(|&o| self.alphabet.symbol(o)).collect()
    }

    /// Compute the sparse mismatch feature vector of a normalized string
    ///
    /// The input must already be filtered to alphabet symbols (see
    /// [`Alphabet::filter`]). Fails with
    /// [`KernelError::InsufficientLength`] when the string is shorter
    /// than k.
    pub fn vectorize(&self, normalized: &str) -> Result<SparseVector> {
        let encoded = self.alphabet.encode(normalized);
        if encoded.len() < self.k {
            return Err(KernelError::InsufficientLength {
                k: self.k,
                len: encoded.len(),
            });
        }

        // Distinct k-mers only: duplicate windows collapse, so the feature
        // values count k-mer kinds, not occurrences.
        let mut seen = HashSet::new();
        let kmers: Vec<&[u8]> = encoded
            .windows(self.k)
            .filter(|w| seen.insert(*w))
            .collect();

        let mut tables: Vec<Vec<KmerEntry>> = (0..=self.k)
            .map(|_| Vec::with_capacity(kmers.len()))
            .collect();
        tables[0].extend((0..kmers.len() as u32).map(|kmer_id| KmerEntry {
            kmer_id,
            mismatches: 0,
        }));

        let mut walk = Walk {
            kmers: &kmers,
            alphabet_len: self.alphabet.len() as u8,
            k: self.k,
            m: self.m as u32,
            strides: &self.strides,
            tables,
            next_leaf: 0,
            indices: Vec::new(),
            values: Vec::new(),
        };
        walk.expand(0);
        debug_assert_eq!(walk.next_leaf, self.leaf_count());

        // The walk emits leaves in increasing index order, so the pairs are
        // already sorted.
        Ok(SparseVector::new(walk.indices, walk.values))
    }
}

/// State of one depth-first walk over the implicit trie
struct Walk<'a> {
    kmers: &'a [&'a [u8]],
    alphabet_len: u8,
    k: usize,
    m: u32,
    strides: &'a [u64],
    /// One table per depth, reused across siblings; at most k+1 live.
    tables: Vec<Vec<KmerEntry>>,
    next_leaf: u64,
    indices: Vec<u64>,
    values: Vec<u32>,
}

impl Walk<'_> {
    /// Expand every edge out of the node whose table sits at `depth`
    fn expand(&mut self, depth: usize) {
        for edge in 0..self.alphabet_len {
            let (head, tail) = self.tables.split_at_mut(depth + 1);
            let parent = &head[depth];
            let child = &mut tail[0];
            child.clear();

            for entry in parent {
                let mismatches = if self.kmers[entry.kmer_id as usize][depth] == edge {
                    entry.mismatches
                } else {
                    entry.mismatches + 1
                };
                // Over budget: this k-mer cannot reach any leaf below.
                if mismatches <= self.m {
                    child.push(KmerEntry {
                        kmer_id: entry.kmer_id,
                        mismatches,
                    });
                }
            }

            let child_depth = depth + 1;
            if child_depth == self.k {
                let survivors = self.tables[child_depth].len();
                if survivors > 0 {
                    self.indices.push(self.next_leaf);
                    self.values.push(survivors as u32);
                }
                self.next_leaf += 1;
            } else if self.tables[child_depth].is_empty() {
                // Nothing left to mismatch against: every leaf below is
                // zero, so the whole subtree is skipped.
                self.next_leaf += self.strides[child_depth];
            } else {
                self.expand(child_depth);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(alphabet: &str, k: usize, m: usize) -> MismatchTree {
        MismatchTree::new(Alphabet::new(alphabet.chars()).unwrap(), k, m).unwrap()
    }

    /// Reference implementation straight from the kernel definition: for
    /// every candidate length-k string, count distinct input k-mers within
    /// Hamming distance m.
    fn brute_force(t: &MismatchTree, normalized: &str) -> Vec<(u64, u32)> {
        let k = t.k();
        let chars: Vec<char> = normalized.chars().collect();
        let mut kmers: Vec<&[char]> = chars.windows(k).collect();
        kmers.sort();
        kmers.dedup();

        let mut entries = Vec::new();
        for index in 0..t.leaf_count() {
            let candidate: Vec<char> = t.leaf_string(index).chars().collect();
            let count = kmers
                .iter()
                .filter(|kmer| {
                    let mismatches =
                        kmer.iter().zip(&candidate).filter(|(a, b)| a != b).count();
                    mismatches <= t.m()
                })
                .count() as u32;
            if count > 0 {
                entries.push((index, count));
            }
        }
        entries
    }

    #[test]
    fn test_parameter_validation() {
        let a = || Alphabet::new("ACGT".chars()).unwrap();
        assert!(MismatchTree::new(a(), 0, 0).is_err());
        assert!(MismatchTree::new(a(), 3, 3).is_err());
        assert!(MismatchTree::new(a(), 3, 5).is_err());
        assert!(MismatchTree::new(a(), 3, 2).is_ok());
        // 4^40 overflows u64
        assert!(MismatchTree::new(a(), 40, 1).is_err());
    }

    #[test]
    fn test_leaf_enumeration_order() {
        let t = tree("AC", 2, 0);
        assert_eq!(t.leaf_count(), 4);
        assert_eq!(t.leaf_string(0), "AA");
        assert_eq!(t.leaf_string(1), "AC");
        assert_eq!(t.leaf_string(2), "CA");
        assert_eq!(t.leaf_string(3), "CC");
    }

    #[test]
    fn test_insufficient_length() {
        let t = tree("ACGT", 3, 1);
        let err = t.vectorize("AC").unwrap_err();
        assert!(matches!(err, KernelError::InsufficientLength { k: 3, len: 2 }));
    }

    #[test]
    fn test_exact_match_vector() {
        // m = 0 degenerates to the spectrum kernel: nonzero exactly at the
        // distinct k-mers of the input, each with value 1.
        let t = tree("ACGT", 3, 0);
        let v = t.vectorize("ACGT").unwrap();
        // "ACG" = 0*16 + 1*4 + 2 = 6, "CGT" = 1*16 + 2*4 + 3 = 27
        assert_eq!(v.indices, vec![6, 27]);
        assert_eq!(v.values, vec![1, 1]);
    }

    #[test]
    fn test_duplicate_kmers_collapse() {
        let t = tree("ACGT", 2, 0);
        let v = t.vectorize("AAAA").unwrap();
        // three "AA" windows, one distinct k-mer
        assert_eq!(v.indices, vec![0]);
        assert_eq!(v.values, vec![1]);
    }

    #[test]
    fn test_one_mismatch_neighborhood() {
        let t = tree("ACGT", 3, 1);
        let v = t.vectorize("ACGT").unwrap();

        let expected = brute_force(&t, "ACGT");
        let got: Vec<(u64, u32)> = v.iter().collect();
        assert_eq!(got, expected);

        // Each k-mer has 1 + 3*3 = 10 Hamming-1 neighbors; "ACG" and "CGT"
        // share none, so 20 nonzero entries all equal to 1.
        assert_eq!(v.nnz(), 20);
        assert!(v.values.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_overlapping_neighborhoods_accumulate() {
        // "AA" and "AC" are both within one mismatch of "AA", "AC", etc.
        let t = tree("AC", 2, 1);
        let v = t.vectorize("AAC").unwrap();
        let expected = brute_force(&t, "AAC");
        assert_eq!(v.iter().collect::<Vec<_>>(), expected);
        assert!(v.values.contains(&2));
    }

    #[test]
    fn test_matches_brute_force_on_longer_input() {
        let t = tree("ACGT", 4, 2);
        let input = "GATTACAGATTACA";
        let v = t.vectorize(input).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), brute_force(&t, input));
    }

    #[test]
    fn test_vector_indices_sorted() {
        let t = tree("ACGT", 3, 1);
        let v = t.vectorize("TTGACA").unwrap();
        assert!(v.indices.windows(2).all(|w| w[0] < w[1]));
    }
}
