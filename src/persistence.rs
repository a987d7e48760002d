//! Cache serialization and persistence
//!
//! Vectorizing long strings is expensive, so both engine caches can be
//! snapshotted to JSON and fed back into a new engine as pre-seeded data.
//! The snapshot stores vectors as `normalized string -> {index -> count}`
//! and kernel values triangularly as `normalized -> {normalized -> value}`:
//! for any two distinct strings at most one direction of the pair is
//! present.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::core::{KernelError, Result, SparseVector};
use crate::engine::MismatchKernel;

/// Serializable snapshot of an engine's caches
#[derive(Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Snapshot metadata for validation
    pub metadata: SnapshotMetadata,
    /// Vector cache: normalized string -> sparse vector in DOK form
    pub vectors: HashMap<String, HashMap<u64, u32>>,
    /// Kernel cache: triangular pairwise matrix
    pub kernels: HashMap<String, HashMap<String, u64>>,
}

/// Snapshot metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Library version used to create the snapshot
    pub library_version: String,
    /// Alphabet symbols in enumeration order
    pub alphabet: String,
    /// K-mer length
    pub k: usize,
    /// Maximum tolerated mismatches
    pub m: usize,
    /// Creation timestamp
    pub created_at: String,
}

impl CacheSnapshot {
    /// Capture the current cache contents of an engine
    pub fn from_engine(engine: &MismatchKernel) -> Self {
        let vectors = engine
            .vector_cache()
            .entries()
            .iter()
            .map(|(key, vector)| (key.clone(), vector.to_dok()))
            .collect();

        let mut kernels: HashMap<String, HashMap<String, u64>> = HashMap::new();
        for (x1, x2, value) in engine.kernel_cache().iter() {
            kernels
                .entry(x1.to_string())
                .or_default()
                .insert(x2.to_string(), value);
        }

        Self {
            metadata: SnapshotMetadata {
                library_version: crate::VERSION.to_string(),
                alphabet: engine.tree().alphabet().symbols().iter().collect(),
                k: engine.tree().k(),
                m: engine.tree().m(),
                created_at: Utc::now().to_rfc3339(),
            },
            vectors,
            kernels,
        }
    }

    /// Build an engine pre-seeded with this snapshot's caches
    pub fn into_engine(self) -> Result<MismatchKernel> {
        let alphabet = Alphabet::new(self.metadata.alphabet.chars())?;
        let vectors = self
            .vectors
            .iter()
            .map(|(key, dok)| (key.clone(), SparseVector::from_dok(dok)))
            .collect();

        Ok(MismatchKernel::new(alphabet, self.metadata.k, self.metadata.m)?
            .with_vectors(vectors)
            .with_kernel_matrix(self.kernels))
    }

    /// Check that the snapshot was produced with the given parameters
    pub fn ensure_parameters(&self, alphabet: &str, k: usize, m: usize) -> Result<()> {
        if self.metadata.alphabet != alphabet || self.metadata.k != k || self.metadata.m != m {
            return Err(KernelError::InvalidParameter(format!(
                "snapshot was built with alphabet={:?}, k={}, m={}, \
                 requested alphabet={:?}, k={}, m={}",
                self.metadata.alphabet, self.metadata.k, self.metadata.m, alphabet, k, m
            )));
        }
        Ok(())
    }

    /// Save the snapshot to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Load a snapshot from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let snapshot = serde_json::from_reader(reader)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_engine() -> MismatchKernel {
        let alphabet = Alphabet::new("ACGT".chars()).unwrap();
        let mut engine = MismatchKernel::new(alphabet, 3, 1).unwrap();
        engine.kernel("ACGTAC", "GATTACA").unwrap();
        engine.kernel("ACGTAC", "ACGTAC").unwrap();
        engine
    }

    #[test]
    fn test_snapshot_captures_caches() {
        let engine = sample_engine();
        let snapshot = CacheSnapshot::from_engine(&engine);

        assert_eq!(snapshot.metadata.alphabet, "ACGT");
        assert_eq!(snapshot.metadata.k, 3);
        assert_eq!(snapshot.metadata.m, 1);
        assert_eq!(snapshot.vectors.len(), 2);
        let stored: usize = snapshot.kernels.values().map(|row| row.len()).sum();
        assert_eq!(stored, 2);
    }

    #[test]
    fn test_snapshot_is_triangular() {
        let engine = sample_engine();
        let snapshot = CacheSnapshot::from_engine(&engine);

        for (x1, row) in &snapshot.kernels {
            for x2 in row.keys() {
                if x1 != x2 {
                    let reverse = snapshot.kernels.get(x2).and_then(|r| r.get(x1));
                    assert!(reverse.is_none(), "pair ({}, {}) stored twice", x1, x2);
                }
            }
        }
    }

    #[test]
    fn test_seeded_engine_reuses_snapshot_values() {
        let mut original = sample_engine();
        let expected = original.kernel("ACGTAC", "GATTACA").unwrap();

        let mut restored = CacheSnapshot::from_engine(&original).into_engine().unwrap();
        assert_eq!(restored.kernel("GATTACA", "ACGTAC").unwrap(), expected);
        // Answered from the seeded kernel cache, no vectorization needed
        assert_eq!(restored.vector_cache_stats().misses, 0);
    }

    #[test]
    fn test_ensure_parameters() {
        let snapshot = CacheSnapshot::from_engine(&sample_engine());
        assert!(snapshot.ensure_parameters("ACGT", 3, 1).is_ok());
        assert!(snapshot.ensure_parameters("ACGT", 4, 1).is_err());
        assert!(snapshot.ensure_parameters("ACG", 3, 1).is_err());
        assert!(snapshot.ensure_parameters("ACGT", 3, 2).is_err());
    }
}
