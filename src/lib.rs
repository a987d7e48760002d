//! Rust implementation of the (k,m)-mismatch string kernel
//!
//! Based on "Mismatch String Kernels for SVM Protein Classification"
//! by Leslie, Eskin, Weston and Noble

pub mod alphabet;
pub mod cache;
pub mod core;
pub mod engine;
pub mod persistence;
pub mod tree;

// Re-export main types for convenience
pub use crate::alphabet::Alphabet;
pub use crate::cache::{CacheStats, KernelCache, VectorCache};
pub use crate::core::{KernelError, Result, SparseVector};
pub use crate::engine::MismatchKernel;
pub use crate::persistence::CacheSnapshot;
pub use crate::tree::MismatchTree;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
