//! Core types for the mismatch kernel

pub mod error;
pub mod types;

pub use self::error::*;
pub use self::types::*;
