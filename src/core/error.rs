//! Error types for the mismatch kernel

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("cannot take {k}-mers of a {len} character string")]
    InsufficientLength { k: usize, len: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KernelError>;
