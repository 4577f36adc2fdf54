//! Error types for slice extraction and windowing

use thiserror::Error;

/// Main error type for raw volume operations
#[derive(Error, Debug)]
pub enum RawSliceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported element type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported viewing plane: {0}")]
    UnsupportedPlane(String),

    #[error("Unsupported byte order: {0}")]
    UnsupportedByteOrder(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Slice index must be non-negative, got {0}")]
    InvalidSliceIndex(i64),

    #[error("Slice {index} out of range: {reason}")]
    SliceOutOfRange { index: usize, reason: String },

    #[error("Out of bounds: {width} byte sample at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("File size {size} exceeds safe limit of {limit} bytes")]
    SizeLimitExceeded { size: u64, limit: u64 },

    #[error("Value {value} is not representable as {element_type}")]
    UnrepresentableValue { value: f64, element_type: String },

    #[error("Resource not cached: {0}")]
    NotCached(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized Result type for raw volume operations
pub type Result<T> = std::result::Result<T, RawSliceError>;

impl From<serde_json::Error> for RawSliceError {
    fn from(err: serde_json::Error) -> Self {
        RawSliceError::Serialization(err.to_string())
    }
}
