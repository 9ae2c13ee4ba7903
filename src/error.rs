//! Error types for volume storage operations

use crate::types::Axis;
use thiserror::Error;

/// Main error type for volume storage operations
#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{axis} index {value} out of bounds for extent {extent}")]
    OutOfBounds { axis: Axis, value: u32, extent: u32 },

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Region [{offset}, {offset} + {size}) exceeds volume size {total}")]
    RegionBounds { offset: u64, size: u64, total: u64 },

    #[error("Region size mismatch: expected {expected} bytes, got {actual}")]
    RegionSize { expected: u64, actual: u64 },

    #[error("Backing file length mismatch: expected {expected} bytes, found {actual}")]
    FileLength { expected: u64, actual: u64 },

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Specialized Result type for volume storage operations
pub type Result<T> = std::result::Result<T, VolumeError>;
