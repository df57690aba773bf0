//! Error type shared by every kernel entry point.
//!
//! Kernels validate their inputs before touching the output matrix, so an
//! `Err` always means the matrix is unchanged.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// Inputs or output of an engine call have different dimensions.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Overlap radius too large for the matrix extent on that axis.
    #[error("overlap radius {radius} too large for extent {extent}")]
    InvalidRadius { radius: usize, extent: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// Bulk byte buffer does not hold exactly `rows * cols` pixels.
    #[error("buffer holds {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl KernelError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        KernelError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;
