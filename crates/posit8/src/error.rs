//! Contract failures raised by the vector and matrix kernels.
//!
//! Invalid *values* never raise errors: NaR travels in-band through the
//! tables. Errors are reserved for structurally invalid calls, and the
//! kernels validate their arguments before writing any output.

use thiserror::Error;

/// Errors raised by [`crate::api`] kernels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A buffer's length disagrees with the dimensions stated for it.
    #[error("{buffer}: expected {expected} elements, got {actual}")]
    DimensionMismatch {
        /// Which argument failed validation.
        buffer: &'static str,
        /// Element count implied by the stated dimensions.
        expected: usize,
        /// Element count actually supplied.
        actual: usize,
    },
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, Error>;
