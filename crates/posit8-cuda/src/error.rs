//! Error types for the CUDA back end.

use thiserror::Error;

/// Errors that can occur on the device path.
///
/// The host-side kernels in `posit8` never produce these; they belong to the
/// offloaded matrix multiply only.
#[derive(Debug, Error)]
pub enum CudaError {
    /// No usable CUDA device, or the driver could not be initialized.
    #[error("no CUDA device available: {0}")]
    DeviceUnavailable(String),

    /// The embedded kernel source failed to compile or load.
    #[error("kernel compilation error: {0}")]
    KernelCompile(String),

    /// A requested buffer exceeds what the device can allocate.
    #[error("requested {requested} bytes exceeds device limit of {limit} bytes")]
    Capacity { requested: usize, limit: usize },

    /// Buffer lengths disagree with the stated matrix dimensions.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The kernel failed to launch or to run to completion.
    #[error("kernel launch error: {0}")]
    KernelLaunch(String),

    /// A host/device copy or device allocation failed.
    #[error("buffer transfer error: {0}")]
    BufferTransfer(String),
}

/// Result type for CUDA operations.
pub type Result<T> = std::result::Result<T, CudaError>;
