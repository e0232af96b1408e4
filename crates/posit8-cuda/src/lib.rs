//! CUDA back end for the posit8 dense matrix multiply.
//!
//! This crate runs the same `matmul` contract as `posit8::matmul` on a CUDA
//! device: one thread per output element, each decoding operands through the
//! immutable 256-entry decode table uploaded at context creation,
//! accumulating in binary64, and encoding once on store. Results are
//! bit-identical to the host kernels.
//!
//! # Quick start
//!
//! ```ignore
//! use posit8::encode;
//! use posit8_cuda::matmul_cuda;
//!
//! let a: Vec<u8> = vec![encode(1.0); 512 * 512];
//! let b: Vec<u8> = vec![encode(2.0); 512 * 512];
//! let c = matmul_cuda(&a, &b, 512, 512, 512)?;
//! ```
//!
//! # Persistent context
//!
//! For repeated operations, keep buffers on the device:
//!
//! ```ignore
//! use posit8_cuda::{gemm_cuda, CudaContext, GpuMatrix};
//!
//! let ctx = CudaContext::new()?;
//! let a_gpu = GpuMatrix::from_host(&ctx, &a, m, k)?;
//! let b_gpu = GpuMatrix::from_host(&ctx, &b, k, n)?;
//! let mut c_gpu = GpuMatrix::alloc(&ctx, m, n)?;
//! gemm_cuda(&ctx, &a_gpu, &b_gpu, &mut c_gpu)?;
//! let c = c_gpu.to_host(&ctx)?;
//! ```
//!
//! The one-shot [`matmul_cuda`] uses a lazily-initialized global context that
//! persists for the process lifetime, so the NVRTC compilation cost is paid
//! once.

mod context;
mod error;
mod kernels;
mod memory;

use once_cell::sync::OnceCell;
use std::sync::Mutex;

pub use context::{CudaContext, DeviceLimits, BLOCK_DIM};
pub use error::{CudaError, Result};
pub use kernels::launch_gemm;
pub use memory::GpuMatrix;

/// Global CUDA context for the convenience functions.
/// Lazily initialized on first use, persists for the process lifetime.
static GLOBAL_CONTEXT: OnceCell<CudaContext> = OnceCell::new();

/// Mutex to ensure only one thread initializes the context.
static INIT_MUTEX: Mutex<()> = Mutex::new(());

/// Get or initialize the global CUDA context.
///
/// Thread-safe; the context is created at most once and cached.
pub fn get_global_context() -> Result<&'static CudaContext> {
    if let Some(ctx) = GLOBAL_CONTEXT.get() {
        return Ok(ctx);
    }

    let _lock = INIT_MUTEX
        .lock()
        .map_err(|e| CudaError::DeviceUnavailable(e.to_string()))?;

    if let Some(ctx) = GLOBAL_CONTEXT.get() {
        return Ok(ctx);
    }

    let ctx = CudaContext::new()?;
    let _ = GLOBAL_CONTEXT.set(ctx);
    Ok(GLOBAL_CONTEXT.get().expect("context was just stored"))
}

/// One-shot P8 matrix multiply on the device.
///
/// Handles all device memory management; `A` is `m×k`, `B` is `k×n`, both
/// row-major, and the returned `C` is `m×n` row-major. Host buffer lengths
/// are validated before any device work, and the requested device footprint
/// is checked against the capacities queried at initialization.
pub fn matmul_cuda(a: &[u8], b: &[u8], m: usize, k: usize, n: usize) -> Result<Vec<u8>> {
    if a.len() != m * k {
        return Err(CudaError::DimensionMismatch(format!(
            "A: expected {} elements, got {}",
            m * k,
            a.len()
        )));
    }
    if b.len() != k * n {
        return Err(CudaError::DimensionMismatch(format!(
            "B: expected {} elements, got {}",
            k * n,
            b.len()
        )));
    }

    let ctx = get_global_context()?;

    let a_gpu = GpuMatrix::from_host(ctx, a, m, k)?;
    let b_gpu = GpuMatrix::from_host(ctx, b, k, n)?;
    let mut c_gpu = GpuMatrix::alloc(ctx, m, n)?;

    launch_gemm(ctx, &a_gpu, &b_gpu, &mut c_gpu)?;

    c_gpu.to_host(ctx)
}

/// P8 matrix multiply over device-resident matrices with an explicit context.
pub fn gemm_cuda(
    ctx: &CudaContext,
    a: &GpuMatrix,
    b: &GpuMatrix,
    c: &mut GpuMatrix,
) -> Result<()> {
    launch_gemm(ctx, a, b, c)
}
