//! Kernel launch for the device matrix multiply.

use cudarc::driver::LaunchAsync;

use crate::context::CudaContext;
use crate::error::{CudaError, Result};
use crate::memory::GpuMatrix;

/// Launch the P8 GEMM kernel: `C = A · B` with binary64 accumulation per
/// output element and one encode on store, identical to the host kernel.
///
/// The grid assigns one thread per output element; threads read the shared
/// immutable decode table and write disjoint elements of `C`. Blocks until
/// the device has finished.
pub fn launch_gemm(
    ctx: &CudaContext,
    a: &GpuMatrix,
    b: &GpuMatrix,
    c: &mut GpuMatrix,
) -> Result<()> {
    if a.cols() != b.rows() {
        return Err(CudaError::DimensionMismatch(format!(
            "A.cols ({}) != B.rows ({})",
            a.cols(),
            b.rows()
        )));
    }
    if c.rows() != a.rows() || c.cols() != b.cols() {
        return Err(CudaError::DimensionMismatch(format!(
            "C dimensions ({}, {}) don't match A×B ({}, {})",
            c.rows(),
            c.cols(),
            a.rows(),
            b.cols()
        )));
    }

    let (m, k, n) = (a.rows(), a.cols(), b.cols());
    if m == 0 || n == 0 {
        return Ok(());
    }

    let kernel = ctx.gemm_kernel()?;
    let cfg = CudaContext::launch_config(m, n);
    unsafe {
        kernel.launch(
            cfg,
            (
                a.as_slice(),
                b.as_slice(),
                c.as_slice_mut(),
                ctx.decode_table(),
                m as i32,
                n as i32,
                k as i32,
            ),
        )
    }
    .map_err(|e| CudaError::KernelLaunch(e.to_string()))?;

    ctx.device()
        .synchronize()
        .map_err(|e| CudaError::KernelLaunch(e.to_string()))?;

    Ok(())
}
