//! GPU memory management for P8 matrices.
//!
//! Matrices keep the crate-wide flat row-major layout on the device; uploads
//! and downloads are straight copies with no transposition.

use cudarc::driver::CudaSlice;

use crate::context::CudaContext;
use crate::error::{CudaError, Result};

fn validate_dims(len: usize, rows: usize, cols: usize) -> Result<()> {
    if len != rows * cols {
        return Err(CudaError::DimensionMismatch(format!(
            "expected {} elements, got {}",
            rows * cols,
            len
        )));
    }
    Ok(())
}

/// A P8 matrix stored in device memory, row-major.
pub struct GpuMatrix {
    data: CudaSlice<u8>,
    rows: usize,
    cols: usize,
}

impl GpuMatrix {
    /// Upload a row-major host matrix.
    ///
    /// Validates the buffer length against the stated dimensions and the
    /// device capacity before copying.
    pub fn from_host(ctx: &CudaContext, data: &[u8], rows: usize, cols: usize) -> Result<Self> {
        validate_dims(data.len(), rows, cols)?;
        ctx.ensure_capacity(data.len())?;
        let gpu_data = ctx
            .device()
            .htod_sync_copy(data)
            .map_err(|e| CudaError::BufferTransfer(e.to_string()))?;
        Ok(Self {
            data: gpu_data,
            rows,
            cols,
        })
    }

    /// Allocate a zeroed device matrix.
    pub fn alloc(ctx: &CudaContext, rows: usize, cols: usize) -> Result<Self> {
        ctx.ensure_capacity(rows * cols)?;
        let gpu_data = ctx
            .device()
            .alloc_zeros::<u8>(rows * cols)
            .map_err(|e| CudaError::BufferTransfer(e.to_string()))?;
        Ok(Self {
            data: gpu_data,
            rows,
            cols,
        })
    }

    /// Copy the matrix back to the host, row-major.
    pub fn to_host(&self, ctx: &CudaContext) -> Result<Vec<u8>> {
        ctx.device()
            .dtoh_sync_copy(&self.data)
            .map_err(|e| CudaError::BufferTransfer(e.to_string()))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The underlying device slice (for kernel launches).
    pub fn as_slice(&self) -> &CudaSlice<u8> {
        &self.data
    }

    /// Mutable access to the underlying device slice.
    pub fn as_slice_mut(&mut self) -> &mut CudaSlice<u8> {
        &mut self.data
    }
}
