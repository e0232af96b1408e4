//! CUDA context: device selection, kernel compilation, capacity queries, and
//! the uploaded decode table.

use std::sync::Arc;

use cudarc::driver::{CudaDevice, CudaFunction, CudaSlice, LaunchConfig};
use cudarc::nvrtc::compile_ptx;

use crate::error::{CudaError, Result};

/// CUDA kernel source, compiled with NVRTC at context creation.
const KERNEL_SOURCE: &str = include_str!("../kernels/p8_gemm.cu");

const MODULE_NAME: &str = "p8_gemm";
pub(crate) const GEMM_KERNEL: &str = "p8_gemm_f64acc";

/// Edge length of the square thread block used for the GEMM grid.
pub const BLOCK_DIM: u32 = 16;

/// Device capacities queried at initialization.
#[derive(Debug, Clone, Copy)]
pub struct DeviceLimits {
    /// Largest single allocation the back end will attempt, in bytes.
    pub max_alloc_bytes: usize,
    /// Total global memory on the device, in bytes.
    pub global_mem_bytes: usize,
    /// Maximum threads per block (work-group size).
    pub max_threads_per_block: u32,
}

/// CUDA context for P8 matrix multiplication.
///
/// Owns the device handle, the compiled kernel module, and the immutable
/// 256-entry decode table uploaded from the host at creation. The table is
/// never mutated afterwards and is shared read-only by every launch.
pub struct CudaContext {
    device: Arc<CudaDevice>,
    decode_table: CudaSlice<f64>,
    limits: DeviceLimits,
}

impl CudaContext {
    /// Create a context on the default device (ordinal 0).
    pub fn new() -> Result<Self> {
        Self::with_ordinal(0)
    }

    /// Create a context on a specific device ordinal.
    pub fn with_ordinal(ordinal: usize) -> Result<Self> {
        let device =
            CudaDevice::new(ordinal).map_err(|e| CudaError::DeviceUnavailable(e.to_string()))?;

        let ptx =
            compile_ptx(KERNEL_SOURCE).map_err(|e| CudaError::KernelCompile(e.to_string()))?;
        device
            .load_ptx(ptx, MODULE_NAME, &[GEMM_KERNEL])
            .map_err(|e| CudaError::KernelCompile(e.to_string()))?;

        let (free, total) = cudarc::driver::result::mem_get_info()
            .map_err(|e| CudaError::DeviceUnavailable(e.to_string()))?;
        let max_threads = device
            .attribute(
                cudarc::driver::sys::CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_THREADS_PER_BLOCK,
            )
            .map_err(|e| CudaError::DeviceUnavailable(e.to_string()))?;
        let limits = DeviceLimits {
            max_alloc_bytes: free,
            global_mem_bytes: total,
            max_threads_per_block: max_threads as u32,
        };

        let decode_table = device
            .htod_sync_copy(posit8::decode_table().as_slice())
            .map_err(|e| CudaError::BufferTransfer(e.to_string()))?;

        Ok(Self {
            device,
            decode_table,
            limits,
        })
    }

    /// The underlying device handle.
    pub fn device(&self) -> &Arc<CudaDevice> {
        &self.device
    }

    /// The uploaded decode table.
    pub(crate) fn decode_table(&self) -> &CudaSlice<f64> {
        &self.decode_table
    }

    /// Device capacities queried at initialization.
    pub fn limits(&self) -> DeviceLimits {
        self.limits
    }

    /// Name of the selected device.
    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| String::from("unknown"))
    }

    pub(crate) fn gemm_kernel(&self) -> Result<CudaFunction> {
        self.device
            .get_func(MODULE_NAME, GEMM_KERNEL)
            .ok_or_else(|| CudaError::KernelLaunch(format!("kernel {GEMM_KERNEL} not loaded")))
    }

    /// Refuse allocations the device cannot satisfy, before attempting them.
    pub(crate) fn ensure_capacity(&self, requested: usize) -> Result<()> {
        let limit = self.limits.max_alloc_bytes.min(self.limits.global_mem_bytes);
        if requested > limit {
            return Err(CudaError::Capacity { requested, limit });
        }
        Ok(())
    }

    /// One thread per output element, tiled in `BLOCK_DIM` × `BLOCK_DIM`
    /// blocks.
    pub fn launch_config(m: usize, n: usize) -> LaunchConfig {
        let grid_x = (n as u32).div_ceil(BLOCK_DIM);
        let grid_y = (m as u32).div_ceil(BLOCK_DIM);
        LaunchConfig {
            grid_dim: (grid_x.max(1), grid_y.max(1), 1),
            block_dim: (BLOCK_DIM, BLOCK_DIM, 1),
            shared_mem_bytes: 0,
        }
    }
}
