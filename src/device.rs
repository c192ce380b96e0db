//! Device selection: CUDA > Metal > CPU fallback.

pub use candle_core::Device;
use serde::Deserialize;

use crate::error::{LoadError, LoadResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Best accelerator compiled in, else CPU.
    #[default]
    Auto,
    Cpu,
    Cuda,
    Metal,
}

/// Resolve the requested device once at startup. `Auto` never fails; an
/// explicit accelerator that cannot be opened is a load error.
pub fn select_device(kind: DeviceKind) -> LoadResult<Device> {
    let device = match kind {
        DeviceKind::Auto => best_available(),
        DeviceKind::Cpu => Device::Cpu,
        DeviceKind::Cuda => Device::new_cuda(0).map_err(LoadError::Device)?,
        DeviceKind::Metal => Device::new_metal(0).map_err(LoadError::Device)?,
    };
    tracing::info!(device = ?device, "Selected compute device");
    Ok(device)
}

fn best_available() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            return device;
        }
        tracing::warn!("CUDA feature enabled but no GPU available, falling back");
    }

    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            return device;
        }
        tracing::warn!("Metal feature enabled but no device available, falling back");
    }

    Device::Cpu
}
