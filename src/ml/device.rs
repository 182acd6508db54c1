// ============================================================
// Layer 5 — Execution Context
// ============================================================
// Which Burn backend (and therefore which device) a run uses.
// The choice travels explicitly from the CLI into every use
// case; nothing reads a global "current device".
//
//   Cpu  → NdArray            (always available)
//   Wgpu → Wgpu, default GPU  (Vulkan / Metal / DX12)

use serde::{Deserialize, Serialize};

pub type CpuBackend = burn::backend::NdArray;
pub type GpuBackend = burn::backend::Wgpu;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Cpu,
    Wgpu,
}

pub fn cpu_device() -> burn::backend::ndarray::NdArrayDevice {
    burn::backend::ndarray::NdArrayDevice::Cpu
}

pub fn gpu_device() -> burn::backend::wgpu::WgpuDevice {
    burn::backend::wgpu::WgpuDevice::default()
}
