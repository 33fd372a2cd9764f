#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Execution device for a tensor.
///
/// The CPU path is the reference implementation. The `gpu` feature adds the
/// device variant and the dispatch seam, but no accelerator kernels ship
/// with this workspace: invoking one fails at the point of invocation rather
/// than silently falling back to the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Device {
    #[default]
    Cpu,
    #[cfg(feature = "gpu")]
    Gpu(usize),
}

impl Device {
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    #[cfg(feature = "gpu")]
    pub fn is_gpu(&self) -> bool {
        matches!(self, Device::Gpu(_))
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            #[cfg(feature = "gpu")]
            Device::Gpu(id) => write!(f, "gpu:{id}"),
        }
    }
}
