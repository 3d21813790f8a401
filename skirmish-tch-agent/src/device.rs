use serde::{Deserialize, Serialize};

/// Device on which the model lives, in a serializable form.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// A CUDA device with the given index.
    Cuda(usize),

    /// Apple Metal Performance Shaders.
    Mps,
}

impl Device {
    /// CUDA device 0 if available, CPU otherwise.
    pub fn cuda_if_available() -> Self {
        tch::Device::cuda_if_available().into()
    }
}

impl From<tch::Device> for Device {
    fn from(device: tch::Device) -> Self {
        match device {
            tch::Device::Cuda(n) => Self::Cuda(n),
            tch::Device::Mps => Self::Mps,
            _ => Self::Cpu,
        }
    }
}

impl From<Device> for tch::Device {
    fn from(device: Device) -> Self {
        match device {
            Device::Cpu => tch::Device::Cpu,
            Device::Cuda(n) => tch::Device::Cuda(n),
            Device::Mps => tch::Device::Mps,
        }
    }
}
