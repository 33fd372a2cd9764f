//! Core tensor structure and property accessors.

#[cfg(feature = "gpu")]
use crate::TensorError;
use crate::{Device, Result, Shape};
use ndarray::ArrayD;

/// Generic dense tensor over a floating-point element type.
///
/// Storage is row-major and exclusively owned; buffers handed out by
/// [`as_slice`](Tensor::as_slice) / [`as_slice_mut`](Tensor::as_slice_mut)
/// view the whole contiguous allocation.
#[derive(Debug, Clone)]
pub struct Tensor<T> {
    pub storage: TensorStorage<T>,
    pub(in crate::tensor) shape: Shape,
    pub(in crate::tensor) device: Device,
}

/// Storage abstraction per device type. Only CPU storage exists; the device
/// enum is the dispatch seam for accelerator backends.
#[derive(Debug, Clone)]
pub enum TensorStorage<T> {
    Cpu(ArrayD<T>),
}

impl<T> Tensor<T> {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.shape.elements()
    }

    pub fn numel(&self) -> usize {
        self.size()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.elements() == 0
    }

    pub fn same_shape(&self, other: &Self) -> bool {
        self.shape == other.shape
    }

    /// View the underlying data as a contiguous slice (CPU tensors only).
    pub fn as_slice(&self) -> Option<&[T]> {
        match &self.storage {
            TensorStorage::Cpu(array) => array.as_slice(),
        }
    }

    /// Mutable view of the underlying data (CPU tensors only).
    pub fn as_slice_mut(&mut self) -> Option<&mut [T]> {
        match &mut self.storage {
            TensorStorage::Cpu(array) => array.as_slice_mut(),
        }
    }

    /// Value at a multi-dimensional index, if in bounds.
    pub fn get(&self, index: &[usize]) -> Option<T>
    where
        T: Clone,
    {
        match &self.storage {
            TensorStorage::Cpu(array) => {
                if index.len() != array.ndim() {
                    return None;
                }
                array.get(index).cloned()
            }
        }
    }

    /// Move the tensor to another device.
    ///
    /// CPU-to-CPU is the identity. Transfers to an accelerator device fail
    /// here, before any kernel could run against storage that is not where
    /// the caller believes it is.
    pub fn to_device(self, device: Device) -> Result<Self> {
        match device {
            Device::Cpu => Ok(self),
            #[cfg(feature = "gpu")]
            Device::Gpu(_) => Err(TensorError::UnsupportedDevice {
                operation: "to_device".to_string(),
                device: device.to_string(),
            }),
        }
    }
}
