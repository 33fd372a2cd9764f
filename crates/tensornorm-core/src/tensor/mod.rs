//! Tensor container
//!
//! Split by concern: `core` holds the structure, storage enum, and property
//! accessors; `creation` holds the constructors.

pub mod core;
pub mod creation;

pub use core::{Tensor, TensorStorage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_constructors() {
        let zeros = Tensor::<f32>::zeros(&[2, 3]);
        assert_eq!(zeros.shape().dims(), &[2, 3]);
        assert_eq!(zeros.size(), 6);

        let ones = Tensor::<f32>::ones(&[2, 2]);
        if let Some(data) = ones.as_slice() {
            assert_eq!(data, &[1.0, 1.0, 1.0, 1.0]);
        }

        let full = Tensor::<f32>::full(&[3], 5.0);
        if let Some(data) = full.as_slice() {
            assert_eq!(data, &[5.0, 5.0, 5.0]);
        }
    }

    #[test]
    fn test_from_vec() {
        let t = Tensor::<f64>::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        assert_eq!(t.rank(), 2);
        assert_eq!(t.get(&[1, 0]), Some(3.0));

        // Length must match the shape exactly
        let bad = Tensor::<f64>::from_vec(vec![1.0, 2.0, 3.0], &[2, 2]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_tensor_properties() {
        let tensor = Tensor::<f32>::zeros(&[2, 3, 4]);
        assert_eq!(tensor.size(), 24);
        assert_eq!(tensor.numel(), 24);
        assert_eq!(tensor.rank(), 3);
        assert!(!tensor.is_empty());
        assert!(tensor.device().is_cpu());

        let other = Tensor::<f32>::ones(&[2, 3, 4]);
        assert!(tensor.same_shape(&other));
        assert!(!tensor.same_shape(&Tensor::<f32>::zeros(&[2, 3])));
    }

    #[test]
    fn test_mutable_access() {
        let mut t = Tensor::<f32>::zeros(&[4]);
        if let Some(data) = t.as_slice_mut() {
            data[2] = 7.0;
        }
        assert_eq!(t.as_slice(), Some(&[0.0, 0.0, 7.0, 0.0][..]));
    }

    #[test]
    fn test_to_device_cpu_is_identity() {
        let t = Tensor::<f32>::ones(&[2]);
        let moved = t.to_device(crate::Device::Cpu).unwrap();
        assert!(moved.device().is_cpu());
    }

    #[cfg(feature = "gpu")]
    #[test]
    fn test_to_device_gpu_fails_without_runtime() {
        let t = Tensor::<f32>::ones(&[2]);
        assert!(t.to_device(crate::Device::Gpu(0)).is_err());
    }
}
