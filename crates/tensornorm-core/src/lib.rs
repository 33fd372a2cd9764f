//! # TensorNorm Core
//!
//! Core tensor container and numerical kernels for the TensorNorm workspace.
//! This crate provides the generic [`Tensor`] type backed by row-major CPU
//! storage, the shape/device/error vocabulary shared across the workspace,
//! the group-normalization forward/backward kernels, and a finite-difference
//! gradient validation utility used to verify analytical gradients.
//!
//! The element type is generic over floating-point precision; everything is
//! instantiable at `f32` and `f64`.

pub mod device;
pub mod error;
pub mod numerical_gradient;
pub mod ops;
pub mod shape;
pub mod tensor;

pub use device::Device;
pub use error::{Result, TensorError};
pub use shape::Shape;
pub use tensor::{Tensor, TensorStorage};
