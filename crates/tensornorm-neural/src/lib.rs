//! # TensorNorm Neural
//!
//! Layer abstractions built on `tensornorm-core`. This crate provides the
//! [`Layer`](layers::Layer) trait with explicit forward/backward passes, the
//! [`GroupNorm`](layers::GroupNorm) layer with its per-pass statistics
//! buffers, and an explicit [`LayerRegistry`](registry::LayerRegistry) for
//! building layers by name from configuration (no global mutable state).
//!
//! ## Quick start
//!
//! ```rust
//! use tensornorm_core::Tensor;
//! use tensornorm_neural::layers::{GroupNorm, Layer};
//!
//! # fn main() -> tensornorm_core::Result<()> {
//! let layer = GroupNorm::<f32>::new(2, 4)?;
//! let input = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[2, 4, 1, 1])?;
//! let output = layer.forward(&input)?;
//! assert_eq!(output.shape().dims(), input.shape().dims());
//! # Ok(())
//! # }
//! ```

pub mod layers;
pub mod registry;

pub use layers::{GroupNorm, Layer, LayerType};
pub use registry::{GroupNormConfig, LayerConfig, LayerRegistry};
