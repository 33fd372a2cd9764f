pub mod normalization;

pub use normalization::GroupNorm;

use tensornorm_core::{Result, Tensor};

/// Kind of a layer, for introspection and registry diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    GroupNorm,
    Unknown,
}

/// A network layer with explicit forward and backward passes.
///
/// The host executes layers twice per training step: forward to produce the
/// output (and let the layer cache whatever its backward pass needs), then
/// backward with the upstream gradient to produce the input gradient.
/// Forward takes `&self`; layers that cache state use interior mutability
/// over buffers they exclusively own.
pub trait Layer<T> {
    fn forward(&self, input: &Tensor<T>) -> Result<Tensor<T>>;

    /// Gradient with respect to the input, given the gradient with respect
    /// to the output of the most recent forward pass.
    fn backward(&self, grad_output: &Tensor<T>) -> Result<Tensor<T>>;

    fn parameters(&self) -> Vec<&Tensor<T>>;

    fn parameters_mut(&mut self) -> Vec<&mut Tensor<T>>;

    fn set_training(&mut self, training: bool);

    fn clone_box(&self) -> Box<dyn Layer<T>>;

    fn layer_type(&self) -> LayerType {
        LayerType::Unknown
    }
}
