//! Group Normalization layer
//!
//! Divides the channel axis into `num_groups` groups of `channels / num_groups`
//! channels and normalizes each (example, group) slice by its own mean and
//! variance. G=1 behaves like whole-example normalization, G=C like instance
//! normalization.
//!
//! The layer owns its statistics buffers: the reshape step sizes them
//! whenever the observed input shape changes, forward overwrites them, and
//! the paired backward pass consumes them. Nothing persists across training
//! steps. This layer applies no learned scale/shift; its parameter list is
//! empty.

use crate::layers::{Layer, LayerType};
use num_traits::{Float, FromPrimitive};
use std::cell::RefCell;
use tensornorm_core::ops::{group_norm_backward, group_norm_forward};
use tensornorm_core::{Result, Shape, Tensor, TensorError};

/// Per-pass buffers, sized at reshape time and overwritten every forward.
#[derive(Clone)]
struct PassState<T> {
    input_shape: Shape,
    mean: Tensor<T>,
    variance: Tensor<T>,
    x_norm: Tensor<T>,
}

#[derive(Clone)]
pub struct GroupNorm<T> {
    num_groups: usize,
    num_channels: usize,
    epsilon: f64,
    state: RefCell<Option<PassState<T>>>,
}

impl<T> GroupNorm<T>
where
    T: Float + FromPrimitive + Default + Send + Sync + 'static,
{
    /// Create a group-normalization layer over `num_channels` channels split
    /// into `num_groups` groups. Fails if the channel count is not divisible
    /// by the group count; that violation is not recoverable later.
    pub fn new(num_groups: usize, num_channels: usize) -> Result<Self> {
        if num_groups == 0 {
            return Err(TensorError::invalid_argument_op(
                "GroupNorm::new",
                "num_groups must be positive",
            ));
        }
        if num_channels % num_groups != 0 {
            return Err(TensorError::invalid_argument_op(
                "GroupNorm::new",
                format!(
                    "num_channels ({num_channels}) must be divisible by num_groups ({num_groups})"
                ),
            ));
        }

        Ok(Self {
            num_groups,
            num_channels,
            epsilon: 1e-5,
            state: RefCell::new(None),
        })
    }

    /// Set the numerical-stability epsilon (validated as positive on the
    /// next forward pass).
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Channels per group.
    pub fn channels_per_group(&self) -> usize {
        self.num_channels / self.num_groups
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Per-(example, group) means cached by the most recent forward pass,
    /// `batch * num_groups` elements. `None` before the first forward.
    pub fn saved_mean(&self) -> Option<Tensor<T>> {
        self.state.borrow().as_ref().map(|s| s.mean.clone())
    }

    /// Per-(example, group) variances cached by the most recent forward
    /// pass. `None` before the first forward.
    pub fn saved_variance(&self) -> Option<Tensor<T>> {
        self.state.borrow().as_ref().map(|s| s.variance.clone())
    }

    fn validate_input(&self, input: &Tensor<T>) -> Result<()> {
        let dims = input.shape().dims();
        if dims.len() < 2 {
            return Err(TensorError::invalid_shape_op(
                "GroupNorm::forward",
                format!(
                    "expected at least 2D input (batch, channels, ...), got {}D",
                    dims.len()
                ),
            ));
        }
        if dims[1] != self.num_channels {
            return Err(TensorError::invalid_shape_op(
                "GroupNorm::forward",
                format!("expected {} channels, got {}", self.num_channels, dims[1]),
            ));
        }
        if self.epsilon <= 0.0 {
            return Err(TensorError::invalid_argument_op(
                "GroupNorm::forward",
                "epsilon must be positive",
            ));
        }
        Ok(())
    }

    /// Size the per-pass buffers for `input_shape`. Runs on the first
    /// forward and again whenever the observed shape changes (for example a
    /// batch-size change); a no-op otherwise.
    fn reshape(&self, input_shape: &Shape) {
        let mut state = self.state.borrow_mut();
        let fits = state
            .as_ref()
            .map(|s| &s.input_shape == input_shape)
            .unwrap_or(false);
        if fits {
            return;
        }

        let batch = input_shape[0];
        let stat_len = batch * self.num_groups;
        *state = Some(PassState {
            input_shape: input_shape.clone(),
            mean: Tensor::zeros(&[stat_len]),
            variance: Tensor::zeros(&[stat_len]),
            x_norm: Tensor::zeros(input_shape.dims()),
        });
    }
}

impl<T> Layer<T> for GroupNorm<T>
where
    T: Float + FromPrimitive + Default + Send + Sync + 'static,
{
    fn forward(&self, input: &Tensor<T>) -> Result<Tensor<T>> {
        self.validate_input(input)?;
        self.reshape(input.shape());

        let eps = T::from_f64(self.epsilon).ok_or_else(|| {
            TensorError::numerical_error("GroupNorm::forward", "epsilon not representable")
        })?;

        let mut state = self.state.borrow_mut();
        let state = state.as_mut().ok_or_else(|| {
            TensorError::invalid_operation_simple("GroupNorm state missing after reshape")
        })?;

        group_norm_forward(
            input,
            self.num_groups,
            eps,
            &mut state.mean,
            &mut state.variance,
            &mut state.x_norm,
        )
    }

    fn backward(&self, grad_output: &Tensor<T>) -> Result<Tensor<T>> {
        let eps = T::from_f64(self.epsilon).ok_or_else(|| {
            TensorError::numerical_error("GroupNorm::backward", "epsilon not representable")
        })?;

        let state = self.state.borrow();
        let state = state.as_ref().ok_or_else(|| TensorError::InvalidOperation {
            operation: "GroupNorm::backward".to_string(),
            reason: "backward called before any forward pass".to_string(),
        })?;

        group_norm_backward(
            grad_output,
            &state.x_norm,
            &state.variance,
            self.num_groups,
            eps,
        )
    }

    fn parameters(&self) -> Vec<&Tensor<T>> {
        // No learned affine transform: nothing to optimize.
        Vec::new()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor<T>> {
        Vec::new()
    }

    fn set_training(&mut self, _training: bool) {
        // Behavior is identical in training and evaluation.
    }

    fn clone_box(&self) -> Box<dyn Layer<T>> {
        Box::new(self.clone())
    }

    fn layer_type(&self) -> LayerType {
        LayerType::GroupNorm
    }
}
