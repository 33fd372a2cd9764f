//! Group Normalization kernels
//!
//! Input shape: `[batch, channels, ...]`, row-major, spatial extent being the
//! product of every dimension after the channel axis. For each example `n`
//! and group `g` the kernels reduce over `channels_per_group * spatial`
//! contiguous elements.
//!
//! The forward kernel writes the per-(example, group) mean and variance into
//! caller-owned buffers of size `batch * num_groups` and fills a same-shaped
//! normalized cache; the backward kernel consumes those buffers to produce
//! the input gradient without recomputing the reduction.

use crate::tensor::TensorStorage;
use crate::{Result, Tensor, TensorError};
use num_traits::{Float, FromPrimitive};

/// Sizes shared by the forward and backward kernels, derived once per call.
struct GroupGeometry {
    batch: usize,
    num_groups: usize,
    /// channels / num_groups
    chip: usize,
    /// product of all dimensions after the channel axis
    spatial: usize,
}

impl GroupGeometry {
    fn group_size(&self) -> usize {
        self.chip * self.spatial
    }

    fn stat_len(&self) -> usize {
        self.batch * self.num_groups
    }
}

fn resolve_geometry<T>(
    operation: &str,
    input: &Tensor<T>,
    num_groups: usize,
) -> Result<GroupGeometry> {
    #[cfg(feature = "gpu")]
    if !input.device().is_cpu() {
        return Err(TensorError::not_implemented(
            operation,
            format!(
                "no accelerator kernel is registered for device {}",
                input.device()
            ),
        ));
    }

    let dims = input.shape().dims();
    if dims.len() < 2 {
        return Err(TensorError::invalid_shape_op(
            operation,
            format!(
                "expected at least 2D input (batch, channels, ...), got {}D",
                dims.len()
            ),
        ));
    }

    if num_groups == 0 {
        return Err(TensorError::invalid_argument_op(
            operation,
            "num_groups must be positive",
        ));
    }

    let batch = dims[0];
    let channels = dims[1];
    if channels % num_groups != 0 {
        return Err(TensorError::invalid_argument_op(
            operation,
            format!("channels ({channels}) must be divisible by num_groups ({num_groups})"),
        ));
    }

    // Same derivation as count / (channels * batch); exact because the
    // layout is contiguous row-major.
    let spatial: usize = dims[2..].iter().product();

    Ok(GroupGeometry {
        batch,
        num_groups,
        chip: channels / num_groups,
        spatial,
    })
}

fn check_stat_buffer<T>(operation: &str, name: &str, buf: &Tensor<T>, expected: usize) -> Result<()> {
    if buf.size() != expected {
        return Err(TensorError::shape_mismatch(
            operation,
            format!("{name} buffer of {expected} elements"),
            format!("{} elements", buf.size()),
        ));
    }
    Ok(())
}

fn contiguous<'a, T>(operation: &str, tensor: &'a Tensor<T>) -> Result<&'a [T]> {
    match &tensor.storage {
        TensorStorage::Cpu(array) => array.as_slice().ok_or_else(|| {
            TensorError::invalid_shape_op(operation, "tensor storage is not contiguous")
        }),
    }
}

/// Group-normalization forward pass.
///
/// For each (example, group) slice of `channels_per_group * spatial`
/// elements: computes the mean, the variance (mean of squared deviations),
/// and `x_norm = (x - mean) / sqrt(variance + epsilon)`. The stabilizer is
/// added under the square root before any division takes place, so the
/// divisor is never smaller than `sqrt(epsilon)`.
///
/// `mean` and `variance` must hold exactly `batch * num_groups` elements and
/// `x_norm` must have the input's shape; all three are overwritten. The
/// returned output equals the normalized cache (this kernel applies no
/// affine transform).
pub fn group_norm_forward<T>(
    input: &Tensor<T>,
    num_groups: usize,
    epsilon: T,
    mean: &mut Tensor<T>,
    variance: &mut Tensor<T>,
    x_norm: &mut Tensor<T>,
) -> Result<Tensor<T>>
where
    T: Float + FromPrimitive + Default + Send + Sync + 'static,
{
    const OP: &str = "group_norm_forward";

    if epsilon <= T::zero() {
        return Err(TensorError::invalid_argument_op(
            OP,
            "epsilon must be positive",
        ));
    }

    let geom = resolve_geometry(OP, input, num_groups)?;
    check_stat_buffer(OP, "mean", mean, geom.stat_len())?;
    check_stat_buffer(OP, "variance", variance, geom.stat_len())?;
    if !x_norm.same_shape(input) {
        return Err(TensorError::shape_mismatch(
            OP,
            input.shape().to_string(),
            x_norm.shape().to_string(),
        ));
    }

    let group_size = geom.group_size();
    let inv_m = T::from_usize(group_size)
        .map(|m| m.recip())
        .ok_or_else(|| TensorError::numerical_error(OP, "group size not representable"))?;

    let data = contiguous(OP, input)?;
    let mut output = vec![T::zero(); data.len()];

    // Scoped so the mutable borrows end before the buffers are read again.
    {
        let mean_data = mean
            .as_slice_mut()
            .ok_or_else(|| TensorError::invalid_shape_op(OP, "mean buffer is not contiguous"))?;
        let var_data = variance.as_slice_mut().ok_or_else(|| {
            TensorError::invalid_shape_op(OP, "variance buffer is not contiguous")
        })?;

        for n in 0..geom.batch {
            for g in 0..geom.num_groups {
                let stat_idx = n * geom.num_groups + g;
                // (n, g) elements are contiguous in NCHW layout.
                let base = stat_idx * group_size;
                let seg = &data[base..base + group_size];

                let mut sum = T::zero();
                for &v in seg {
                    sum = sum + v;
                }
                let mu = sum * inv_m;

                let mut var_sum = T::zero();
                for &v in seg {
                    let d = v - mu;
                    var_sum = var_sum + d * d;
                }
                let var = var_sum * inv_m;

                mean_data[stat_idx] = mu;
                var_data[stat_idx] = var;

                let inv_std = (var + epsilon).sqrt().recip();
                for (dst, &v) in output[base..base + group_size].iter_mut().zip(seg) {
                    *dst = (v - mu) * inv_std;
                }
            }
        }
    }

    let cache = x_norm
        .as_slice_mut()
        .ok_or_else(|| TensorError::invalid_shape_op(OP, "x_norm buffer is not contiguous"))?;
    cache.copy_from_slice(&output);

    Tensor::from_vec(output, input.shape().dims())
}

/// Group-normalization backward pass.
///
/// Given the upstream gradient `dy`, the cached normalized values `x_norm`,
/// and the cached per-group variance, produces the gradient with respect to
/// the input. The mean and variance are themselves functions of the input,
/// so for each group with `m = channels_per_group * spatial` elements:
///
/// ```text
/// dx_i = (dy_i - mean(dy) - x_norm_i * mean(dy * x_norm)) / sqrt(var + eps)
/// ```
///
/// where both means run over the group's elements.
pub fn group_norm_backward<T>(
    grad_output: &Tensor<T>,
    x_norm: &Tensor<T>,
    variance: &Tensor<T>,
    num_groups: usize,
    epsilon: T,
) -> Result<Tensor<T>>
where
    T: Float + FromPrimitive + Default + Send + Sync + 'static,
{
    const OP: &str = "group_norm_backward";

    if epsilon <= T::zero() {
        return Err(TensorError::invalid_argument_op(
            OP,
            "epsilon must be positive",
        ));
    }

    if !grad_output.same_shape(x_norm) {
        return Err(TensorError::shape_mismatch(
            OP,
            x_norm.shape().to_string(),
            grad_output.shape().to_string(),
        ));
    }

    let geom = resolve_geometry(OP, grad_output, num_groups)?;
    check_stat_buffer(OP, "variance", variance, geom.stat_len())?;

    let group_size = geom.group_size();
    let inv_m = T::from_usize(group_size)
        .map(|m| m.recip())
        .ok_or_else(|| TensorError::numerical_error(OP, "group size not representable"))?;

    let dy = contiguous(OP, grad_output)?;
    let norm = contiguous(OP, x_norm)?;
    let var = contiguous(OP, variance)?;

    let mut grad_input = vec![T::zero(); dy.len()];

    for n in 0..geom.batch {
        for g in 0..geom.num_groups {
            let stat_idx = n * geom.num_groups + g;
            let base = stat_idx * group_size;
            let dy_seg = &dy[base..base + group_size];
            let norm_seg = &norm[base..base + group_size];

            let mut dy_sum = T::zero();
            let mut dot_sum = T::zero();
            for (&d, &x) in dy_seg.iter().zip(norm_seg) {
                dy_sum = dy_sum + d;
                dot_sum = dot_sum + d * x;
            }
            let dy_mean = dy_sum * inv_m;
            let dot_mean = dot_sum * inv_m;

            let inv_std = (var[stat_idx] + epsilon).sqrt().recip();
            for (dst, (&d, &x)) in grad_input[base..base + group_size]
                .iter_mut()
                .zip(dy_seg.iter().zip(norm_seg))
            {
                *dst = (d - dy_mean - x * dot_mean) * inv_std;
            }
        }
    }

    Tensor::from_vec(grad_input, grad_output.shape().dims())
}
