//! Numerical gradient validation
//!
//! Compares analytical gradients against finite-difference approximations:
//!
//! ```text
//! f'(x) ~ [f(x + eps) - f(x - eps)] / (2 * eps)
//! ```
//!
//! Used by the kernel and layer test suites to verify the closed-form
//! backward passes element by element.

use crate::{Result, Tensor, TensorError};
use num_traits::{Float, FromPrimitive, ToPrimitive};

/// Configuration for numerical gradient checking.
#[derive(Debug, Clone)]
pub struct GradientCheckConfig {
    /// Step size for the finite-difference perturbation.
    pub epsilon: f64,
    /// Relative tolerance for gradient comparison.
    pub rtol: f64,
    /// Absolute tolerance for gradient comparison.
    pub atol: f64,
    /// Central differences (2 evaluations per element) vs forward differences.
    pub use_central_difference: bool,
}

impl Default for GradientCheckConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-5,
            rtol: 1e-3,
            atol: 1e-5,
            use_central_difference: true,
        }
    }
}

/// Summary of a successful gradient check.
#[derive(Debug, Clone)]
pub struct GradientCheckReport {
    pub max_abs_error: f64,
    pub num_checked: usize,
}

/// Check an analytical gradient of a scalar-valued function against finite
/// differences, element by element.
///
/// `f` maps the input tensor to a scalar loss; `analytic` must have the
/// input's shape. Returns an error describing the first element whose
/// numerical and analytical gradients disagree beyond
/// `atol + rtol * max(|numerical|, |analytical|)`.
pub fn check_gradients<T, F>(
    input: &Tensor<T>,
    f: F,
    analytic: &Tensor<T>,
    config: &GradientCheckConfig,
) -> Result<GradientCheckReport>
where
    T: Float + FromPrimitive + Default + Send + Sync + 'static,
    F: Fn(&Tensor<T>) -> Result<T>,
{
    const OP: &str = "check_gradients";

    if !analytic.same_shape(input) {
        return Err(TensorError::shape_mismatch(
            OP,
            input.shape().to_string(),
            analytic.shape().to_string(),
        ));
    }

    let eps = T::from_f64(config.epsilon)
        .ok_or_else(|| TensorError::numerical_error(OP, "epsilon not representable"))?;

    let analytic_data = analytic
        .as_slice()
        .ok_or_else(|| TensorError::invalid_shape_op(OP, "gradient tensor is not contiguous"))?;

    let input_data = input
        .as_slice()
        .ok_or_else(|| TensorError::invalid_shape_op(OP, "input tensor is not contiguous"))?;

    let base_loss = if config.use_central_difference {
        T::zero()
    } else {
        f(input)?
    };

    let n = input.size();
    let mut max_abs_error = 0.0f64;

    let perturb = |probe: &mut Tensor<T>, i: usize, value: T| -> Result<()> {
        let data = probe
            .as_slice_mut()
            .ok_or_else(|| TensorError::invalid_shape_op(OP, "probe tensor is not contiguous"))?;
        data[i] = value;
        Ok(())
    };

    for i in 0..n {
        let original = input_data[i];
        let mut probe = input.clone();
        let numerical = if config.use_central_difference {
            perturb(&mut probe, i, original + eps)?;
            let plus = f(&probe)?;
            perturb(&mut probe, i, original - eps)?;
            let minus = f(&probe)?;
            (plus - minus) / (eps + eps)
        } else {
            perturb(&mut probe, i, original + eps)?;
            let plus = f(&probe)?;
            (plus - base_loss) / eps
        };

        let numerical = numerical.to_f64().ok_or_else(|| {
            TensorError::numerical_error(OP, "numerical gradient not representable as f64")
        })?;
        let expected = analytic_data[i].to_f64().ok_or_else(|| {
            TensorError::numerical_error(OP, "analytical gradient not representable as f64")
        })?;

        let abs_error = (numerical - expected).abs();
        let tolerance = config.atol + config.rtol * numerical.abs().max(expected.abs());
        if abs_error > tolerance {
            return Err(TensorError::numerical_error(
                OP,
                format!(
                    "gradient mismatch at flat index {i}: numerical {numerical}, \
                     analytical {expected}, error {abs_error} > tolerance {tolerance}"
                ),
            ));
        }
        max_abs_error = max_abs_error.max(abs_error);
    }

    Ok(GradientCheckReport {
        max_abs_error,
        num_checked: n,
    })
}
