use approx::assert_relative_eq;
use tensornorm_core::numerical_gradient::{check_gradients, GradientCheckConfig};
use tensornorm_core::{Result, Tensor};
use tensornorm_neural::layers::{GroupNorm, Layer};
use tensornorm_neural::registry::{GroupNormConfig, LayerConfig, LayerRegistry};

#[test]
fn test_forward_shape_and_statistics_buffers() -> Result<()> {
    let layer = GroupNorm::<f32>::new(2, 4)?;

    // N=2, C=4, H=1, W=1, G=2 -> chip=2, statistics buffers of N*G=4.
    let input = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[2, 4, 1, 1])?;
    let output = layer.forward(&input)?;

    assert_eq!(output.shape().dims(), &[2, 4, 1, 1]);
    assert_eq!(layer.saved_mean().unwrap().size(), 4);
    assert_eq!(layer.saved_variance().unwrap().size(), 4);

    Ok(())
}

#[test]
fn test_forward_matches_manual_arithmetic() -> Result<()> {
    let layer = GroupNorm::<f32>::new(2, 4)?.with_epsilon(1e-5);
    let input = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[2, 4, 1, 1])?;
    let output = layer.forward(&input)?;

    // Groups are the pairs (1,2), (3,4), (5,6), (7,8); each normalizes to
    // -/+ 0.5 / sqrt(0.25 + eps).
    let expected = 0.5 / (0.25f32 + 1e-5).sqrt();
    let data = output.as_slice().unwrap();
    for pair in data.chunks(2) {
        assert_relative_eq!(pair[0], -expected, epsilon = 1e-5);
        assert_relative_eq!(pair[1], expected, epsilon = 1e-5);
    }

    let means = layer.saved_mean().unwrap();
    let means = means.as_slice().unwrap().to_vec();
    assert_eq!(means, vec![1.5, 3.5, 5.5, 7.5]);

    Ok(())
}

#[test]
fn test_output_is_standardized_per_group() -> Result<()> {
    let layer = GroupNorm::<f64>::new(3, 6)?.with_epsilon(1e-9);

    let values: Vec<f64> = (0..96).map(|i| ((i * 31 % 19) as f64) * 0.7 - 3.0).collect();
    let input = Tensor::from_vec(values, &[2, 6, 4, 2])?;
    let output = layer.forward(&input)?;

    // Each (example, group) slice of 16 elements has mean ~ 0, variance ~ 1.
    let data = output.as_slice().unwrap();
    for group in data.chunks(16) {
        let mean: f64 = group.iter().sum::<f64>() / 16.0;
        let var: f64 = group.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / 16.0;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-9);
        assert_relative_eq!(var, 1.0, epsilon = 1e-6);
    }

    // Variances cached for backward are non-negative.
    let variance = layer.saved_variance().unwrap();
    for &v in variance.as_slice().unwrap() {
        assert!(v >= 0.0);
    }

    Ok(())
}

#[test]
fn test_gradient_matches_finite_differences() -> Result<()> {
    let layer = GroupNorm::<f64>::new(2, 4)?;

    let values: Vec<f64> = (0..16).map(|i| ((i * 11 % 13) as f64) * 0.3 - 1.8).collect();
    let input = Tensor::from_vec(values, &[2, 4, 2, 1])?;
    let weights: Vec<f64> = (0..16).map(|i| ((i % 7) as f64) * 0.25 - 0.75).collect();
    let upstream = Tensor::from_vec(weights, &[2, 4, 2, 1])?;

    // Loss: sum(w * layer(x)), so the upstream gradient is w.
    layer.forward(&input)?;
    let analytic = layer.backward(&upstream)?;

    let loss = |x: &Tensor<f64>| -> Result<f64> {
        let out = layer.forward(x)?;
        Ok(out
            .as_slice()
            .unwrap()
            .iter()
            .zip(upstream.as_slice().unwrap())
            .map(|(o, w)| o * w)
            .sum())
    };

    let report = check_gradients(&input, loss, &analytic, &GradientCheckConfig::default())?;
    assert_eq!(report.num_checked, 16);
    Ok(())
}

#[test]
fn test_group_count_boundaries() -> Result<()> {
    let values: Vec<f64> = (0..8).map(|i| (i as f64) * 1.5 - 4.0).collect();
    let input = Tensor::from_vec(values.clone(), &[2, 4, 1, 1])?;

    // G=1: one group spanning all channels of an example.
    let whole = GroupNorm::<f64>::new(1, 4)?.with_epsilon(1e-10);
    let output = whole.forward(&input)?;
    for (n, example) in values.chunks(4).enumerate() {
        let mu: f64 = example.iter().sum::<f64>() / 4.0;
        let var: f64 = example.iter().map(|x| (x - mu) * (x - mu)).sum::<f64>() / 4.0;
        let inv_std = 1.0 / (var + 1e-10).sqrt();
        for (i, &x) in example.iter().enumerate() {
            let got = output.as_slice().unwrap()[n * 4 + i];
            assert_relative_eq!(got, (x - mu) * inv_std, epsilon = 1e-9);
        }
    }

    // G=C: instance normalization; with one element per group the output is
    // zero (the element equals its own mean).
    let instance = GroupNorm::<f64>::new(4, 4)?;
    let output = instance.forward(&input)?;
    for &v in output.as_slice().unwrap() {
        assert_relative_eq!(v, 0.0, epsilon = 1e-9);
    }
    assert_eq!(instance.saved_mean().unwrap().size(), 8);

    Ok(())
}

#[test]
fn test_registry_built_layer_matches_direct_construction() -> Result<()> {
    let registry = LayerRegistry::<f32>::with_builtins();
    let config = LayerConfig::GroupNorm(GroupNormConfig::new(2, 1e-5, 4));
    let from_registry = registry.build("GroupNorm", &config)?;

    let direct = GroupNorm::<f32>::new(2, 4)?.with_epsilon(1e-5);

    let input = Tensor::from_vec(vec![0.5, 1.5, -0.5, 2.0, 3.0, -1.0, 0.0, 1.0], &[2, 4, 1, 1])?;
    let a = from_registry.forward(&input)?;
    let b = direct.forward(&input)?;
    assert_eq!(a.as_slice().unwrap(), b.as_slice().unwrap());

    Ok(())
}

#[test]
fn test_registry_error_paths() {
    let registry = LayerRegistry::<f32>::with_builtins();

    let config = LayerConfig::GroupNorm(GroupNormConfig::new(2, 1e-5, 4));
    assert!(registry.build("BatchNorm", &config).is_err());

    // Indivisible channels and non-positive eps abort the build.
    let bad_groups = LayerConfig::GroupNorm(GroupNormConfig::new(3, 1e-5, 4));
    assert!(registry.build("GroupNorm", &bad_groups).is_err());
    let bad_eps = LayerConfig::GroupNorm(GroupNormConfig::new(2, -1.0, 4));
    assert!(registry.build("GroupNorm", &bad_eps).is_err());
}

#[test]
fn test_layer_clone_box_is_independent() -> Result<()> {
    let layer = GroupNorm::<f32>::new(2, 4)?;
    let input = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[1, 4, 1, 1])?;
    layer.forward(&input)?;

    let boxed = layer.clone_box();
    let grad = Tensor::from_vec(vec![1.0, -1.0, 0.5, 0.0], &[1, 4, 1, 1])?;

    // The clone carries the cached statistics of the original's last pass.
    let a = layer.backward(&grad)?;
    let b = boxed.backward(&grad)?;
    assert_eq!(a.as_slice().unwrap(), b.as_slice().unwrap());

    Ok(())
}
