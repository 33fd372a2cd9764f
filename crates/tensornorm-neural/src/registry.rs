//! Layer registry
//!
//! Explicit name-to-builder table constructed at startup, replacing the
//! global mutable registry pattern: callers own a [`LayerRegistry`] value,
//! populate it (or start from [`LayerRegistry::with_builtins`]), and build
//! layers from configuration by name.

use crate::layers::{GroupNorm, Layer};
use num_traits::{Float, FromPrimitive};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tensornorm_core::{Result, TensorError};

/// Parameters for a [`GroupNorm`] layer, as carried by the host's layer
/// parameter protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GroupNormConfig {
    /// Number of groups the channel axis is divided into.
    pub group_num: usize,
    /// Numerical-stability epsilon added to the variance.
    pub eps: f64,
    /// Channel count of the tensors this layer will see.
    pub num_channels: usize,
}

impl GroupNormConfig {
    pub fn new(group_num: usize, eps: f64, num_channels: usize) -> Self {
        Self {
            group_num,
            eps,
            num_channels,
        }
    }

    /// Check the parameter invariants: positive group count and epsilon,
    /// channels divisible by groups. Violations abort layer construction.
    pub fn validate(&self) -> Result<()> {
        if self.group_num == 0 {
            return Err(TensorError::invalid_argument_op(
                "GroupNormConfig",
                "group_num must be positive",
            ));
        }
        if self.eps <= 0.0 {
            return Err(TensorError::invalid_argument_op(
                "GroupNormConfig",
                "eps must be positive",
            ));
        }
        if self.num_channels % self.group_num != 0 {
            return Err(TensorError::invalid_argument_op(
                "GroupNormConfig",
                format!(
                    "num_channels ({}) must be divisible by group_num ({})",
                    self.num_channels, self.group_num
                ),
            ));
        }
        Ok(())
    }
}

/// Configuration envelope handed to layer builders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum LayerConfig {
    GroupNorm(GroupNormConfig),
}

/// Builder closure producing a boxed layer from its configuration.
pub type LayerBuilder<T> = Box<dyn Fn(&LayerConfig) -> Result<Box<dyn Layer<T>>>>;

/// Explicit layer factory keyed by name.
pub struct LayerRegistry<T> {
    builders: HashMap<String, LayerBuilder<T>>,
}

impl<T> LayerRegistry<T>
where
    T: Float + FromPrimitive + Default + Send + Sync + 'static,
{
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// A registry pre-populated with every layer this crate ships.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("GroupNorm", Box::new(build_group_norm::<T>));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, builder: LayerBuilder<T>) {
        self.builders.insert(name.into(), builder);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered layer names, sorted for stable diagnostics.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the layer registered under `name` from `config`.
    pub fn build(&self, name: &str, config: &LayerConfig) -> Result<Box<dyn Layer<T>>> {
        let builder = self.builders.get(name).ok_or_else(|| {
            TensorError::invalid_argument_op(
                "LayerRegistry::build",
                format!(
                    "unknown layer '{name}' (registered: {})",
                    self.names().join(", ")
                ),
            )
        })?;
        builder(config)
    }
}

impl<T> Default for LayerRegistry<T>
where
    T: Float + FromPrimitive + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn build_group_norm<T>(config: &LayerConfig) -> Result<Box<dyn Layer<T>>>
where
    T: Float + FromPrimitive + Default + Send + Sync + 'static,
{
    let LayerConfig::GroupNorm(params) = config;
    params.validate()?;
    let layer = GroupNorm::<T>::new(params.group_num, params.num_channels)?
        .with_epsilon(params.eps);
    Ok(Box::new(layer))
}
