//! Normalization Operations
//!
//! Group normalization divides the channel axis into groups and normalizes
//! each (example, group) slice by its own mean and variance, which makes the
//! statistics independent of batch size. Forward and backward kernels live
//! in [`group_norm`]; the layer wrapper that owns the statistics buffers is
//! in the `tensornorm-neural` crate.

pub mod group_norm;


pub use group_norm::{group_norm_backward, group_norm_forward};
