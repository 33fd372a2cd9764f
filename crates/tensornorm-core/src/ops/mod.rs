//! Numerical operations.

pub mod normalization;

pub use normalization::{group_norm_backward, group_norm_forward};
