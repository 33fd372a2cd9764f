//! Normalization Layers
//!
//! Currently group normalization only. GroupNorm spans the spectrum between
//! whole-example normalization (one group) and per-channel instance
//! normalization (one group per channel), with statistics independent of
//! batch size.

pub mod group_norm;

pub use group_norm::GroupNorm;
