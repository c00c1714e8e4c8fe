//! Scaling transformers for feature normalization.
//!
//! Tree splits are invariant to per-feature affine scaling, but the scaler is
//! part of the fitted pipeline so that the stored model reproduces the exact
//! feature space its trees were grown in.

pub mod standard;

pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerParams};
