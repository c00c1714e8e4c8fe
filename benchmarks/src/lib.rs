//! Benchmark utilities for forest-machine.
//!
//! - Synthetic bestiary generation
//! - Classification metrics (accuracy, confidence, precision/recall)

pub mod data;
pub mod metrics;

pub use data::Bestiary;
pub use metrics::{ClassMetrics, Evaluation, Metrics};
