//! # forest-machine
//!
//! Train, query and persist a random forest that predicts a categorical label
//! from a handful of numeric features.
//!
//! ## Core Design Principles
//!
//! - **Training/Inference Separation**: unfitted values carry hyperparameters,
//!   `fit` returns an immutable fitted value that only predicts and exports
//!   its parameters.
//! - **Explicit Randomness**: every fit is driven by a seed, so the same table
//!   and settings reproduce the same forest.
//! - **All-or-Nothing Artifacts**: a machine is saved as one versioned,
//!   checksummed blob, replaced atomically on disk.
//!
//! ## Quick Start
//!
//! ```rust
//! use forest_machine::{Table, Trainer};
//!
//! let levels: Vec<f64> = (0..40).map(|i| i as f64 * 2.5).collect();
//! let rarity = levels
//!     .iter()
//!     .map(|&l| if l > 50.0 { "Rare" } else { "Common" }.to_string())
//!     .collect();
//! let table = Table::new()
//!     .with_numeric("Level", levels.clone())?
//!     .with_numeric("Health", vec![10.0; 40])?
//!     .with_numeric("Energy", vec![20.0; 40])?
//!     .with_numeric("Sanity", vec![30.0; 40])?
//!     .with_categorical("Rarity", rarity)?;
//!
//! let machine = Trainer::builder().n_estimators(25).build()?.fit(&table)?;
//! let row = Table::from_row([
//!     ("Level", 90.0),
//!     ("Health", 10.0),
//!     ("Energy", 20.0),
//!     ("Sanity", 30.0),
//! ])?;
//! let prediction = machine.predict(&row)?;
//! assert_eq!(prediction.label, "Rare");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: named-column tables and table sources (memory, CSV)
//! - `preprocessing`: standard scaler and label encoder
//! - `model`: decision trees and the random forest
//! - `trainer`: training configuration and entry point
//! - `machine`: prediction, save/open and describe for the fitted pipeline
//! - `serialization`: parameter encoding and the artifact envelope

/// Tabular input data and where it comes from.
pub mod dataset;

/// Error types surfaced by the public API.
pub mod error;

/// The fitted prediction pipeline.
pub mod machine;

/// Tree ensemble classifiers.
pub mod model;

/// Data preprocessing transformers.
pub mod preprocessing;

/// Model persistence formats.
pub mod serialization;

/// Training configuration and orchestration.
pub mod trainer;

pub use dataset::{Column, CsvSource, InMemorySource, Table, TableError, TableSource};
pub use error::MachineError;
pub use machine::{ClassDistribution, Machine, MachineParams, Prediction, FAMILY_NAME};
pub use model::{InferenceModel, MaxFeatures, SplitCriterion};
pub use trainer::{Trainer, TrainerBuilder, TrainerConfig};
