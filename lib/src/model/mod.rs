//! Tree ensemble classifiers.
//!
//! Models follow the same unfitted/fitted split as the preprocessing
//! transformers: [`RandomForestClassifier`] holds hyperparameters, its `fit`
//! returns a [`FittedRandomForest`] that only knows how to predict and how to
//! export its parameters.

pub mod criterion;
pub mod forest;
pub mod tree;

pub use criterion::SplitCriterion;
pub use forest::{
    ClassVotes, FittedRandomForest, ForestConfig, ForestParams, MaxFeatures,
    RandomForestClassifier,
};
pub use tree::{DecisionTree, Node, NodeIndex, NodeKind, TreeConfig};

use crate::error::MachineError;
use crate::serialization::SerializableParams;

/// Inference side of a trained model.
///
/// A fitted model is free from training hyperparameters it no longer needs
/// and can be rebuilt from its exported parameters.
pub trait InferenceModel {
    /// Single-sample input.
    type InputSingle: ?Sized;
    /// Single-sample output.
    type OutputSingle;
    /// Serializable parameter representation.
    type ParamsRepr: SerializableParams;

    /// Predict on a single sample.
    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle;

    /// Export learned parameters.
    fn extract_params(&self) -> Self::ParamsRepr;

    /// Rebuild from exported parameters, validating their structure.
    fn from_params(params: Self::ParamsRepr) -> Result<Self, MachineError>
    where
        Self: Sized;
}

/// Index of the largest count; ties go to the lowest index.
pub(crate) fn argmax(counts: &[usize]) -> usize {
    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    best
}
