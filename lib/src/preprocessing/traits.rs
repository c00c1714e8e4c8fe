//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; ready for inference and serialization.

use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;

/// Trait for unfitted transformers with hyperparameters.
///
/// A transformer learns parameters from training data and can then transform
/// new data using those learned parameters. This trait represents the
/// configurable, unfitted state.
///
/// # Example
/// ```ignore
/// use forest_machine::preprocessing::{StandardScaler, Transformer, FittedTransformer};
///
/// let fitted = StandardScaler::new().fit(&train)?;
/// let scaled = fitted.transform(&new_rows)?;
/// ```
pub trait Transformer: Clone {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params, Input = Self::Input, Output = Self::Output>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::EmptyData`] if there is nothing to learn from.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;
}

/// Trait for fitted transformers ready for inference.
///
/// Learned statistics are frozen: `transform` never refits.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
pub trait FittedTransformer: Clone {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::FeatureMismatch`] if the input width
    /// differs from the one seen during fit.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;

    /// Returns the number of features seen during fit.
    fn n_features_in(&self) -> usize;
}
