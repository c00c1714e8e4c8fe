//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples, and `s` is the population
//! standard deviation (ddof = 0). Constant features get `s = 1`.
//!
//! # Example
//! ```ignore
//! use forest_machine::preprocessing::{StandardScaler, Transformer, FittedTransformer};
//!
//! let fitted = StandardScaler::new().fit(&train)?;
//! let scaled = fitted.transform(&rows)?;
//! ```

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Mean of each feature.
    pub mean: Vec<f64>,
    /// Standard deviation of each feature, 1 for constant features.
    pub std: Vec<f64>,
    /// Number of features seen during fit.
    pub n_features: usize,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler;

impl StandardScaler {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for StandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let (rows, cols) = data.dim();

        if rows == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(cols));
        // Constant features keep their scale.
        let std = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        tracing::debug!(?mean, ?std, "fitted standard scaler");

        Ok(FittedStandardScaler { mean, std })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl FittedStandardScaler {
    /// Get the mean values for each feature.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Get the standard deviation values for each feature.
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    fn check_width(&self, cols: usize) -> Result<(), PreprocessingError> {
        if cols != self.mean.len() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.mean.len(),
                got_features: cols,
            });
        }
        Ok(())
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        self.check_width(data.ncols())?;
        Ok((data - &self.mean) / &self.std)
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            mean: self.mean.to_vec(),
            std: self.std.to_vec(),
            n_features: self.mean.len(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.mean.len() != params.n_features || params.std.len() != params.n_features {
            return Err(PreprocessingError::InvalidParameter(format!(
                "scaler declares {} features but stores {} means and {} deviations",
                params.n_features,
                params.mean.len(),
                params.std.len()
            )));
        }
        if params.mean.iter().any(|m| !m.is_finite()) {
            return Err(PreprocessingError::InvalidParameter(
                "scaler means must be finite".to_string(),
            ));
        }
        if params.std.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(PreprocessingError::InvalidParameter(
                "scaler deviations must be finite and non-zero".to_string(),
            ));
        }

        Ok(Self {
            mean: Array1::from(params.mean),
            std: Array1::from(params.std),
        })
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }
}
