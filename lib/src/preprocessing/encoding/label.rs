//! Label encoding for 1D target labels.
//!
//! Maps target labels to integer indices (0, 1, 2, ...).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::preprocessing::error::PreprocessingError;

/// Label encoder for 1D target labels.
///
/// # Example
/// ```rust
/// use forest_machine::preprocessing::LabelEncoder;
///
/// let labels = vec!["Rare".to_string(), "Common".to_string(), "Rare".to_string()];
/// let fitted = LabelEncoder::new().fit(&labels).unwrap();
///
/// assert_eq!(fitted.classes(), &["Common", "Rare"]);
/// assert_eq!(fitted.transform(&labels).unwrap(), vec![1, 0, 1]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LabelEncoder;

impl LabelEncoder {
    /// Create a new LabelEncoder.
    pub fn new() -> Self {
        Self
    }

    /// Fit the encoder to the labels and return the fitted encoder.
    pub fn fit<S: AsRef<str>>(&self, labels: &[S]) -> Result<FittedLabelEncoder, PreprocessingError> {
        if labels.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit LabelEncoder on empty data".to_string(),
            ));
        }

        let classes: BTreeSet<&str> = labels.iter().map(AsRef::as_ref).collect();
        let classes: Vec<String> = classes.into_iter().map(str::to_string).collect();

        Ok(FittedLabelEncoder::from_classes(classes))
    }

    /// Fit and transform in one step.
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        labels: &[S],
    ) -> Result<(FittedLabelEncoder, Vec<usize>), PreprocessingError> {
        let fitted = self.fit(labels)?;
        let encoded = fitted.transform(labels)?;
        Ok((fitted, encoded))
    }
}

/// Serializable parameters for a fitted LabelEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoderParams {
    /// Unique classes in sorted order.
    pub classes: Vec<String>,
}

/// Fitted LabelEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedLabelEncoder {
    /// Unique classes in sorted order.
    classes: Vec<String>,
    /// Mapping from class value to index.
    class_to_idx: HashMap<String, usize>,
}

impl FittedLabelEncoder {
    fn from_classes(classes: Vec<String>) -> Self {
        let class_to_idx = classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (class.clone(), idx))
            .collect();
        Self {
            classes,
            class_to_idx,
        }
    }

    /// Get the unique classes.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Get the number of classes.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Transform labels to encoded indices.
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, PreprocessingError> {
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.class_to_idx
                    .get(label)
                    .copied()
                    .ok_or_else(|| PreprocessingError::UnknownLabel(label.to_string()))
            })
            .collect()
    }

    /// Extract parameters for serialization.
    pub fn extract_params(&self) -> LabelEncoderParams {
        LabelEncoderParams {
            classes: self.classes.clone(),
        }
    }

    /// Reconstruct from parameters.
    ///
    /// Classes must be strictly increasing, as produced by [`LabelEncoder::fit`].
    pub fn from_params(params: LabelEncoderParams) -> Result<Self, PreprocessingError> {
        if params.classes.is_empty() {
            return Err(PreprocessingError::InvalidParameter(
                "label encoder has no classes".to_string(),
            ));
        }
        if params.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(PreprocessingError::InvalidParameter(
                "label encoder classes must be sorted and unique".to_string(),
            ));
        }
        Ok(Self::from_classes(params.classes))
    }
}
