//! Error types for preprocessing operations.

use thiserror::Error;

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Feature dimension mismatch.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// A label that was not seen during fit.
    #[error("Unknown label '{0}'")]
    UnknownLabel(String),
    /// Restored parameters are inconsistent.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_empty_data() {
        let err = PreprocessingError::EmptyData("no rows".to_string());
        assert!(err.to_string().contains("Empty data"));
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = PreprocessingError::FeatureMismatch {
            expected_features: 5,
            got_features: 3,
        };
        assert_eq!(
            err.to_string(),
            "Feature mismatch: expected 5 features, got 3"
        );
    }

    #[test]
    fn test_error_display_unknown_label() {
        let err = PreprocessingError::UnknownLabel("Mythic".to_string());
        assert!(err.to_string().contains("Mythic"));
    }
}
