//! Data preprocessing transformers.
//!
//! Transformers come in unfitted/fitted pairs: the unfitted value carries
//! hyperparameters, `fit` learns statistics and returns the fitted value,
//! which is immutable and serializable through its `Params` struct.
//!
//! # Core Traits
//!
//! - [`Transformer`]: Unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: Fitted transformer ready for inference
//!
//! # Available Transformers
//!
//! - [`StandardScaler`]: Z-score normalization of feature matrices
//! - [`LabelEncoder`]: String labels to class indices

pub mod encoding;
pub mod error;
pub mod scaling;
pub mod traits;

pub use encoding::{FittedLabelEncoder, LabelEncoder, LabelEncoderParams};
pub use error::PreprocessingError;
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
pub use traits::{FittedTransformer, Transformer};
