//! Target label encoding.
//!
//! Classifiers work on class indices; [`LabelEncoder`] maps string labels to
//! indices `0..n_classes` and back. Classes are kept in lexicographic order so
//! the index of a class does not depend on row order.

mod label;

pub use label::{FittedLabelEncoder, LabelEncoder, LabelEncoderParams};
