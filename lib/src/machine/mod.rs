//! The trained prediction pipeline.
//!
//! A [`Machine`] bundles everything needed to turn a row of raw feature
//! values into a label: the feature column names in training order, the
//! fitted scaler, the label classes, and the forest. It never changes after
//! construction; retraining produces a new machine.

mod persist;

pub use persist::FAMILY_NAME;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::dataset::Table;
use crate::error::MachineError;
use crate::model::{ClassVotes, FittedRandomForest, ForestParams, InferenceModel};
use crate::preprocessing::{
    FittedLabelEncoder, FittedStandardScaler, FittedTransformer, LabelEncoderParams,
    StandardScalerParams,
};

/// A predicted label and the fraction of trees that voted for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Winning vote fraction in `[0, 1]`. A relative score, not a calibrated
    /// probability.
    pub confidence: f64,
}

/// Vote fraction for every class, in sorted class order.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDistribution {
    classes: Vec<String>,
    fractions: Vec<f64>,
}

impl ClassDistribution {
    fn from_votes(classes: &[String], votes: &ClassVotes) -> Self {
        Self {
            classes: classes.to_vec(),
            fractions: votes.fractions(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Fraction for one class, `None` if the class is unknown.
    pub fn get(&self, class: &str) -> Option<f64> {
        self.classes
            .iter()
            .position(|c| c == class)
            .map(|idx| self.fractions[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.classes
            .iter()
            .map(String::as_str)
            .zip(self.fractions.iter().copied())
    }

    /// Highest fraction; ties go to the class that sorts first.
    pub fn best(&self) -> Prediction {
        let mut best = 0;
        for (idx, &fraction) in self.fractions.iter().enumerate() {
            if fraction > self.fractions[best] {
                best = idx;
            }
        }
        Prediction {
            label: self.classes[best].clone(),
            confidence: self.fractions[best],
        }
    }
}

/// Serializable state of a [`Machine`]; the artifact payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineParams {
    pub feature_names: Vec<String>,
    pub label_name: String,
    pub scaler: StandardScalerParams,
    pub encoder: LabelEncoderParams,
    pub forest: ForestParams,
}

/// A fitted scaler + random forest pipeline.
#[derive(Clone, Debug)]
pub struct Machine {
    feature_names: Vec<String>,
    label_name: String,
    scaler: FittedStandardScaler,
    encoder: FittedLabelEncoder,
    forest: FittedRandomForest,
}

impl Machine {
    pub(crate) fn from_parts(
        feature_names: Vec<String>,
        label_name: String,
        scaler: FittedStandardScaler,
        encoder: FittedLabelEncoder,
        forest: FittedRandomForest,
    ) -> Self {
        Self {
            feature_names,
            label_name,
            scaler,
            encoder,
            forest,
        }
    }

    /// Feature columns in the order prediction input must use.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn label_name(&self) -> &str {
        &self.label_name
    }

    /// Label classes in sorted order.
    pub fn classes(&self) -> &[String] {
        self.encoder.classes()
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.scaler
    }

    pub fn forest(&self) -> &FittedRandomForest {
        &self.forest
    }

    /// Predict the label of a single-row table.
    ///
    /// # Errors
    /// [`MachineError::Schema`] unless `row` has exactly one row and exactly
    /// the training feature columns, in training order, all numeric.
    pub fn predict(&self, row: &Table) -> Result<Prediction, MachineError> {
        Ok(self.predict_proba(row)?.best())
    }

    /// Per-class vote fractions for a single-row table.
    pub fn predict_proba(&self, row: &Table) -> Result<ClassDistribution, MachineError> {
        if row.n_rows() != 1 {
            return Err(MachineError::Schema(format!(
                "expected a single row, got {}",
                row.n_rows()
            )));
        }
        let scaled = self.scaled_features(row)?;
        let features = scaled.row(0).to_vec();
        let votes = self.forest.votes(&features);
        Ok(ClassDistribution::from_votes(self.classes(), &votes))
    }

    /// Predict every row of `table`, in row order.
    pub fn predict_batch(&self, table: &Table) -> Result<Vec<Prediction>, MachineError> {
        let scaled = self.scaled_features(table)?;
        Ok(scaled
            .rows()
            .into_iter()
            .map(|features| {
                let votes = self.forest.votes(&features.to_vec());
                ClassDistribution::from_votes(self.classes(), &votes).best()
            })
            .collect())
    }

    fn scaled_features(&self, table: &Table) -> Result<Array2<f64>, MachineError> {
        if table.column_names() != self.feature_names.as_slice() {
            return Err(MachineError::Schema(format!(
                "expected columns [{}], got [{}]",
                self.feature_names.join(", "),
                table.column_names().join(", ")
            )));
        }
        let x = table.feature_matrix(&self.feature_names)?;
        Ok(self.scaler.transform(&x)?)
    }
}

impl InferenceModel for Machine {
    type InputSingle = Table;
    type OutputSingle = Result<Prediction, MachineError>;
    type ParamsRepr = MachineParams;

    fn predict(&self, input: &Table) -> Result<Prediction, MachineError> {
        Machine::predict(self, input)
    }

    fn extract_params(&self) -> MachineParams {
        MachineParams {
            feature_names: self.feature_names.clone(),
            label_name: self.label_name.clone(),
            scaler: self.scaler.extract_params(),
            encoder: self.encoder.extract_params(),
            forest: self.forest.extract_params(),
        }
    }

    /// Rebuild a machine, checking that every part agrees on its shape.
    fn from_params(params: MachineParams) -> Result<Self, MachineError> {
        let corrupt = |part: &str, err: &dyn std::fmt::Display| {
            MachineError::CorruptArtifact(format!("{}: {}", part, err))
        };
        let n_features = params.feature_names.len();
        if n_features == 0 {
            return Err(MachineError::CorruptArtifact(
                "no feature columns".to_string(),
            ));
        }

        let scaler = FittedStandardScaler::from_params(params.scaler)
            .map_err(|e| corrupt("scaler", &e))?;
        if scaler.n_features_in() != n_features {
            return Err(MachineError::CorruptArtifact(format!(
                "scaler has {} features, expected {}",
                scaler.n_features_in(),
                n_features
            )));
        }

        let encoder = FittedLabelEncoder::from_params(params.encoder)
            .map_err(|e| corrupt("label encoder", &e))?;
        if encoder.n_classes() < 2 {
            return Err(MachineError::CorruptArtifact(format!(
                "{} label class(es), expected at least 2",
                encoder.n_classes()
            )));
        }

        let forest = FittedRandomForest::from_params(params.forest)?;
        if forest.n_features() != n_features || forest.n_classes() != encoder.n_classes() {
            return Err(MachineError::CorruptArtifact(format!(
                "forest shape ({} features, {} classes) does not match machine ({}, {})",
                forest.n_features(),
                forest.n_classes(),
                n_features,
                encoder.n_classes()
            )));
        }

        Ok(Self::from_parts(
            params.feature_names,
            params.label_name,
            scaler,
            encoder,
            forest,
        ))
    }
}
