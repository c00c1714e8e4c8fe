//! Training entry point.
//!
//! A [`Trainer`] turns a [`Table`] into a [`Machine`]: it pulls the feature
//! matrix and label vector out by column name, fits a standard scaler, then
//! grows a random forest on the scaled features. Settings come either from
//! the fluent [`TrainerBuilder`] or from a TOML document via
//! [`TrainerConfig`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::dataset::{Table, TableSource};
use crate::error::MachineError;
use crate::machine::Machine;
use crate::model::{ForestConfig, MaxFeatures, RandomForestClassifier, SplitCriterion};
use crate::preprocessing::{FittedTransformer, LabelEncoder, StandardScaler, Transformer};

/// Feature columns used when none are configured.
pub const DEFAULT_FEATURES: [&str; 4] = ["Level", "Health", "Energy", "Sanity"];
/// Label column used when none is configured.
pub const DEFAULT_LABEL: &str = "Rarity";

/// Everything a [`Trainer`] needs to know.
///
/// Missing keys take their defaults when deserialized:
///
/// ```
/// use forest_machine::trainer::TrainerConfig;
///
/// let config = TrainerConfig::from_toml_str(
///     r#"
///     features = ["Level", "Health"]
///
///     [forest]
///     n_estimators = 50
///     seed = 7
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.label, "Rarity");
/// assert_eq!(config.forest.n_estimators, 50);
/// assert_eq!(config.forest.min_samples_leaf, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Numeric feature columns, in the order the model sees them.
    pub features: Vec<String>,
    /// Categorical label column.
    pub label: String,
    pub forest: ForestConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            features: DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect(),
            label: DEFAULT_LABEL.to_string(),
            forest: ForestConfig::default(),
        }
    }
}

impl TrainerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, MachineError> {
        toml::from_str(source).map_err(|e| MachineError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MachineError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| MachineError::io(path, e))?;
        Self::from_toml_str(&source)
    }

    /// Check the settings without touching any data.
    pub fn validate(&self) -> Result<(), MachineError> {
        if self.features.is_empty() {
            return Err(MachineError::InvalidConfig(
                "at least one feature column is required".to_string(),
            ));
        }
        for (idx, name) in self.features.iter().enumerate() {
            if self.features[..idx].contains(name) {
                return Err(MachineError::InvalidConfig(format!(
                    "feature column '{}' listed twice",
                    name
                )));
            }
        }
        if self.features.contains(&self.label) {
            return Err(MachineError::InvalidConfig(format!(
                "label column '{}' is also listed as a feature",
                self.label
            )));
        }
        self.forest.validate()
    }
}

/// Fits [`Machine`]s from tables.
///
/// Immutable once built; the same trainer can fit any number of tables.
#[derive(Clone, Debug, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

/// Fluent builder for a [`Trainer`].
///
/// Defaults:
/// - features: `Level`, `Health`, `Energy`, `Sanity`
/// - label: `Rarity`
/// - `n_estimators`: 300, Gini, `min_samples_split` 2, `min_samples_leaf` 1
/// - `max_features`: `Sqrt`, bootstrap on, seed 0
#[derive(Clone, Debug, Default)]
pub struct TrainerBuilder {
    config: TrainerConfig,
}

impl TrainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feature column list.
    pub fn features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.features = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn label(mut self, name: impl Into<String>) -> Self {
        self.config.label = name.into();
        self
    }

    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.forest.n_estimators = n;
        self
    }

    pub fn criterion(mut self, criterion: SplitCriterion) -> Self {
        self.config.forest.criterion = criterion;
        self
    }

    pub fn min_samples_split(mut self, n: usize) -> Self {
        self.config.forest.min_samples_split = n;
        self
    }

    pub fn min_samples_leaf(mut self, n: usize) -> Self {
        self.config.forest.min_samples_leaf = n;
        self
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.config.forest.max_depth = depth;
        self
    }

    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.config.forest.max_features = max_features;
        self
    }

    /// Grow each tree on a bootstrap sample (on by default).
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.config.forest.bootstrap = bootstrap;
        self
    }

    /// Seed for bootstrap draws and feature order.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.forest.seed = seed;
        self
    }

    /// Validate the settings and build the trainer.
    ///
    /// # Errors
    /// [`MachineError::InvalidConfig`] for settings that cannot train a model.
    pub fn build(self) -> Result<Trainer, MachineError> {
        Trainer::from_config(self.config)
    }
}

impl Trainer {
    /// Trainer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the builder pattern.
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::new()
    }

    pub fn from_config(config: TrainerConfig) -> Result<Self, MachineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Fit a machine on every row of `table`.
    ///
    /// # Errors
    /// - [`MachineError::Schema`] if a configured column is missing or a
    ///   feature column is not numeric
    /// - [`MachineError::InsufficientData`] if the label column holds fewer
    ///   than two distinct values (an empty table included)
    pub fn fit(&self, table: &Table) -> Result<Machine, MachineError> {
        let config = &self.config;
        let x = table.feature_matrix(&config.features)?;
        let labels = table.labels(&config.label)?;

        if table.n_rows() == 0 {
            return Err(MachineError::InsufficientData(
                "training table has no rows".to_string(),
            ));
        }
        let (encoder, y) = LabelEncoder::new().fit_transform(&labels)?;
        if encoder.n_classes() < 2 {
            return Err(MachineError::InsufficientData(format!(
                "label column '{}' has a single class '{}'",
                config.label,
                encoder.classes()[0]
            )));
        }

        let scaler = StandardScaler::new().fit(&x)?;
        let scaled = scaler.transform(&x)?;
        let forest = RandomForestClassifier::new(config.forest.clone()).fit(
            scaled.view(),
            &y,
            encoder.n_classes(),
        )?;

        info!(
            rows = table.n_rows(),
            classes = encoder.n_classes(),
            trees = forest.n_trees(),
            "trained machine"
        );

        Ok(Machine::from_parts(
            config.features.clone(),
            config.label.clone(),
            scaler,
            encoder,
            forest,
        ))
    }

    /// Fetch a table from `source` and fit on it.
    pub fn fit_source<S>(&self, source: &S) -> Result<Machine, MachineError>
    where
        S: TableSource + ?Sized,
    {
        let table = source.fetch()?;
        self.fit(&table)
    }
}
