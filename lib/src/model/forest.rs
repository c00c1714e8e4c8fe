//! Random forest classifier.
//!
//! Every tree is grown on its own bootstrap sample with its own RNG, seeded
//! from a master [`StdRng`] so that a seed reproduces the whole ensemble.
//! Prediction is a plurality vote over the trees' leaf majorities.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::MachineError;
use crate::model::criterion::SplitCriterion;
use crate::model::tree::{DecisionTree, TreeConfig};
use crate::model::{argmax, InferenceModel};

/// How many features a split evaluates before it may stop searching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    #[default]
    Sqrt,
    /// Every feature.
    All,
    /// A fixed count, capped at the number of features.
    Fixed(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete count for `n_features` columns.
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Ensemble hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub criterion: SplitCriterion,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            criterion: SplitCriterion::Gini,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 0,
        }
    }
}

impl ForestConfig {
    /// Reject settings that cannot grow a forest.
    pub fn validate(&self) -> Result<(), MachineError> {
        if self.n_estimators == 0 {
            return Err(MachineError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(MachineError::InvalidConfig(format!(
                "min_samples_split must be at least 2, got {}",
                self.min_samples_split
            )));
        }
        if self.min_samples_leaf == 0 {
            return Err(MachineError::InvalidConfig(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(MachineError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_features == MaxFeatures::Fixed(0) {
            return Err(MachineError::InvalidConfig(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn tree_config(&self, n_features: usize) -> TreeConfig {
        TreeConfig {
            criterion: self.criterion,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_depth: self.max_depth,
            max_features: self.max_features.resolve(n_features),
        }
    }
}

/// Unfitted random forest.
#[derive(Clone, Debug, Default)]
pub struct RandomForestClassifier {
    config: ForestConfig,
}

impl RandomForestClassifier {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Grow the ensemble on `x` against class indices `y`.
    ///
    /// `y` values must be below `n_classes`, and at least two classes are
    /// required.
    pub fn fit(
        &self,
        x: ArrayView2<'_, f64>,
        y: &[usize],
        n_classes: usize,
    ) -> Result<FittedRandomForest, MachineError> {
        self.config.validate()?;
        let (n_rows, n_features) = x.dim();
        if n_rows != y.len() {
            return Err(MachineError::Schema(format!(
                "{} feature rows but {} labels",
                n_rows,
                y.len()
            )));
        }
        if n_rows == 0 {
            return Err(MachineError::InsufficientData(
                "cannot fit a forest on zero rows".to_string(),
            ));
        }
        if n_features == 0 {
            return Err(MachineError::Schema(
                "cannot fit a forest without features".to_string(),
            ));
        }
        if n_classes < 2 {
            return Err(MachineError::InsufficientData(format!(
                "need at least 2 classes, got {}",
                n_classes
            )));
        }
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(MachineError::Schema(format!(
                "label index {} out of range for {} classes",
                bad, n_classes
            )));
        }

        let tree_config = self.config.tree_config(n_features);
        info!(
            rows = n_rows,
            features = n_features,
            classes = n_classes,
            trees = self.config.n_estimators,
            max_features = tree_config.max_features,
            "fitting random forest"
        );

        let mut master = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.n_estimators);
        for tree_idx in 0..self.config.n_estimators {
            let mut rng = StdRng::seed_from_u64(master.random::<u64>());
            let samples: Vec<usize> = if self.config.bootstrap {
                (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect()
            } else {
                (0..n_rows).collect()
            };
            let tree = DecisionTree::fit(x, y, samples, n_classes, &tree_config, &mut rng);
            debug!(
                tree = tree_idx,
                nodes = tree.n_nodes(),
                depth = tree.depth(),
                "grew tree"
            );
            trees.push(tree);
        }

        Ok(FittedRandomForest {
            config: self.config.clone(),
            trees,
            n_features,
            n_classes,
        })
    }
}

/// Per-class vote counts for one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassVotes {
    counts: Vec<usize>,
    total: usize,
}

impl ClassVotes {
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Class with the most votes; ties go to the lowest index.
    pub fn winner(&self) -> usize {
        argmax(&self.counts)
    }

    /// Vote fraction of the winning class.
    pub fn confidence(&self) -> f64 {
        self.counts[self.winner()] as f64 / self.total as f64
    }

    /// Vote fraction of every class, in class order.
    pub fn fractions(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|&c| c as f64 / self.total as f64)
            .collect()
    }
}

/// A trained ensemble.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedRandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

/// Serializable form of a [`FittedRandomForest`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub config: ForestConfig,
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl FittedRandomForest {
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Collect one vote per tree for a scaled feature row.
    ///
    /// The row must have [`n_features`](Self::n_features) values.
    pub fn votes(&self, row: &[f64]) -> ClassVotes {
        let mut counts = vec![0usize; self.n_classes];
        for tree in &self.trees {
            counts[tree.predict(row)] += 1;
        }
        ClassVotes {
            counts,
            total: self.trees.len(),
        }
    }
}

impl InferenceModel for FittedRandomForest {
    type InputSingle = [f64];
    type OutputSingle = ClassVotes;
    type ParamsRepr = ForestParams;

    fn predict(&self, input: &[f64]) -> ClassVotes {
        self.votes(input)
    }

    fn extract_params(&self) -> ForestParams {
        ForestParams {
            config: self.config.clone(),
            n_features: self.n_features,
            n_classes: self.n_classes,
            trees: self.trees.clone(),
        }
    }

    fn from_params(params: ForestParams) -> Result<Self, MachineError> {
        if params.trees.is_empty() {
            return Err(MachineError::CorruptArtifact(
                "forest has no trees".to_string(),
            ));
        }
        if params.n_classes < 2 {
            return Err(MachineError::CorruptArtifact(format!(
                "forest has {} classes",
                params.n_classes
            )));
        }
        let mut trees = Vec::with_capacity(params.trees.len());
        for (idx, tree) in params.trees.into_iter().enumerate() {
            if tree.n_features() != params.n_features || tree.n_classes() != params.n_classes {
                return Err(MachineError::CorruptArtifact(format!(
                    "tree {} shape ({} features, {} classes) does not match forest ({}, {})",
                    idx,
                    tree.n_features(),
                    tree.n_classes(),
                    params.n_features,
                    params.n_classes
                )));
            }
            let tree = DecisionTree::from_params(tree).map_err(|err| match err {
                MachineError::CorruptArtifact(msg) => {
                    MachineError::CorruptArtifact(format!("tree {}: {}", idx, msg))
                }
                other => other,
            })?;
            trees.push(tree);
        }
        Ok(Self {
            config: params.config,
            trees,
            n_features: params.n_features,
            n_classes: params.n_classes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn two_blobs(n: usize, seed: u64) -> (Array2<f64>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut x = Array2::zeros((n, 2));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let class = i % 2;
            let offset = if class == 0 { -3.0 } else { 3.0 };
            x[[i, 0]] = offset + rng.random_range(-1.0..1.0);
            x[[i, 1]] = rng.random_range(-5.0..5.0);
            y.push(class);
        }
        (x, y)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_estimators: 25,
            seed: 42,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(4), 2);
        assert_eq!(MaxFeatures::Sqrt.resolve(8), 2);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::All.resolve(4), 4);
        assert_eq!(MaxFeatures::Fixed(10).resolve(4), 4);
        assert_eq!(MaxFeatures::Fixed(3).resolve(4), 3);
    }

    #[test]
    fn test_default_config() {
        let config = ForestConfig::default();
        assert_eq!(config.n_estimators, 300);
        assert_eq!(config.criterion, SplitCriterion::Gini);
        assert_eq!(config.min_samples_split, 2);
        assert_eq!(config.min_samples_leaf, 1);
        assert!(config.bootstrap);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let bad = [
            ForestConfig {
                n_estimators: 0,
                ..ForestConfig::default()
            },
            ForestConfig {
                min_samples_split: 1,
                ..ForestConfig::default()
            },
            ForestConfig {
                min_samples_leaf: 0,
                ..ForestConfig::default()
            },
            ForestConfig {
                max_depth: Some(0),
                ..ForestConfig::default()
            },
            ForestConfig {
                max_features: MaxFeatures::Fixed(0),
                ..ForestConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(MachineError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_fit_separable_data() {
        let (x, y) = two_blobs(60, 1);
        let forest = RandomForestClassifier::new(small_config())
            .fit(x.view(), &y, 2)
            .unwrap();
        assert_eq!(forest.n_trees(), 25);

        let votes = forest.votes(&[-3.0, 0.0]);
        assert_eq!(votes.winner(), 0);
        assert!(votes.confidence() > 0.5);
        let votes = forest.votes(&[3.0, 0.0]);
        assert_eq!(votes.winner(), 1);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = two_blobs(40, 2);
        let a = RandomForestClassifier::new(small_config())
            .fit(x.view(), &y, 2)
            .unwrap();
        let b = RandomForestClassifier::new(small_config())
            .fit(x.view(), &y, 2)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_forest() {
        let (x, y) = two_blobs(40, 2);
        let a = RandomForestClassifier::new(small_config())
            .fit(x.view(), &y, 2)
            .unwrap();
        let b = RandomForestClassifier::new(ForestConfig {
            seed: 43,
            ..small_config()
        })
        .fit(x.view(), &y, 2)
        .unwrap();
        assert_ne!(a.trees(), b.trees());
    }

    #[test]
    fn test_votes_fractions_sum_to_one() {
        let (x, y) = two_blobs(30, 3);
        let forest = RandomForestClassifier::new(small_config())
            .fit(x.view(), &y, 2)
            .unwrap();
        for row in x.rows() {
            let votes = forest.votes(row.as_slice().unwrap());
            let sum: f64 = votes.fractions().iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&votes.confidence()));
            assert_eq!(votes.total(), 25);
        }
    }

    #[test]
    fn test_fit_rejects_single_class() {
        let (x, _) = two_blobs(10, 4);
        let y = vec![0; 10];
        let result = RandomForestClassifier::new(small_config()).fit(x.view(), &y, 1);
        assert!(matches!(result, Err(MachineError::InsufficientData(_))));
    }

    #[test]
    fn test_fit_rejects_label_length_mismatch() {
        let (x, _) = two_blobs(10, 4);
        let result = RandomForestClassifier::new(small_config()).fit(x.view(), &[0, 1], 2);
        assert!(matches!(result, Err(MachineError::Schema(_))));
    }

    #[test]
    fn test_fit_rejects_label_out_of_range() {
        let (x, mut y) = two_blobs(10, 4);
        y[3] = 5;
        let result = RandomForestClassifier::new(small_config()).fit(x.view(), &y, 2);
        assert!(matches!(result, Err(MachineError::Schema(_))));
    }

    #[test]
    fn test_without_bootstrap_trees_see_all_rows() {
        let (x, y) = two_blobs(20, 5);
        let config = ForestConfig {
            bootstrap: false,
            ..small_config()
        };
        let forest = RandomForestClassifier::new(config).fit(x.view(), &y, 2).unwrap();
        for tree in forest.trees() {
            assert_eq!(tree.nodes()[0].class_counts.iter().sum::<usize>(), 20);
        }
    }

    #[test]
    fn test_params_roundtrip() {
        let (x, y) = two_blobs(20, 6);
        let forest = RandomForestClassifier::new(small_config())
            .fit(x.view(), &y, 2)
            .unwrap();
        let restored = FittedRandomForest::from_params(forest.extract_params()).unwrap();
        assert_eq!(restored, forest);
    }

    #[test]
    fn test_from_params_rejects_empty_forest() {
        let params = ForestParams {
            config: small_config(),
            n_features: 2,
            n_classes: 2,
            trees: Vec::new(),
        };
        assert!(matches!(
            FittedRandomForest::from_params(params),
            Err(MachineError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_from_params_rejects_mismatched_tree_shape() {
        let (x, y) = two_blobs(20, 7);
        let forest = RandomForestClassifier::new(small_config())
            .fit(x.view(), &y, 2)
            .unwrap();
        let mut params = forest.extract_params();
        params.n_features = 3;
        assert!(matches!(
            FittedRandomForest::from_params(params),
            Err(MachineError::CorruptArtifact(_))
        ));
    }
}
