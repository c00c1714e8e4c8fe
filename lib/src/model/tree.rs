//! CART decision tree classifier.
//!
//! Trees are grown depth-first on a sample index list (a bootstrap draw when
//! used inside a forest) and stored as a flat node arena in pre-order, so a
//! child index is always greater than its parent's.
//!
//! At every split node the features are visited in a fresh random order.
//! At least `max_features` of them are evaluated; the search only goes past
//! that number while no valid split has been found. Thresholds are midpoints
//! between consecutive distinct values and samples with
//! `x[feature] <= threshold` go left.

use ndarray::ArrayView2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MachineError;
use crate::model::criterion::SplitCriterion;
use crate::model::{argmax, InferenceModel};

/// Position of a node in [`DecisionTree::nodes`].
pub type NodeIndex = usize;

/// Growth constraints for a single tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub criterion: SplitCriterion,
    /// Nodes with fewer samples become leaves.
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split.
    pub min_samples_leaf: usize,
    /// Depth limit; the root has depth 0.
    pub max_depth: Option<usize>,
    /// Number of features evaluated per split before the search may stop.
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_depth: None,
            max_features: usize::MAX,
        }
    }
}

/// Whether a node is terminal or routes samples to its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf,
    Split {
        feature: usize,
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
    },
}

/// A tree node with the class distribution of the samples that reached it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Training samples per class at this node.
    pub class_counts: Vec<usize>,
}

impl Node {
    /// Majority class at this node.
    pub fn majority_class(&self) -> usize {
        argmax(&self.class_counts)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }
}

/// A fitted classification tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct TreeGrower<'a, 'x, R> {
    x: ArrayView2<'x, f64>,
    y: &'a [usize],
    n_classes: usize,
    config: &'a TreeConfig,
    rng: &'a mut R,
    features: Vec<usize>,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows of `x` listed in `samples`.
    ///
    /// `samples` may contain repeated indices. Labels in `y` must be class
    /// indices below `n_classes` and `samples` must not be empty; both are
    /// checked by the forest before any tree is grown.
    pub fn fit<R: Rng>(
        x: ArrayView2<'_, f64>,
        y: &[usize],
        samples: Vec<usize>,
        n_classes: usize,
        config: &TreeConfig,
        rng: &mut R,
    ) -> Self {
        let n_features = x.ncols();
        let mut grower = TreeGrower {
            x,
            y,
            n_classes,
            config,
            rng,
            features: (0..n_features).collect(),
            nodes: Vec::new(),
        };
        grower.grow(samples, 0);
        Self {
            nodes: grower.nodes,
            n_features,
            n_classes,
        }
    }

    /// Node arena in pre-order; index 0 is the root.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if let NodeKind::Split { left, right, .. } = node.kind {
                let child_depth = depths[idx] + 1;
                depths[left] = child_depth;
                depths[right] = child_depth;
                max_depth = max_depth.max(child_depth);
            }
        }
        max_depth
    }

    /// The leaf a feature row lands in.
    pub fn leaf(&self, row: &[f64]) -> &Node {
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            match node.kind {
                NodeKind::Leaf => return node,
                NodeKind::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    /// Check the invariants `leaf` relies on.
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.class_counts.len() != self.n_classes {
                return Err(format!(
                    "node {} has {} class counts, expected {}",
                    idx,
                    node.class_counts.len(),
                    self.n_classes
                ));
            }
            if let NodeKind::Split {
                feature,
                left,
                right,
                ..
            } = node.kind
            {
                if feature >= self.n_features {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        idx, feature, self.n_features
                    ));
                }
                // Forward-only children rule out cycles.
                for child in [left, right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child {}", idx, child));
                    }
                }
            }
        }
        Ok(())
    }
}

impl InferenceModel for DecisionTree {
    type InputSingle = [f64];
    type OutputSingle = usize;
    type ParamsRepr = DecisionTree;

    /// Class index predicted for one feature row.
    fn predict(&self, input: &[f64]) -> usize {
        self.leaf(input).majority_class()
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        self.clone()
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self, MachineError> {
        params.validate().map_err(MachineError::CorruptArtifact)?;
        Ok(params)
    }
}

impl<R: Rng> TreeGrower<'_, '_, R> {
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> NodeIndex {
        let counts = self.class_counts(&samples);
        let idx = self.nodes.len();
        self.nodes.push(Node {
            kind: NodeKind::Leaf,
            class_counts: counts.clone(),
        });

        let n = samples.len();
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || is_pure
            || depth_reached
        {
            return idx;
        }

        let Some(split) = self.best_split(&samples, &counts) else {
            return idx;
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&s| self.x[[s, split.feature]] <= split.threshold);

        let left = self.grow(left_samples, depth + 1);
        let right = self.grow(right_samples, depth + 1);
        self.nodes[idx].kind = NodeKind::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &s in samples {
            counts[self.y[s]] += 1;
        }
        counts
    }

    fn best_split(&mut self, samples: &[usize], parent_counts: &[usize]) -> Option<BestSplit> {
        let mut features = std::mem::take(&mut self.features);
        features.shuffle(&mut *self.rng);

        let mut best: Option<BestSplit> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(feature, samples, parent_counts) {
                let better = match &best {
                    Some(current) => candidate.impurity < current.impurity,
                    None => true,
                };
                if better {
                    best = Some(candidate);
                }
            }
        }

        self.features = features;
        best
    }

    fn best_split_on(
        &self,
        feature: usize,
        samples: &[usize],
        parent_counts: &[usize],
    ) -> Option<BestSplit> {
        let mut sorted: Vec<(f64, usize)> = samples
            .iter()
            .map(|&s| (self.x[[s, feature]], self.y[s]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = sorted.len();
        let min_leaf = self.config.min_samples_leaf;
        let criterion = self.config.criterion;
        let mut left = vec![0usize; self.n_classes];
        let mut right = parent_counts.to_vec();
        let mut best: Option<BestSplit> = None;

        for i in 0..n - 1 {
            let (value, class) = sorted[i];
            left[class] += 1;
            right[class] -= 1;

            let next = sorted[i + 1].0;
            if next <= value {
                continue;
            }
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let impurity = (n_left as f64 * criterion.impurity(&left, n_left)
                + n_right as f64 * criterion.impurity(&right, n_right))
                / n as f64;
            let better = match &best {
                Some(current) => impurity < current.impurity,
                None => true,
            };
            if better {
                let mut threshold = value / 2.0 + next / 2.0;
                if threshold >= next || !threshold.is_finite() {
                    threshold = value;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fit_all(x: &Array2<f64>, y: &[usize], n_classes: usize, config: &TreeConfig) -> DecisionTree {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = (0..y.len()).collect();
        DecisionTree::fit(x.view(), y, samples, n_classes, config, &mut rng)
    }

    #[test]
    fn test_single_threshold_split() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = [0, 0, 0, 1, 1, 1];
        let tree = fit_all(&x, &y, 2, &TreeConfig::default());

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.depth(), 1);
        match tree.nodes()[0].kind {
            NodeKind::Split {
                feature, threshold, ..
            } => {
                assert_eq!(feature, 0);
                assert_eq!(threshold, 6.5);
            }
            NodeKind::Leaf => panic!("root should split"),
        }
        assert_eq!(tree.predict(&[2.5]), 0);
        assert_eq!(tree.predict(&[6.5]), 0);
        assert_eq!(tree.predict(&[6.6]), 1);
    }

    #[test]
    fn test_fully_grown_tree_fits_training_data() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = [0, 1, 1, 0];
        let tree = fit_all(&x, &y, 2, &TreeConfig::default());

        for (i, &label) in y.iter().enumerate() {
            let row = x.row(i).to_vec();
            assert_eq!(tree.predict(&row), label);
        }
        assert!(tree.nodes().iter().filter(|n| n.is_leaf()).all(|n| {
            n.class_counts.iter().filter(|&&c| c > 0).count() == 1
        }));
    }

    /// Grows a tree from a view that outlives the short-lived config and rng.
    fn fit_view(x: ArrayView2<'_, f64>, y: &[usize]) -> DecisionTree {
        let config = TreeConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        DecisionTree::fit(x, y, (0..y.len()).collect(), 2, &config, &mut rng)
    }

    #[test]
    fn test_fit_borrows_view_independently_of_config_and_rng() {
        let x = array![[1.0, 4.0], [2.0, 3.0], [8.0, 2.0], [9.0, 1.0]];
        let view = x.view();
        let first = fit_view(view, &[0, 0, 1, 1]);
        let second = {
            let labels = vec![0, 0, 1, 1];
            fit_view(view, &labels)
        };

        assert_eq!(first, second);
        assert_eq!(first.predict(&[1.5, 3.5]), 0);
        assert_eq!(first.predict(&[8.5, 1.5]), 1);
        assert_eq!(view.nrows(), 4);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let x = array![[1.0], [2.0]];
        let tree = fit_all(&x, &[1, 1], 2, &TreeConfig::default());
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.nodes()[0].class_counts, vec![0, 2]);
    }

    #[test]
    fn test_constant_feature_cannot_split() {
        let x = array![[5.0], [5.0], [5.0]];
        let tree = fit_all(&x, &[0, 1, 0], 2, &TreeConfig::default());
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict(&[5.0]), 0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let config = TreeConfig {
            max_depth: Some(1),
            ..TreeConfig::default()
        };
        let tree = fit_all(&x, &[0, 1, 1, 0], 2, &config);
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let config = TreeConfig {
            min_samples_leaf: 2,
            ..TreeConfig::default()
        };
        let tree = fit_all(&x, &[0, 1, 1, 1, 1], 2, &config);
        for node in tree.nodes().iter().filter(|n| n.is_leaf()) {
            assert!(node.class_counts.iter().sum::<usize>() >= 2);
        }
    }

    #[test]
    fn test_min_samples_split_respected() {
        let x = array![[1.0], [2.0], [3.0]];
        let config = TreeConfig {
            min_samples_split: 4,
            ..TreeConfig::default()
        };
        let tree = fit_all(&x, &[0, 1, 0], 2, &config);
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn test_repeated_samples_are_counted() {
        let x = array![[1.0], [9.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(
            x.view(),
            &[0, 1],
            vec![0, 0, 1],
            2,
            &TreeConfig::default(),
            &mut rng,
        );
        assert_eq!(tree.nodes()[0].class_counts, vec![2, 1]);
    }

    #[test]
    fn test_search_continues_until_a_split_is_found() {
        // Feature 0 is constant; with max_features = 1 the grower must still
        // fall through to feature 1.
        let x = array![[3.0, 1.0], [3.0, 2.0], [3.0, 8.0], [3.0, 9.0]];
        let config = TreeConfig {
            max_features: 1,
            ..TreeConfig::default()
        };
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let tree = DecisionTree::fit(
                x.view(),
                &[0, 0, 1, 1],
                (0..4).collect(),
                2,
                &config,
                &mut rng,
            );
            assert_eq!(tree.n_nodes(), 3, "seed {}", seed);
        }
    }

    #[test]
    fn test_params_roundtrip_and_validation() {
        let x = array![[1.0], [2.0], [10.0]];
        let tree = fit_all(&x, &[0, 0, 1], 2, &TreeConfig::default());
        let restored = DecisionTree::from_params(tree.extract_params()).unwrap();
        assert_eq!(restored, tree);

        let mut broken = tree.extract_params();
        if let NodeKind::Split { ref mut left, .. } = broken.nodes[0].kind {
            *left = 0;
        }
        assert!(matches!(
            DecisionTree::from_params(broken),
            Err(MachineError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn test_validation_rejects_out_of_range_feature() {
        let x = array![[1.0], [10.0]];
        let mut tree = fit_all(&x, &[0, 1], 2, &TreeConfig::default());
        if let NodeKind::Split {
            ref mut feature, ..
        } = tree.nodes[0].kind
        {
            *feature = 3;
        }
        assert!(DecisionTree::from_params(tree).is_err());
    }
}
