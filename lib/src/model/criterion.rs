//! Node impurity measures used to rank candidate splits.

use serde::{Deserialize, Serialize};

/// Impurity measure minimised by tree splits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitCriterion {
    /// Gini impurity: `1 - sum(p_k^2)`.
    #[default]
    Gini,
    /// Shannon entropy in bits: `-sum(p_k * log2(p_k))`.
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node holding `total` samples distributed as `counts`.
    ///
    /// An empty node has zero impurity.
    pub fn impurity(self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        match self {
            SplitCriterion::Gini => {
                let sum_sq: f64 = counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / total;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            SplitCriterion::Entropy => counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / total;
                    -p * p.log2()
                })
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gini_pure_node() {
        assert_eq!(SplitCriterion::Gini.impurity(&[4, 0], 4), 0.0);
    }

    #[test]
    fn test_gini_balanced_binary() {
        assert!((SplitCriterion::Gini.impurity(&[2, 2], 4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_balanced_binary() {
        assert!((SplitCriterion::Entropy.impurity(&[3, 3], 6) - 1.0).abs() < 1e-12);
        assert_eq!(SplitCriterion::Entropy.impurity(&[0, 5], 5), 0.0);
    }

    #[test]
    fn test_empty_node() {
        assert_eq!(SplitCriterion::Gini.impurity(&[0, 0], 0), 0.0);
    }

    #[test]
    fn test_criterion_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            criterion: SplitCriterion,
        }
        let parsed: Wrapper = toml::from_str("criterion = \"entropy\"").unwrap();
        assert_eq!(parsed.criterion, SplitCriterion::Entropy);
    }
}
