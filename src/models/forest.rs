//! Regression forest: the mean of independent decision trees.
//!
//! Trees are stored as flat node arrays rooted at index 0. A split node sends
//! a sample to `left` when `x[feature] <= threshold`, otherwise to `right`.

use serde::{Deserialize, Serialize};

use super::{Regressor, check_shape};
use crate::error::DashError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionTree {
    /// Walk from the root to a leaf.
    ///
    /// The walk is bounded by the node count so a malformed (cyclic) tree
    /// fails instead of looping.
    pub fn evaluate(&self, features: &[f64]) -> Result<f64, DashError> {
        let mut idx = 0usize;
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| {
                DashError::ModelInvocation(format!("tree references missing node {idx}"))
            })?;
            match *node {
                TreeNode::Leaf { value } => return Ok(value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features.get(feature).ok_or_else(|| {
                        DashError::ModelInvocation(format!(
                            "tree splits on feature {feature}, input has {}",
                            features.len()
                        ))
                    })?;
                    idx = if *x <= threshold { left } else { right };
                }
            }
        }
        Err(DashError::ModelInvocation(
            "tree walk did not reach a leaf".to_string(),
        ))
    }
}

impl Regressor for ForestModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, DashError> {
        check_shape(self.n_features, features)?;
        if self.trees.is_empty() {
            return Err(DashError::ModelInvocation("forest has no trees".to_string()));
        }

        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.evaluate(features)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, lo: f64, hi: f64) -> RegressionTree {
        RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: lo },
                TreeNode::Leaf { value: hi },
            ],
        }
    }

    #[test]
    fn forest_averages_tree_outputs() {
        let forest = ForestModel {
            n_features: 2,
            trees: vec![stump(0, 0.5, 10.0, 20.0), stump(1, 5.0, 30.0, 40.0)],
        };
        // x0 = 1 -> 20, x1 = 5 -> 30 (<= goes left)
        assert_eq!(forest.predict(&[1.0, 5.0]).unwrap(), 25.0);
        assert_eq!(forest.predict(&[0.0, 6.0]).unwrap(), 25.0);
        assert_eq!(forest.predict(&[0.0, 0.0]).unwrap(), 20.0);
    }

    #[test]
    fn malformed_trees_are_invocation_errors() {
        let bad_feature = ForestModel {
            n_features: 1,
            trees: vec![stump(3, 0.0, 1.0, 2.0)],
        };
        assert!(matches!(bad_feature.predict(&[0.0]), Err(DashError::ModelInvocation(_))));

        let cyclic = ForestModel {
            n_features: 1,
            trees: vec![RegressionTree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                }],
            }],
        };
        assert!(cyclic.predict(&[0.0]).is_err());

        let empty = ForestModel {
            n_features: 1,
            trees: Vec::new(),
        };
        assert!(empty.predict(&[0.0]).is_err());
    }

    #[test]
    fn nodes_deserialize_untagged() {
        let json = r#"{"nodes":[{"feature":0,"threshold":1.5,"left":1,"right":2},{"value":7.0},{"value":9.0}]}"#;
        let tree: RegressionTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.nodes[1], TreeNode::Leaf { value: 7.0 });
        assert_eq!(tree.evaluate(&[2.0]).unwrap(), 9.0);
    }
}
