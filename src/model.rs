//! Gradient-boosted tree ensemble for binary churn classification

use crate::artifacts::{read_json, ChurnClassifier};
use crate::error::{InferenceError, LoadError};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A node of a regression tree stored as a flat array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Routes `x[split] < threshold` to `yes`, otherwise to `no`; NaN goes to `missing`
    Split {
        split: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        #[serde(default)]
        missing: Option<usize>,
        #[serde(default)]
        gain: f64,
    },
    Leaf {
        leaf: f64,
    },
}

/// One boosting round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, tree_idx: usize, num_features: usize) -> Result<(), LoadError> {
        let n_nodes = self.nodes.len();
        if n_nodes == 0 {
            return Err(LoadError::Inconsistent(format!("tree {} has no nodes", tree_idx)));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { leaf } if !leaf.is_finite() => {
                    return Err(LoadError::Inconsistent(format!(
                        "tree {} node {} has a non-finite leaf value",
                        tree_idx, idx
                    )));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    split,
                    threshold,
                    yes,
                    no,
                    missing,
                    ..
                } => {
                    if *split >= num_features {
                        return Err(LoadError::Inconsistent(format!(
                            "tree {} node {} splits on feature {} but the model has {} features",
                            tree_idx, idx, split, num_features
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(LoadError::Inconsistent(format!(
                            "tree {} node {} has a NaN threshold",
                            tree_idx, idx
                        )));
                    }
                    // Children must come strictly after their parent so evaluation terminates
                    for child in [Some(*yes), Some(*no), *missing].into_iter().flatten() {
                        if child <= idx || child >= n_nodes {
                            return Err(LoadError::Inconsistent(format!(
                                "tree {} node {} has invalid child index {}",
                                tree_idx, idx, child
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn leaf_value(&self, x: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split {
                    split,
                    threshold,
                    yes,
                    no,
                    missing,
                    ..
                } => {
                    let value = x[*split];
                    idx = if value.is_nan() {
                        missing.unwrap_or(*yes)
                    } else if value < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

/// On-disk layout of an exported ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedModel {
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    pub num_features: usize,
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

fn default_base_score() -> f64 {
    0.5
}

/// Boosted ensemble with a logistic link
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    num_features: usize,
    base_margin: f64,
    trees: Vec<Tree>,
    importances: Vec<f64>,
}

impl GradientBoostedTrees {
    /// Build and validate an ensemble from its exported form
    pub fn from_export(export: ExportedModel) -> Result<Self, LoadError> {
        let ExportedModel {
            base_score,
            num_features,
            trees,
            feature_importances,
        } = export;

        if num_features == 0 {
            return Err(LoadError::Inconsistent("model has zero features".to_string()));
        }
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(LoadError::Inconsistent(format!(
                "base_score {} must lie strictly between 0 and 1",
                base_score
            )));
        }
        for (idx, tree) in trees.iter().enumerate() {
            tree.validate(idx, num_features)?;
        }

        let importances = match feature_importances {
            Some(values) => {
                if values.len() != num_features {
                    return Err(LoadError::Inconsistent(format!(
                        "{} feature importances for {} features",
                        values.len(),
                        num_features
                    )));
                }
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(LoadError::Inconsistent(
                        "feature importances must be finite".to_string(),
                    ));
                }
                values
            }
            None => gain_importances(&trees, num_features),
        };

        Ok(Self {
            num_features,
            base_margin: (base_score / (1.0 - base_score)).ln(),
            trees,
            importances,
        })
    }

    /// Load an exported ensemble from JSON
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let export: ExportedModel = read_json(path)?;
        let model = Self::from_export(export)?;
        tracing::debug!(
            path = %path.display(),
            trees = model.n_trees(),
            features = model.num_features,
            "classifier loaded"
        );
        Ok(model)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw log-odds for one feature vector
    fn margin(&self, x: ArrayView1<f64>) -> f64 {
        self.base_margin + self.trees.iter().map(|tree| tree.leaf_value(x)).sum::<f64>()
    }
}

impl ChurnClassifier for GradientBoostedTrees {
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        if features.ncols() != self.num_features {
            return Err(InferenceError::FeatureShape {
                expected: self.num_features,
                actual: features.ncols(),
            });
        }

        let positive: Vec<f64> = features
            .outer_iter()
            .map(|row| sigmoid(self.margin(row)))
            .collect();

        Ok(Array2::from_shape_fn((positive.len(), 2), |(i, class)| {
            if class == 1 {
                positive[i]
            } else {
                1.0 - positive[i]
            }
        }))
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Average split gain per feature, normalized to sum to one
///
/// Features that are never split on score zero.
fn gain_importances(trees: &[Tree], num_features: usize) -> Vec<f64> {
    let mut totals = vec![0.0; num_features];
    let mut splits = vec![0usize; num_features];
    for node in trees.iter().flat_map(|tree| tree.nodes.iter()) {
        if let TreeNode::Split { split, gain, .. } = node {
            totals[*split] += gain.max(0.0);
            splits[*split] += 1;
        }
    }

    let mut averages: Vec<f64> = totals
        .iter()
        .zip(&splits)
        .map(|(total, &count)| if count > 0 { total / count as f64 } else { 0.0 })
        .collect();

    let sum: f64 = averages.iter().sum();
    if sum > 0.0 {
        averages.iter_mut().for_each(|v| *v /= sum);
    }
    averages
}
