//! JSON random-forest artifact.
//!
//! The classifier is trained offline and exported as:
//!
//! ```json
//! {
//!   "classes": ["flu", "migraine"],
//!   "feature_count": 3,
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
//!         { "value": [3.0, 1.0] },
//!         { "value": [0.0, 4.0] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! A split sends a sample left when `x[feature] <= threshold`. Leaf values
//! are class counts or weights; they are normalized once at load time so a
//! leaf can be handed out as a probability distribution without copying.

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::ensemble::{aggregate, Ensemble, Estimator, LabelDecoder};
use crate::types::{SymptomError, SymptomResult};
use symptom_types::FeatureVector;

/// One node of a decision tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal split node.
    Split {
        /// Feature index tested.
        feature: usize,
        /// Go left when the feature is `<=` this value.
        threshold: f64,
        /// Index of the left child.
        left: usize,
        /// Index of the right child.
        right: usize,
    },
    /// Leaf holding a per-class distribution.
    Leaf {
        /// Per-class weights, normalized to probabilities at load time.
        value: Vec<f64>,
    },
}

/// A single decision tree; node 0 is the root.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Creates a tree from its nodes.
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn validate(&mut self, tree: usize, class_count: usize, feature_count: Option<usize>) -> SymptomResult<()> {
        if self.nodes.is_empty() {
            return Err(SymptomError::malformed(format!("tree {} has no nodes", tree)));
        }

        let node_count = self.nodes.len();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            match node {
                TreeNode::Split { feature, left, right, threshold } => {
                    if *left >= node_count || *right >= node_count {
                        return Err(SymptomError::malformed(format!(
                            "tree {} node {} points outside the tree",
                            tree, i
                        )));
                    }
                    if feature_count.is_some_and(|n| *feature >= n) {
                        return Err(SymptomError::malformed(format!(
                            "tree {} node {} tests feature {} outside the vector",
                            tree, i, feature
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(SymptomError::malformed(format!(
                            "tree {} node {} has a NaN threshold",
                            tree, i
                        )));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != class_count {
                        return Err(SymptomError::malformed(format!(
                            "tree {} leaf {} has {} values for {} classes",
                            tree,
                            i,
                            value.len(),
                            class_count
                        )));
                    }
                    let total: f64 = value.iter().sum();
                    if !total.is_finite()
                        || total <= 0.0
                        || value.iter().any(|v| !v.is_finite() || *v < 0.0)
                    {
                        return Err(SymptomError::malformed(format!(
                            "tree {} leaf {} has no usable weights",
                            tree, i
                        )));
                    }
                    value.iter_mut().for_each(|v| *v /= total);
                }
            }
        }

        Ok(())
    }
}

impl Estimator for DecisionTree {
    fn predict_proba(&self, features: &[f64]) -> SymptomResult<Cow<'_, [f64]>> {
        let mut current = 0;
        // A path longer than the tree means the nodes form a cycle.
        for _ in 0..self.nodes.len() {
            match &self.nodes[current] {
                TreeNode::Leaf { value } => return Ok(Cow::Borrowed(value)),
                TreeNode::Split { feature, threshold, left, right } => {
                    let x = features.get(*feature).ok_or_else(|| {
                        SymptomError::malformed(format!(
                            "split on feature {} but vector has {} slots",
                            feature,
                            features.len()
                        ))
                    })?;
                    current = if *x <= *threshold { *left } else { *right };
                }
            }
        }
        Err(SymptomError::malformed("decision path does not reach a leaf"))
    }
}

/// A random forest with its label encoder.
#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    classes: Vec<String>,
    #[serde(default)]
    feature_count: Option<usize>,
    trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Creates and validates a model.
    pub fn new(classes: Vec<String>, feature_count: Option<usize>, trees: Vec<DecisionTree>) -> SymptomResult<Self> {
        let mut model = Self {
            classes,
            feature_count,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    /// Loads and validates a model from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> SymptomResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SymptomError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let reader = BufReader::new(File::open(path)?);
        let mut model: Self = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    /// Parses and validates a model from JSON text.
    pub fn from_json_str(json: &str) -> SymptomResult<Self> {
        let mut model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&mut self) -> SymptomResult<()> {
        if self.classes.is_empty() {
            return Err(SymptomError::malformed("model has no classes"));
        }
        if self.trees.is_empty() {
            return Err(SymptomError::malformed("model has no trees"));
        }
        let class_count = self.classes.len();
        let feature_count = self.feature_count;
        for (i, tree) in self.trees.iter_mut().enumerate() {
            tree.validate(i, class_count, feature_count)?;
        }
        Ok(())
    }

    /// Returns the class labels in class-index order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns the number of trees.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Most probable class index (lowest index on ties).
    pub fn predict(&self, features: &FeatureVector) -> SymptomResult<usize> {
        let probabilities = aggregate(features, self, self.classes.len())?;
        probabilities
            .iter()
            .fold(None, |best: Option<(usize, f64)>, p| match best {
                Some((_, b)) if p.probability <= b => best,
                _ => Some((p.class_index, p.probability)),
            })
            .map(|(i, _)| i)
            .ok_or_else(|| SymptomError::Internal("empty class distribution".to_string()))
    }
}

impl Ensemble for ForestModel {
    type Estimator = DecisionTree;

    fn estimators(&self) -> &[DecisionTree] {
        &self.trees
    }

    fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn feature_count(&self) -> Option<usize> {
        self.feature_count
    }
}

impl LabelDecoder for ForestModel {
    fn decode(&self, class_index: usize) -> Option<&str> {
        self.classes.get(class_index).map(String::as_str)
    }
}
