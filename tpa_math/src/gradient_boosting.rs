//! Histogram-based gradient boosting for regression
//!
//! Least-squares boosting over binned features. Each iteration fits one
//! tree on the residual gradients; trees grow leaf-wise (best gain first)
//! until `max_leaf_nodes` is reached or no split improves the loss.
//! Split search works on per-bin gradient/hessian sums, so its cost is
//! proportional to the bin count rather than the number of distinct values.

use crate::binning::BinMapper;
use crate::regressor::{check_fit_input, check_predict_input, Regressor};
use crate::{MathError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

/// Hyperparameters of [`HistGradientBoostingRegressor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistGradientBoostingParams {
    /// Shrinkage applied to every leaf value
    pub learning_rate: f64,
    /// Number of boosting iterations (trees)
    pub max_iter: usize,
    /// Maximum number of leaves per tree
    pub max_leaf_nodes: usize,
    /// Maximum depth of a tree, unlimited when `None`
    pub max_depth: Option<usize>,
    /// Minimum number of samples per leaf
    pub min_samples_leaf: usize,
    /// L2 penalty on leaf values
    pub l2_regularization: f64,
    /// Maximum number of bins per feature
    pub max_bins: usize,
}

impl Default for HistGradientBoostingParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 100,
            max_leaf_nodes: 31,
            max_depth: None,
            min_samples_leaf: 20,
            l2_regularization: 0.0,
            max_bins: 255,
        }
    }
}

impl HistGradientBoostingParams {
    /// Check that every parameter is inside its valid range
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(MathError::InvalidParameter(
                "learning_rate must be positive".to_string(),
            ));
        }
        if self.max_iter == 0 {
            return Err(MathError::InvalidParameter(
                "max_iter must be at least 1".to_string(),
            ));
        }
        if self.max_leaf_nodes < 2 {
            return Err(MathError::InvalidParameter(
                "max_leaf_nodes must be at least 2".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(MathError::InvalidParameter(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(MathError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if !(self.l2_regularization >= 0.0 && self.l2_regularization.is_finite()) {
            return Err(MathError::InvalidParameter(
                "l2_regularization must be non-negative".to_string(),
            ));
        }
        if !(2..=crate::binning::MAX_BINS).contains(&self.max_bins) {
            return Err(MathError::InvalidParameter(format!(
                "max_bins must be between 2 and {}",
                crate::binning::MAX_BINS
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        bin: u8,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single boosted tree stored as an arena; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    fn predict_raw(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn predict_binned(&self, bins: &[Vec<u8>], sample: usize) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    bin,
                    left,
                    right,
                    ..
                } => {
                    idx = if bins[*feature][sample] <= *bin {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Best split found for one node
struct SplitCandidate {
    gain: f64,
    node: usize,
    depth: usize,
    feature: usize,
    bin: u8,
    samples: Vec<usize>,
}

impl PartialEq for SplitCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SplitCandidate {}

impl PartialOrd for SplitCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SplitCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Ties go to the older node so growth order is deterministic
        self.gain
            .total_cmp(&other.gain)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Shared state for growing the trees of one fit
struct TreeGrower<'a> {
    params: &'a HistGradientBoostingParams,
    mapper: &'a BinMapper,
    bins: &'a [Vec<u8>],
    gradients: &'a [f64],
}

impl TreeGrower<'_> {
    fn leaf_value(&self, samples: &[usize]) -> f64 {
        let g: f64 = samples.iter().map(|&i| self.gradients[i]).sum();
        let h = samples.len() as f64;
        -self.params.learning_rate * g / (h + self.params.l2_regularization)
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.params.l2_regularization)
    }

    fn can_split(&self, depth: usize, n_samples: usize) -> bool {
        let depth_ok = self.params.max_depth.map_or(true, |max| depth < max);
        depth_ok && n_samples >= 2 * self.params.min_samples_leaf
    }

    /// Scan the histograms of every feature for the best split of `samples`
    fn find_split(&self, node: usize, depth: usize, samples: Vec<usize>) -> Option<SplitCandidate> {
        if !self.can_split(depth, samples.len()) {
            return None;
        }

        let total_g: f64 = samples.iter().map(|&i| self.gradients[i]).sum();
        let total_h = samples.len() as f64;
        let parent_score = self.score(total_g, total_h);
        let min_leaf = self.params.min_samples_leaf;

        let mut best: Option<(f64, usize, u8)> = None;
        for feature in 0..self.mapper.n_features() {
            let n_bins = self.mapper.n_bins(feature);
            if n_bins < 2 {
                continue;
            }

            // Build the histogram; hessians are 1 for squared error
            let mut hist_g = vec![0.0; n_bins];
            let mut hist_n = vec![0usize; n_bins];
            for &i in &samples {
                let b = self.bins[feature][i] as usize;
                hist_g[b] += self.gradients[i];
                hist_n[b] += 1;
            }

            let mut left_g = 0.0;
            let mut left_n = 0usize;
            for b in 0..n_bins - 1 {
                left_g += hist_g[b];
                left_n += hist_n[b];
                let right_n = samples.len() - left_n;
                if left_n < min_leaf {
                    continue;
                }
                if right_n < min_leaf {
                    break;
                }

                let gain = self.score(left_g, left_n as f64)
                    + self.score(total_g - left_g, right_n as f64)
                    - parent_score;
                if gain > 1e-12 && best.map_or(true, |(best_gain, _, _)| gain > best_gain) {
                    best = Some((gain, feature, b as u8));
                }
            }
        }

        best.map(|(gain, feature, bin)| SplitCandidate {
            gain,
            node,
            depth,
            feature,
            bin,
            samples,
        })
    }

    fn grow(&self, samples: Vec<usize>) -> Tree {
        let mut nodes = vec![TreeNode::Leaf {
            value: self.leaf_value(&samples),
        }];
        let mut heap = BinaryHeap::new();
        if let Some(candidate) = self.find_split(0, 0, samples) {
            heap.push(candidate);
        }

        let mut n_leaves = 1;
        while n_leaves < self.params.max_leaf_nodes {
            let Some(split) = heap.pop() else {
                break;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = split
                .samples
                .iter()
                .partition(|&&i| self.bins[split.feature][i] <= split.bin);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(TreeNode::Leaf {
                value: self.leaf_value(&left_samples),
            });
            nodes.push(TreeNode::Leaf {
                value: self.leaf_value(&right_samples),
            });
            nodes[split.node] = TreeNode::Split {
                feature: split.feature,
                bin: split.bin,
                threshold: self.mapper.edge(split.feature, split.bin),
                left,
                right,
            };
            n_leaves += 1;

            for (child, child_samples) in [(left, left_samples), (right, right_samples)] {
                if let Some(candidate) = self.find_split(child, split.depth + 1, child_samples) {
                    heap.push(candidate);
                }
            }
        }

        Tree { nodes }
    }
}

/// Gradient boosting regressor over histogram-binned features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistGradientBoostingRegressor {
    params: HistGradientBoostingParams,
    mapper: Option<BinMapper>,
    baseline: f64,
    trees: Vec<Tree>,
}

impl HistGradientBoostingRegressor {
    /// Create an unfitted regressor, validating `params`
    pub fn new(params: HistGradientBoostingParams) -> Result<Self> {
        params.validate()?;

        Ok(Self {
            params,
            mapper: None,
            baseline: 0.0,
            trees: Vec::new(),
        })
    }

    /// Hyperparameters of the regressor
    pub fn params(&self) -> &HistGradientBoostingParams {
        &self.params
    }

    /// Number of trees grown by the last fit
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Default for HistGradientBoostingRegressor {
    fn default() -> Self {
        Self {
            params: HistGradientBoostingParams::default(),
            mapper: None,
            baseline: 0.0,
            trees: Vec::new(),
        }
    }
}

impl Regressor for HistGradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;

        let n_samples = x.nrows();
        let mapper = BinMapper::fit(x, self.params.max_bins)?;
        let bins = mapper.transform(x);

        self.baseline = y.sum() / n_samples as f64;
        let mut raw_predictions = vec![self.baseline; n_samples];
        let mut trees = Vec::with_capacity(self.params.max_iter);

        for _ in 0..self.params.max_iter {
            // Gradient of the half squared error
            let gradients: Vec<f64> = raw_predictions
                .iter()
                .zip(y.iter())
                .map(|(p, yi)| p - yi)
                .collect();

            let grower = TreeGrower {
                params: &self.params,
                mapper: &mapper,
                bins: &bins,
                gradients: &gradients,
            };
            let tree = grower.grow((0..n_samples).collect());

            for (i, prediction) in raw_predictions.iter_mut().enumerate() {
                *prediction += tree.predict_binned(&bins, i);
            }
            trees.push(tree);
        }

        debug!(
            n_samples,
            n_features = x.ncols(),
            n_trees = trees.len(),
            "fitted histogram gradient boosting"
        );

        self.mapper = Some(mapper);
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let mapper = self
            .mapper
            .as_ref()
            .ok_or_else(|| MathError::NotFitted(self.name().to_string()))?;
        check_predict_input(x, mapper.n_features())?;

        Ok(x
            .rows()
            .into_iter()
            .map(|row| {
                let row: Vec<f64> = row.to_vec();
                self.baseline + self.trees.iter().map(|t| t.predict_raw(&row)).sum::<f64>()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "HistGradientBoostingRegressor"
    }
}
