//! Decision tree regressor with variance-reduction splits

use crate::error::{CostwiseError, Result};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Tree node: either a prediction leaf or a binary split.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Regression tree minimizing within-node squared error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all. Used by forests.
    pub max_features: Option<usize>,
    /// Seed for the feature subsample when `max_features` is set.
    pub seed: u64,
    n_features: usize,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 0,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(CostwiseError::SchemaMismatch {
                expected: format!("{} target rows", x.nrows()),
                actual: format!("{} target rows", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(CostwiseError::TrainingError("empty training set".to_string()));
        }

        self.n_features = x.ncols();
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.root = Some(self.build_node(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(CostwiseError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(CostwiseError::SchemaMismatch {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|row| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value, .. } => return *value,
                        TreeNode::Split {
                            feature_idx,
                            threshold,
                            left,
                            right,
                            ..
                        } => {
                            node = if x[[row, *feature_idx]] <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let mean = sum / n as f64;

        let depth_reached = self.max_depth.map(|d| depth >= d).unwrap_or(false);
        if depth_reached || n < self.min_samples_split {
            return TreeNode::Leaf {
                value: mean,
                n_samples: n,
            };
        }

        let features = self.candidate_features(rng);
        match self.best_split(x, y, indices, &features) {
            Some((feature_idx, threshold)) => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| x[[i, feature_idx]] <= threshold);

                let left = self.build_node(x, y, &left_idx, depth + 1, rng);
                let right = self.build_node(x, y, &right_idx, depth + 1, rng);
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                    n_samples: n,
                }
            }
            None => TreeNode::Leaf {
                value: mean,
                n_samples: n,
            },
        }
    }

    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        match self.max_features {
            Some(m) if m < self.n_features => {
                let mut sampled: Vec<usize> =
                    rand::seq::index::sample(rng, self.n_features, m).into_vec();
                sampled.sort_unstable();
                sampled
            }
            _ => (0..self.n_features).collect(),
        }
    }

    /// Best (feature, threshold) by squared-error reduction, using prefix
    /// sums over the sorted feature values. `None` when no split improves
    /// on the parent node.
    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        features: &[usize],
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let sum_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = sum_sq - sum * sum / n as f64;
        if parent_sse <= 1e-12 {
            return None;
        }

        let mut best: Option<(usize, f64, f64)> = None;

        for &feature_idx in features {
            let mut pairs: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (x[[i, feature_idx]], y[i]))
                .collect();
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_sum = 0.0;
            let mut left_sum_sq = 0.0;
            for k in 1..n {
                let (value, target) = pairs[k - 1];
                left_sum += target;
                left_sum_sq += target * target;

                // Can't split between identical values
                if pairs[k].0 <= value {
                    continue;
                }
                if k < self.min_samples_leaf || n - k < self.min_samples_leaf {
                    continue;
                }

                let right_sum = sum - left_sum;
                let right_sum_sq = sum_sq - left_sum_sq;
                let sse_left = left_sum_sq - left_sum * left_sum / k as f64;
                let sse_right = right_sum_sq - right_sum * right_sum / (n - k) as f64;
                let sse = sse_left + sse_right;

                let improves = match best {
                    Some((_, _, best_sse)) => sse < best_sse,
                    None => sse < parent_sse - 1e-12,
                };
                if improves {
                    let threshold = (value + pairs[k].0) / 2.0;
                    best = Some((feature_idx, threshold, sse));
                }
            }
        }

        best.map(|(feature_idx, threshold, _)| (feature_idx, threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        // y jumps from 1 to 10 at x = 5
        let x = Array2::from_shape_fn((10, 1), |(r, _)| r as f64);
        let y = Array1::from_shape_fn(10, |r| if r < 5 { 1.0 } else { 10.0 });
        (x, y)
    }

    #[test]
    fn test_tree_learns_step_function() {
        let (x, y) = step_data();
        let mut tree = DecisionTreeRegressor::new().with_max_depth(3);
        tree.fit(&x, &y).unwrap();

        let pred = tree.predict(&array![[2.0], [8.0]]).unwrap();
        assert!((pred[0] - 1.0).abs() < 1e-10);
        assert!((pred[1] - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_constant_target_yields_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();

        let pred = tree.predict(&array![[99.0]]).unwrap();
        assert_eq!(pred[0], 4.0);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let (x, y) = step_data();
        let mut tree = DecisionTreeRegressor::new().with_min_samples_leaf(6);
        tree.fit(&x, &y).unwrap();

        // No split can leave 6 samples on both sides of 10 rows
        let pred = tree.predict(&array![[0.0], [9.0]]).unwrap();
        assert!((pred[0] - pred[1]).abs() < 1e-10);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let tree = DecisionTreeRegressor::new();
        assert!(matches!(
            tree.predict(&array![[1.0]]),
            Err(CostwiseError::NotFitted)
        ));
    }
}
