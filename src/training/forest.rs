//! Random forest regressor

use crate::error::{CostwiseError, Result};
use crate::training::tree::DecisionTreeRegressor;
use ndarray::{Array1, Array2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of regression trees. Each tree trains on a bootstrap
/// sample and considers a random feature subset per split. Per-tree seeds
/// derive from the forest seed, so fitting is deterministic even though
/// trees are built in parallel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    /// Features per split; `None` = sqrt of the feature count.
    pub max_features: Option<usize>,
    pub seed: u64,
    trees: Vec<DecisionTreeRegressor>,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            max_depth: None,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
            trees: Vec::new(),
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

        let n = x.nrows();
        let max_features = self
            .max_features
            .unwrap_or_else(|| ((x.ncols() as f64).sqrt().round() as usize).max(1));

        let max_depth = self.max_depth;
        let min_samples_leaf = self.min_samples_leaf;
        let seed = self.seed;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let tree_seed = seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);

                // Bootstrap sample with replacement
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let x_boot = Array2::from_shape_fn((n, x.ncols()), |(r, c)| x[[sample[r], c]]);
                let y_boot = Array1::from_shape_fn(n, |r| y[sample[r]]);

                let mut tree = DecisionTreeRegressor::new()
                    .with_min_samples_leaf(min_samples_leaf)
                    .with_max_features(max_features)
                    .with_seed(tree_seed);
                if let Some(depth) = max_depth {
                    tree = tree.with_max_depth(depth);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(CostwiseError::NotFitted);
        }

        let mut sum = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            sum = sum + tree.predict(x)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}
