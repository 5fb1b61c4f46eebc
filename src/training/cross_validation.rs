//! Seeded k-fold cross-validation

use crate::error::{CostwiseError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A single train/validation split.
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub val_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter with a seeded shuffle so fold assignment is reproducible.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits, seed: 0 }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate the folds for `n_samples` rows.
    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(CostwiseError::InvalidParameter {
                name: "n_splits".to_string(),
                value: self.n_splits.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if n_samples < self.n_splits {
            return Err(CostwiseError::TrainingError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut current = 0;
        for fold_idx in 0..self.n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let val_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(FoldSplit {
                train_indices,
                val_indices,
                fold_idx,
            });
            current += fold_size;
        }

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold_coverage() {
        let splits = KFold::new(3).split(30).unwrap();
        assert_eq!(splits.len(), 3);

        let mut all_val: Vec<usize> = splits.iter().flat_map(|s| s.val_indices.clone()).collect();
        all_val.sort_unstable();
        assert_eq!(all_val, (0..30).collect::<Vec<_>>());

        for split in &splits {
            assert_eq!(split.train_indices.len() + split.val_indices.len(), 30);
        }
    }

    #[test]
    fn test_uneven_fold_sizes() {
        let splits = KFold::new(3).split(10).unwrap();
        let sizes: Vec<usize> = splits.iter().map(|s| s.val_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_seeded_splits_are_stable() {
        let a = KFold::new(3).with_seed(7).split(20).unwrap();
        let b = KFold::new(3).with_seed(7).split(20).unwrap();
        for (sa, sb) in a.iter().zip(b.iter()) {
            assert_eq!(sa.val_indices, sb.val_indices);
        }
    }

    #[test]
    fn test_too_few_samples() {
        assert!(KFold::new(3).split(2).is_err());
    }
}
