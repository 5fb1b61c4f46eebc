//! Data ingestion: raw copy + seeded train/test split

use crate::artifacts::ArtifactRegistry;
use crate::data::DatasetLoader;
use crate::error::{CostwiseError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

/// Configuration for the ingestion stage.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Source table to ingest.
    pub source_path: PathBuf,
    /// Fraction of rows held out for the test split.
    pub test_ratio: f64,
    /// Shuffle seed; fixed so re-runs produce identical splits.
    pub seed: u64,
}

impl IngestionConfig {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            test_ratio: 0.1,
            seed: 0,
        }
    }

    pub fn with_test_ratio(mut self, ratio: f64) -> Self {
        self.test_ratio = ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Ingestion stage: reads the source table, persists an unmodified raw copy,
/// and writes shuffled train/test splits through the artifact registry.
pub struct DataIngestion {
    config: IngestionConfig,
    loader: DatasetLoader,
}

impl DataIngestion {
    pub fn new(config: IngestionConfig) -> Self {
        Self {
            config,
            loader: DatasetLoader::new(),
        }
    }

    /// Run ingestion. Returns the train and test CSV paths.
    pub fn run(&self, registry: &ArtifactRegistry) -> Result<(PathBuf, PathBuf)> {
        info!(source = %self.config.source_path.display(), "starting data ingestion");
        registry.ensure_dirs()?;

        let df = self.loader.load_csv(&self.config.source_path)?;
        info!(rows = df.height(), columns = df.width(), "read source dataset");

        self.loader.write_csv(&df, &registry.raw_path())?;

        let (train, test) = self.split(&df)?;
        self.loader.write_csv(&train, &registry.train_path())?;
        self.loader.write_csv(&test, &registry.test_path())?;

        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            "ingestion complete"
        );
        Ok((registry.train_path(), registry.test_path()))
    }

    /// Seeded shuffle split. Test size rounds up so the split is never empty
    /// for a non-zero ratio; train + test row counts always sum to the input.
    fn split(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let n = df.height();
        if n < 2 {
            return Err(CostwiseError::DataError(format!(
                "need at least 2 rows to split, got {}",
                n
            )));
        }
        if !(0.0..1.0).contains(&self.config.test_ratio) {
            return Err(CostwiseError::InvalidParameter {
                name: "test_ratio".to_string(),
                value: self.config.test_ratio.to_string(),
                reason: "must be in [0, 1)".to_string(),
            });
        }

        let test_size = ((n as f64 * self.config.test_ratio).ceil() as usize).min(n - 1);
        let train_size = n - test_size;

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let train_idx = IdxCa::from_vec(
            "idx".into(),
            indices[..train_size].iter().map(|&i| i as IdxSize).collect(),
        );
        let test_idx = IdxCa::from_vec(
            "idx".into(),
            indices[train_size..].iter().map(|&i| i as IdxSize).collect(),
        );

        let train = df.take(&train_idx)?;
        let test = df.take(&test_idx)?;
        Ok((train, test))
    }
}
