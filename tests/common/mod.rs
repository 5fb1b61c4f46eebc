//! Shared helpers for integration tests.

use costwise::artifacts::ArtifactRegistry;
use costwise::data::{DataIngestion, DatasetLoader, IngestionConfig};
use costwise::schema;
use costwise::training::{Candidate, ModelTrainer, ParamGrid, RegressorKind};
use costwise::transform::DataTransformation;
use polars::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// Build a raw table matching the full ingestion schema: every feature
/// column, the auxiliary attribute, and a target correlated with the
/// features.
pub fn synthetic_raw_frame(n: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut target = vec![0.0f64; n];
    let mut columns: Vec<Column> = Vec::new();

    for (j, name) in schema::FEATURE_COLUMNS.iter().enumerate() {
        if schema::is_categorical(name) {
            let values: Vec<String> = (0..n)
                .map(|i| {
                    let bucket = (i + j) % 3;
                    target[i] += (bucket as f64) * 5.0;
                    format!("{}-{}", name.to_lowercase().replace(' ', "_"), bucket)
                })
                .collect();
            columns.push(Column::new((*name).into(), values));
        } else {
            let coef = 1.0 / (j as f64 + 1.0);
            let values: Vec<f64> = (0..n)
                .map(|i| {
                    let v: f64 = rng.gen_range(0.0..100.0);
                    target[i] += v * coef;
                    v
                })
                .collect();
            columns.push(Column::new((*name).into(), values));
        }
    }

    let aux: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..10.0)).collect();
    columns.push(Column::new(schema::AUX_COLUMN.into(), aux));

    let total: Vec<f64> = target
        .into_iter()
        .map(|t| t + rng.gen_range(-1.0..1.0))
        .collect();
    columns.push(Column::new(schema::TARGET_COLUMN.into(), total));

    DataFrame::new(columns).unwrap()
}

/// A valid 37-value request payload drawn from the same category buckets
/// the synthetic frame uses.
pub fn request_values() -> Vec<String> {
    schema::FEATURE_COLUMNS
        .iter()
        .map(|name| {
            if schema::is_categorical(name) {
                format!("{}-1", name.to_lowercase().replace(' ', "_"))
            } else {
                "42.0".to_string()
            }
        })
        .collect()
}

/// The two-candidate registry with one-parameter grids used by the
/// end-to-end tests.
pub fn two_candidate_registry() -> Vec<Candidate> {
    vec![
        Candidate::new(
            "ridge_regression",
            RegressorKind::Ridge,
            ParamGrid::new().with("alpha", &[0.1]),
        ),
        Candidate::new(
            "decision_tree",
            RegressorKind::DecisionTree,
            ParamGrid::new().with("max_depth", &[4.0]),
        ),
    ]
}

/// Run the whole offline pipeline on a synthetic source table and return
/// the populated registry.
pub fn run_pipeline(dir: &Path, rows: usize) -> ArtifactRegistry {
    let registry = ArtifactRegistry::under(dir);
    registry.ensure_dirs().unwrap();

    let source = dir.join("source.csv");
    DatasetLoader::new()
        .write_csv(&synthetic_raw_frame(rows, 17), &source)
        .unwrap();

    let (train_path, test_path) = DataIngestion::new(IngestionConfig::new(source))
        .run(&registry)
        .unwrap();

    let output = DataTransformation::new()
        .run(&registry, &train_path, &test_path)
        .unwrap();

    ModelTrainer::new()
        .run(&registry, &two_candidate_registry(), &output.train, &output.test)
        .unwrap();

    registry
}
