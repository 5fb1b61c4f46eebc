//! Synthetic data helpers shared by unit tests.

use crate::schema;
use polars::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Build a raw table matching the full ingestion schema: every feature
/// column, the auxiliary attribute, and a target correlated with the
/// features so regressors have signal to learn.
pub(crate) fn synthetic_raw_frame(n: usize, seed: u64) -> DataFrame {
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
pub(crate) fn synthetic_request_values() -> Vec<String> {
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
