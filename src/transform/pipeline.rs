//! The transformation stage: train/test CSVs in, numeric arrays out.

use crate::artifacts::ArtifactRegistry;
use crate::data::DatasetLoader;
use crate::error::{CostwiseError, Result};
use crate::schema;
use crate::transform::{to_feature_array, ImputeStrategy, Imputer, StandardScaler, TargetEncoder};
use ndarray::Array2;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output of the transformation stage. Both arrays carry the feature columns
/// in schema order with the target appended as the final column.
#[derive(Debug)]
pub struct TransformOutput {
    pub train: Array2<f64>,
    pub test: Array2<f64>,
    pub encoder_path: PathBuf,
    pub scaler_path: PathBuf,
}

/// Transformation stage: drops the target and auxiliary columns from the
/// feature set, imputes and scales numeric features, target-encodes
/// categorical features, and persists the fitted encoder and scaler.
///
/// All statistics are fit on the training split only; the test split and
/// every later inference request replay them unchanged.
#[derive(Debug, Default)]
pub struct DataTransformation {
    loader: DatasetLoader,
}

impl DataTransformation {
    pub fn new() -> Self {
        Self {
            loader: DatasetLoader::new(),
        }
    }

    /// Run transformation over the given split files.
    pub fn run(
        &self,
        registry: &ArtifactRegistry,
        train_path: &Path,
        test_path: &Path,
    ) -> Result<TransformOutput> {
        let train_df = self.loader.load_csv(train_path)?;
        let test_df = self.loader.load_csv(test_path)?;
        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            "read train and test splits"
        );

        let (train_features, train_target) = Self::split_features(&train_df)?;
        let (test_features, test_target) = Self::split_features(&test_df)?;

        let numeric_cols = schema::numeric_feature_columns();
        let categorical_cols: Vec<&str> = schema::CATEGORICAL_COLUMNS.to_vec();

        // Numeric imputation, train-fitted
        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let train_features = imputer.fit_transform(&train_features, &numeric_cols)?;
        let test_features = imputer.transform(&test_features)?;

        // Target encoding, fit on the training split only
        let mut encoder = TargetEncoder::new();
        encoder.fit(&train_features, &categorical_cols, &train_target)?;
        let train_features = encoder.transform(&train_features)?;
        let test_features = encoder.transform(&test_features)?;

        // Standard scaling of numeric features, train-fitted
        let mut scaler = StandardScaler::new();
        let train_features = scaler.fit_transform(&train_features, &numeric_cols)?;
        let test_features = scaler.transform(&test_features)?;

        info!("fitted imputer, target encoder, and scaler on the training split");

        let train = Self::with_target(&train_features, &train_target)?;
        let test = Self::with_target(&test_features, &test_target)?;

        registry.ensure_dirs()?;
        let encoder_path = registry.encoder_path();
        let scaler_path = registry.scaler_path();
        registry.save_json(&encoder_path, &encoder)?;
        registry.save_json(&scaler_path, &scaler)?;
        info!(
            encoder = %encoder_path.display(),
            scaler = %scaler_path.display(),
            "persisted transformation artifacts"
        );

        Ok(TransformOutput {
            train,
            test,
            encoder_path,
            scaler_path,
        })
    }

    /// Separate the feature frame from the target series, dropping the
    /// auxiliary attribute along the way.
    fn split_features(df: &DataFrame) -> Result<(DataFrame, Series)> {
        let target = df
            .column(schema::TARGET_COLUMN)
            .map_err(|_| CostwiseError::SchemaMismatch {
                expected: format!("target column '{}'", schema::TARGET_COLUMN),
                actual: "missing column".to_string(),
            })?
            .as_materialized_series()
            .clone();

        let features = df.drop(schema::TARGET_COLUMN)?;
        let features = match features.drop(schema::AUX_COLUMN) {
            Ok(dropped) => dropped,
            Err(_) => features,
        };

        for col in schema::FEATURE_COLUMNS {
            if features.column(col).is_err() {
                return Err(CostwiseError::SchemaMismatch {
                    expected: format!("feature column '{}'", col),
                    actual: "missing column".to_string(),
                });
            }
        }

        Ok((features, target))
    }

    /// Feature array with the target appended as the last column.
    fn with_target(features: &DataFrame, target: &Series) -> Result<Array2<f64>> {
        let x = to_feature_array(features)?;
        let y: Vec<f64> = target
            .cast(&DataType::Float64)
            .map_err(|e| CostwiseError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| CostwiseError::DataError(e.to_string()))?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        if y.len() != x.nrows() {
            return Err(CostwiseError::SchemaMismatch {
                expected: format!("{} target rows", x.nrows()),
                actual: format!("{} target rows", y.len()),
            });
        }

        let n_cols = x.ncols();
        Ok(Array2::from_shape_fn((x.nrows(), n_cols + 1), |(r, c)| {
            if c < n_cols {
                x[[r, c]]
            } else {
                y[r]
            }
        }))
    }
}
