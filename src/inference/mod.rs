//! Inference: replay the training-time transformations on a single request
//! row and run the persisted model.

use crate::artifacts::ArtifactRegistry;
use crate::error::{CostwiseError, Result};
use crate::schema;
use crate::training::TrainedRegressor;
use crate::transform::{to_feature_array, StandardScaler, TargetEncoder};
use tracing::debug;

/// One scored request.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub value: f64,
    pub model_name: String,
    pub version: String,
}

/// Stateless predictor over a shared artifact registry.
///
/// Artifacts are re-read from disk on every call; there is no in-memory
/// cache, so a fresh training run takes effect on the next request.
#[derive(Debug, Clone)]
pub struct Predictor {
    registry: ArtifactRegistry,
}

impl Predictor {
    pub fn new(registry: ArtifactRegistry) -> Self {
        Self { registry }
    }

    /// Score a comma-separated payload of feature values.
    pub fn predict_payload(&self, payload: &str) -> Result<Prediction> {
        self.predict(&schema::split_payload(payload))
    }

    /// Score positional feature values in schema order.
    ///
    /// Input problems surface as [`CostwiseError::SchemaMismatch`]; missing
    /// or stale artifacts as [`CostwiseError::ArtifactError`].
    pub fn predict(&self, values: &[String]) -> Result<Prediction> {
        // Validate the input before touching artifacts, so a malformed
        // request is reported as such even when no model is deployed yet.
        let row = schema::row_from_values(values)?;

        let manifest = self.registry.load_manifest().map_err(|e| match e {
            CostwiseError::SchemaMismatch { expected, actual } => CostwiseError::ArtifactError(
                format!("artifact schema mismatch: expected {}, got {}", expected, actual),
            ),
            other => other,
        })?;

        let encoder: TargetEncoder = self.registry.load_json(&self.registry.encoder_path())?;
        let scaler: StandardScaler = self.registry.load_json(&self.registry.scaler_path())?;
        let model: TrainedRegressor = self.registry.load_json(&self.registry.model_path())?;

        let row = encoder.transform(&row)?;
        let row = scaler.transform(&row)?;
        let x = to_feature_array(&row)?;

        let predictions = model
            .predict(&x)
            .map_err(|e| CostwiseError::InferenceError(e.to_string()))?;
        let value = predictions
            .first()
            .copied()
            .ok_or_else(|| CostwiseError::InferenceError("model returned no prediction".to_string()))?;

        debug!(
            model = %manifest.model_name,
            version = %manifest.version,
            value,
            "scored request"
        );

        Ok(Prediction {
            value,
            model_name: manifest.model_name,
            version: manifest.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Manifest;
    use crate::data::DatasetLoader;
    use crate::testutil::{synthetic_raw_frame, synthetic_request_values};
    use crate::training::{Candidate, ModelTrainer, ParamGrid, RegressorKind};
    use crate::transform::DataTransformation;

    /// Train a tiny pipeline end to end and return its registry.
    fn trained_registry(dir: &std::path::Path) -> ArtifactRegistry {
        let registry = ArtifactRegistry::under(dir);
        registry.ensure_dirs().unwrap();

        let loader = DatasetLoader::new();
        let train_path = dir.join("train.csv");
        let test_path = dir.join("test.csv");
        loader.write_csv(&synthetic_raw_frame(60, 3), &train_path).unwrap();
        loader.write_csv(&synthetic_raw_frame(12, 9), &test_path).unwrap();

        let output = DataTransformation::new()
            .run(&registry, &train_path, &test_path)
            .unwrap();

        let candidates = vec![Candidate::new(
            "ridge_regression",
            RegressorKind::Ridge,
            ParamGrid::new().with("alpha", &[0.1]),
        )];
        ModelTrainer::new()
            .run(&registry, &candidates, &output.train, &output.test)
            .unwrap();
        registry
    }

    #[test]
    fn test_predict_roundtrip_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let registry = trained_registry(dir.path());
        let predictor = Predictor::new(registry);

        let values = synthetic_request_values();
        let a = predictor.predict(&values).unwrap();
        let b = predictor.predict(&values).unwrap();
        assert_eq!(a.value, b.value);
        assert!(a.value.is_finite());
        assert_eq!(a.model_name, "ridge_regression");
    }

    #[test]
    fn test_payload_parsing_matches_values() {
        let dir = tempfile::tempdir().unwrap();
        let registry = trained_registry(dir.path());
        let predictor = Predictor::new(registry);

        let values = synthetic_request_values();
        let payload = values.join(",");
        let from_payload = predictor.predict_payload(&payload).unwrap();
        let from_values = predictor.predict(&values).unwrap();
        assert_eq!(from_payload.value, from_values.value);
    }

    #[test]
    fn test_wrong_field_count_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let registry = trained_registry(dir.path());
        let predictor = Predictor::new(registry);

        let err = predictor.predict_payload("1,2,3").unwrap_err();
        assert!(matches!(err, CostwiseError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_artifacts_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Predictor::new(ArtifactRegistry::under(dir.path()));

        let err = predictor.predict(&synthetic_request_values()).unwrap_err();
        assert!(matches!(err, CostwiseError::ArtifactError(_)));
    }

    #[test]
    fn test_stale_schema_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = trained_registry(dir.path());

        // Corrupt the manifest as if artifacts came from an older schema
        let mut manifest: Manifest = registry.load_json(&registry.manifest_path()).unwrap();
        manifest.feature_columns.truncate(10);
        registry.save_json(&registry.manifest_path(), &manifest).unwrap();

        let predictor = Predictor::new(registry);
        let err = predictor.predict(&synthetic_request_values()).unwrap_err();
        assert!(matches!(err, CostwiseError::ArtifactError(_)));
    }
}
