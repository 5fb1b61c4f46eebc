//! Artifact registry: the single authority for where pipeline outputs live.
//!
//! Training and serving share one registry, so the encoder, scaler, and model
//! consumed at inference time are always the ones produced by the same run.
//! The manifest records the column schema the artifacts were fitted against;
//! loading artifacts written under a different schema is a typed error, not
//! silent prediction corruption.

use crate::error::{CostwiseError, Result};
use crate::schema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Describes one training run's artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Version identifier of the training run that wrote the artifacts.
    pub version: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub target_column: String,
    pub feature_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    /// Name of the winning candidate model.
    pub model_name: String,
}

impl Manifest {
    /// Build a manifest for the compiled-in schema.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            version: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            created_at: chrono::Utc::now(),
            target_column: schema::TARGET_COLUMN.to_string(),
            feature_columns: schema::FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            categorical_columns: schema::CATEGORICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            model_name: model_name.into(),
        }
    }

    /// Check that the artifacts were fitted against the compiled-in schema.
    pub fn validate(&self) -> Result<()> {
        let expected: Vec<String> = schema::FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
        if self.feature_columns != expected || self.target_column != schema::TARGET_COLUMN {
            return Err(CostwiseError::SchemaMismatch {
                expected: format!("{} feature columns, target '{}'", expected.len(), schema::TARGET_COLUMN),
                actual: format!(
                    "{} feature columns, target '{}' (artifact version {})",
                    self.feature_columns.len(),
                    self.target_column,
                    self.version
                ),
            });
        }
        Ok(())
    }
}

/// Filesystem layout for dataset splits and fitted artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactRegistry {
    data_dir: PathBuf,
    models_dir: PathBuf,
}

impl Default for ArtifactRegistry {
    fn default() -> Self {
        Self::new("artifacts", "models")
    }
}

impl ArtifactRegistry {
    pub fn new(data_dir: impl Into<PathBuf>, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            models_dir: models_dir.into(),
        }
    }

    /// Root both directories under a single path (`<root>/artifacts`, `<root>/models`).
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(root.join("artifacts"), root.join("models"))
    }

    /// Create both directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.models_dir)?;
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join("raw.csv")
    }

    pub fn train_path(&self) -> PathBuf {
        self.data_dir.join("train.csv")
    }

    pub fn test_path(&self) -> PathBuf {
        self.data_dir.join("test.csv")
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.models_dir.join("categorical_encoder.json")
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.models_dir.join("scaler.json")
    }

    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join("best_model.json")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.models_dir.join("manifest.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.models_dir.join("training_report.json")
    }

    /// Persist a value as pretty-printed JSON.
    pub fn save_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a JSON artifact, mapping a missing file to an artifact error.
    pub fn load_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CostwiseError::ArtifactError(format!("{}: {}", path.display(), e))
        })?;
        let value = serde_json::from_str(&json)?;
        Ok(value)
    }

    /// Load and validate the manifest for the current artifacts.
    pub fn load_manifest(&self) -> Result<Manifest> {
        let manifest: Manifest = self.load_json(&self.manifest_path())?;
        manifest.validate()?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_paths() {
        let registry = ArtifactRegistry::new("artifacts", "models");
        assert_eq!(registry.raw_path(), PathBuf::from("artifacts/raw.csv"));
        assert_eq!(registry.model_path(), PathBuf::from("models/best_model.json"));
    }

    #[test]
    fn test_manifest_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ArtifactRegistry::under(dir.path());
        registry.ensure_dirs().unwrap();

        let manifest = Manifest::new("ridge");
        registry.save_json(&registry.manifest_path(), &manifest).unwrap();

        let loaded = registry.load_manifest().unwrap();
        assert_eq!(loaded.model_name, "ridge");
        assert_eq!(loaded.version, manifest.version);
    }

    #[test]
    fn test_manifest_schema_validation() {
        let mut manifest = Manifest::new("ridge");
        manifest.feature_columns.pop();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_missing_artifact_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ArtifactRegistry::under(dir.path());
        let err = registry.load_manifest().unwrap_err();
        assert!(matches!(err, CostwiseError::ArtifactError(_)));
    }
}
