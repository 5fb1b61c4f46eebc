//! Application state shared across handlers

use crate::artifacts::ArtifactRegistry;
use crate::inference::Predictor;

use super::ServerConfig;

/// Shared per-server state: configuration plus the artifact registry both
/// training and serving agree on. No mutable state crosses requests; the
/// only shared inputs are the read-only artifact files on disk.
pub struct AppState {
    pub config: ServerConfig,
    pub registry: ArtifactRegistry,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let registry = config.registry();
        Self { config, registry }
    }

    /// A predictor over this server's registry. Constructed per request;
    /// artifact files are read fresh on every call.
    pub fn predictor(&self) -> Predictor {
        Predictor::new(self.registry.clone())
    }

    /// Whether a trained model is currently deployed.
    pub fn model_available(&self) -> bool {
        self.registry.manifest_path().exists()
    }
}
