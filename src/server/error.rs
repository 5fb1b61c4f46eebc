//! Error types for the web boundary

use crate::error::CostwiseError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Map pipeline error kinds onto the three caller-distinguishable outcomes:
/// malformed input (400), missing/stale artifacts (503), everything else (500).
impl From<CostwiseError> for ServerError {
    fn from(err: CostwiseError) -> Self {
        match err {
            CostwiseError::SchemaMismatch { .. } => ServerError::BadRequest(err.to_string()),
            CostwiseError::ArtifactError(_) => ServerError::Unavailable(err.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Unavailable(msg) => {
                tracing::warn!(detail = %msg, "artifacts unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Model artifacts are not available. Run training first.".to_string(),
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let err: ServerError = CostwiseError::SchemaMismatch {
            expected: "37".to_string(),
            actual: "3".to_string(),
        }
        .into();
        assert!(matches!(err, ServerError::BadRequest(_)));

        let err: ServerError = CostwiseError::ArtifactError("missing".to_string()).into();
        assert!(matches!(err, ServerError::Unavailable(_)));

        let err: ServerError = CostwiseError::TrainingError("boom".to_string()).into();
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
