//! HTTP handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::schema;

use super::error::{Result, ServerError};
use super::state::AppState;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Construction Cost Predictor</title></head>
<body>
  <h1>Construction Cost Predictor</h1>
  <p>Send a GET request to <code>/predict?data=v1,v2,...,v37</code> with the
  37 feature values in schema order, or a JSON body
  <code>{"data": [...]}</code>. The response carries the predicted total.</p>
  <form action="/predict" method="get">
    <input type="text" name="data" size="80" placeholder="comma-separated feature values"/>
    <button type="submit">Predict</button>
  </form>
</body>
</html>
"#;

/// `GET /` — static landing page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /health` — service liveness and deployment status.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "model_available": state.model_available(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    /// Comma-separated feature values.
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictBody {
    data: Vec<serde_json::Value>,
}

/// `GET /predict` — score one row.
///
/// Input is either the `data` query parameter (comma-separated string) or a
/// JSON body with a `data` array; both carry the 37 feature values in schema
/// order. The prediction comes back string-wrapped:
/// `{"predicted": "<value>"}`.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PredictQuery>,
    body: Bytes,
) -> Result<Json<serde_json::Value>> {
    let values: Vec<String> = if let Some(payload) = query.data {
        schema::split_payload(&payload)
    } else if !body.is_empty() {
        let request: PredictBody = serde_json::from_slice(&body)
            .map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {}", e)))?;
        schema::values_from_json(&request.data)?
    } else {
        return Err(ServerError::BadRequest(
            "provide feature values via the 'data' query parameter or a JSON body with a 'data' array"
                .to_string(),
        ));
    };

    let prediction = state.predictor().predict(&values)?;
    info!(
        model = %prediction.model_name,
        version = %prediction.version,
        value = prediction.value,
        "prediction served"
    );

    Ok(Json(json!({
        "predicted": prediction.value.to_string(),
    })))
}
