use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::service::{InferenceService, Prediction, Readiness};

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Per-request failure rendered as `500 {"detail": "Prediction error: ..."}`.
pub struct ApiError(PredictError);

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // candle appends a multi-line backtrace when RUST_BACKTRACE is set
        let cause = self.0.to_string();
        let cause = cause.lines().next().unwrap_or_default();
        let body = ErrorBody {
            detail: format!("Prediction error: {cause}"),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn router(service: Arc<InferenceService>) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/predict", post(predict))
        .with_state(service)
}

pub async fn read_root(State(service): State<Arc<InferenceService>>) -> Json<Readiness> {
    Json(service.ready())
}

pub async fn predict(
    State(service): State<Arc<InferenceService>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<Prediction>, ApiError> {
    let result = tokio::task::spawn_blocking(move || service.predict(&req.text))
        .await
        .map_err(|e| PredictError::Worker(e.to_string()))?;

    result.map(Json).map_err(|e| {
        tracing::error!(error = %e, "Prediction failed");
        ApiError(e)
    })
}
