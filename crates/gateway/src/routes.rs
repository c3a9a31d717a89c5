use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use inference::{ClassificationResult, DamageAssessment};
use serde_json::{Value, json};
use std::time::Instant;
use tower_http::cors::CorsLayer;

pub const IMAGE_FIELD: &str = "image";

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/classify", post(classify))
        .route("/detect_damage", post(detect_damage))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "AI Classification" }))
}

async fn classify(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let start = Instant::now();
    let result = run_classify(&state, multipart).await;
    respond(&state, "classify", start, result)
}

async fn detect_damage(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let start = Instant::now();
    let result = run_detect_damage(&state, multipart).await;
    if let Ok(assessment) = &result {
        if assessment.has_damage {
            state.metrics.record_damage_flagged();
        }
    }
    respond(&state, "detect_damage", start, result)
}

async fn run_classify(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ClassificationResult, ApiError> {
    let bytes = read_image_field(multipart).await?;
    let pipeline = state.pipeline.clone();

    tokio::task::spawn_blocking(move || pipeline.classify(&bytes))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

async fn run_detect_damage(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<DamageAssessment, ApiError> {
    let bytes = read_image_field(multipart).await?;
    let pipeline = state.pipeline.clone();

    tokio::task::spawn_blocking(move || pipeline.detect_damage(&bytes))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// Pull the `image` part out of a multipart body, skipping any other fields.
///
/// A request that is not multipart at all counts as a missing image.
async fn read_image_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Bytes, ApiError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(rejection = %rejection.body_text(), "Request is not multipart");
            return Err(ApiError::MissingInput);
        }
    };

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field.bytes().await?;
            tracing::debug!(bytes = bytes.len(), "Received image upload");
            return Ok(bytes);
        }
    }

    Err(ApiError::MissingInput)
}

fn respond<T: serde::Serialize>(
    state: &AppState,
    endpoint: &'static str,
    start: Instant,
    result: Result<T, ApiError>,
) -> Response {
    let response = match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    };
    state.metrics.record_request(
        endpoint,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
