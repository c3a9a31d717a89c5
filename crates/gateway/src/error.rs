use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use inference::InspectionError;
use serde_json::json;
use thiserror::Error;

pub const MISSING_IMAGE_MESSAGE: &str = "No image sent";

/// Everything a request can fail with; rendered as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{}", MISSING_IMAGE_MESSAGE)]
    MissingInput,

    #[error("Invalid upload: {message}")]
    Upload { status: StatusCode, message: String },

    #[error(transparent)]
    Inspection(#[from] InspectionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingInput => StatusCode::BAD_REQUEST,
            ApiError::Upload { status, .. } => *status,
            ApiError::Inspection(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        ApiError::Upload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
