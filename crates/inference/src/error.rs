use preprocess::{DecodeError, PreprocessError};
use thiserror::Error;

/// Per-request failures. None of these are retried.
#[derive(Error, Debug)]
pub enum InspectionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error("Inference failed: {0}")]
    Inference(anyhow::Error),
}

/// Startup failures. Fatal: the service must not accept requests.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Model artifact not found at {path}")]
    ArtifactMissing { path: String },

    #[error("{kind} backend unavailable ({path}): {reason}")]
    Unavailable {
        kind: &'static str,
        path: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_message_passes_through() {
        let err: InspectionError = DecodeError::EmptyPayload.into();
        assert_eq!(err.to_string(), "Image payload is empty");
    }

    #[test]
    fn test_backend_error_display_formatting() {
        let err = BackendError::Unavailable {
            kind: "classifier",
            path: "/models/asset.onnx".to_string(),
            reason: "bad graph".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "classifier backend unavailable (/models/asset.onnx): bad graph"
        );
    }
}
