use image_pipeline::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceMatchError {
    #[error("No face detected in the reference photo. Please retry with a clearer photo.")]
    NoFaceDetected,

    #[error("Lookup failed for {target}: {message}")]
    Lookup { target: String, message: String },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FaceMatchError {
    pub fn lookup(target: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Lookup {
            target: target.into(),
            message: error.to_string(),
        }
    }
}
