use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "Unsupported image type '{mime_type}'. Accepted: {} up to {} MiB.",
        .accepted.join(", "),
        .max_bytes / (1024 * 1024)
    )]
    UnsupportedType {
        mime_type: String,
        accepted: Vec<String>,
        max_bytes: u64,
    },

    #[error(
        "Image is too large ({size} bytes). Accepted: {} up to {} MiB.",
        .accepted.join(", "),
        .max_bytes / (1024 * 1024)
    )]
    TooLarge {
        size: u64,
        accepted: Vec<String>,
        max_bytes: u64,
    },

    #[error("Quality must be in (0, 1], got {0}")]
    InvalidQuality(f32),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Failed to resize image: {0}")]
    Resize(String),

    #[error("Failed to load watermark font: {0}")]
    Font(String),

    #[error("Image processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// Validation errors are raised before any pixel is touched.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::UnsupportedType { .. } | Self::TooLarge { .. })
    }
}
