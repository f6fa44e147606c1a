//! Seams to the hosted services the ranker depends on.

use crate::FaceMatchError;
use async_trait::async_trait;
use common_types::{DetectedFace, ImageUpload, PhotoFilter, PhotoRecord};

/// Face detection + descriptor extraction, e.g. a hosted model.
#[async_trait]
pub trait EmbeddingSource: Send + Sync {
    async fn detect_faces(&self, image: &ImageUpload) -> Result<Vec<DetectedFace>, FaceMatchError>;
}

/// The photo catalogue.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn list_photos(&self, filter: &PhotoFilter) -> Result<Vec<PhotoRecord>, FaceMatchError>;

    /// Fetches the image behind `photo.url`.
    async fn load_image(&self, photo: &PhotoRecord) -> Result<ImageUpload, FaceMatchError>;
}

/// Descriptors computed earlier, keyed by photo id.
#[async_trait]
pub trait DescriptorStore: Send + Sync {
    async fn load(&self, photo_id: &str) -> Result<Option<Vec<DetectedFace>>, FaceMatchError>;

    async fn save(&self, photo_id: &str, faces: &[DetectedFace]) -> Result<(), FaceMatchError>;
}
