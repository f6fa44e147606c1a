//! File-backed stand-ins for the photo catalogue and the face model.

use crate::files::read_upload;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common_types::{DetectedFace, ImageUpload, PhotoFilter, PhotoRecord};
use face_match::{EmbeddingSource, FaceMatchError, PhotoSource};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

fn is_image_file(path: &Path) -> bool {
    let Some(extension) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
        return false;
    };
    IMAGE_EXTENSIONS.contains(&extension.as_str())
}

/// A folder of photos. Sub-folder names become categories.
#[derive(Debug, Clone)]
pub struct DirectoryPhotoSource {
    root: PathBuf,
    photographer: Option<String>,
}

impl DirectoryPhotoSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            photographer: None,
        }
    }

    /// Credits every photo in the folder to one photographer.
    #[must_use]
    pub fn with_photographer(mut self, photographer: Option<String>) -> Self {
        self.photographer = photographer;
        self
    }

    fn scan(root: &Path, photographer: Option<&str>) -> Vec<PhotoRecord> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Directory walk error: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_image_file(entry.path()))
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(root).ok()?;
                let id = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let category = relative
                    .parent()
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned());
                let created_at = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .map(DateTime::<Utc>::from);

                Some(PhotoRecord {
                    title: entry.path().file_stem()?.to_string_lossy().into_owned(),
                    url: entry.path().display().to_string(),
                    photographer: photographer.map(str::to_string),
                    category,
                    created_at,
                    id,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PhotoSource for DirectoryPhotoSource {
    async fn list_photos(&self, filter: &PhotoFilter) -> Result<Vec<PhotoRecord>, FaceMatchError> {
        let root = self.root.clone();
        let photographer = self.photographer.clone();
        let photos = task::spawn_blocking(move || Self::scan(&root, photographer.as_deref()))
            .await
            .map_err(|e| FaceMatchError::lookup(self.root.display().to_string(), e))?;
        let scanned = photos.len();

        let photos: Vec<_> = photos
            .into_iter()
            .filter(|photo| filter.accepts(photo))
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect();
        debug!(
            "{} of {scanned} photos in {} pass the filter",
            photos.len(),
            self.root.display()
        );
        Ok(photos)
    }

    async fn load_image(&self, photo: &PhotoRecord) -> Result<ImageUpload, FaceMatchError> {
        read_upload(Path::new(&photo.url))
            .await
            .map_err(|e| FaceMatchError::lookup(&photo.id, e))
    }
}

/// Face detections computed ahead of time by an external model, stored as a JSON
/// object of file name -> detected faces.
#[derive(Debug, Default)]
pub struct DetectionsFileSource {
    detections: HashMap<String, Vec<DetectedFace>>,
}

impl DetectionsFileSource {
    pub async fn open(path: &Path) -> Result<Self, FaceMatchError> {
        let bytes = tokio::fs::read(path).await?;
        let detections: HashMap<String, Vec<DetectedFace>> = serde_json::from_slice(&bytes)?;
        debug!("Loaded detections for {} images", detections.len());
        Ok(Self { detections })
    }
}

#[async_trait]
impl EmbeddingSource for DetectionsFileSource {
    async fn detect_faces(&self, image: &ImageUpload) -> Result<Vec<DetectedFace>, FaceMatchError> {
        self.detections
            .get(&image.name)
            .cloned()
            .ok_or_else(|| FaceMatchError::lookup(&image.name, "no detections recorded"))
    }
}
