//! In-memory collaborators for unit tests.

use crate::FaceMatchError;
use crate::sources::{DescriptorStore, EmbeddingSource, PhotoSource};
use async_trait::async_trait;
use common_types::{BoundingBox, DetectedFace, ImageUpload, PhotoFilter, PhotoRecord};
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

pub fn face(descriptor: &[f32], side: f32) -> DetectedFace {
    DetectedFace {
        descriptor: descriptor.to_vec(),
        bounding_box: BoundingBox {
            x: 0.0,
            y: 0.0,
            width: side,
            height: side,
        },
        landmarks: vec![],
        confidence: 0.9,
    }
}

pub fn photo(id: &str) -> PhotoRecord {
    PhotoRecord {
        id: id.to_string(),
        url: format!("https://cdn.example.com/{id}.jpg"),
        title: format!("Photo {id}"),
        photographer: Some("ana".to_string()),
        category: None,
        created_at: None,
    }
}

pub fn png_upload(name: &str) -> ImageUpload {
    let img = RgbImage::from_pixel(16, 16, Rgb([120, 90, 60]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    ImageUpload::new(name, "image/png", out.into_inner())
}

/// Detections keyed by upload name. Unknown images have no faces.
#[derive(Clone, Default)]
pub struct StaticEmbeddings {
    faces: Arc<HashMap<String, Vec<DetectedFace>>>,
    failing: Arc<HashSet<String>>,
    calls: Arc<AtomicUsize>,
}

impl StaticEmbeddings {
    pub fn with(faces: HashMap<String, Vec<DetectedFace>>) -> Self {
        Self {
            faces: Arc::new(faces),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, names: &[&str]) -> Self {
        self.failing = Arc::new(names.iter().map(ToString::to_string).collect());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingSource for StaticEmbeddings {
    async fn detect_faces(&self, image: &ImageUpload) -> Result<Vec<DetectedFace>, FaceMatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&image.name) {
            return Err(FaceMatchError::lookup(&image.name, "model unavailable"));
        }
        Ok(self.faces.get(&image.name).cloned().unwrap_or_default())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPhotos {
    photos: Vec<PhotoRecord>,
}

impl InMemoryPhotos {
    pub fn with(photos: Vec<PhotoRecord>) -> Self {
        Self { photos }
    }
}

#[async_trait]
impl PhotoSource for InMemoryPhotos {
    async fn list_photos(&self, filter: &PhotoFilter) -> Result<Vec<PhotoRecord>, FaceMatchError> {
        let matching = self.photos.iter().filter(|p| filter.accepts(p)).cloned();
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn load_image(&self, photo: &PhotoRecord) -> Result<ImageUpload, FaceMatchError> {
        if self.photos.iter().any(|p| p.id == photo.id) {
            Ok(png_upload(&format!("{}.png", photo.id)))
        } else {
            Err(FaceMatchError::lookup(&photo.url, "not found"))
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<DetectedFace>>>>,
}

impl InMemoryStore {
    pub fn with(entries: HashMap<String, Vec<DetectedFace>>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

#[async_trait]
impl DescriptorStore for InMemoryStore {
    async fn load(&self, photo_id: &str) -> Result<Option<Vec<DetectedFace>>, FaceMatchError> {
        Ok(self.entries.read().unwrap().get(photo_id).cloned())
    }

    async fn save(&self, photo_id: &str, faces: &[DetectedFace]) -> Result<(), FaceMatchError> {
        self.entries
            .write()
            .unwrap()
            .insert(photo_id.to_string(), faces.to_vec());
        Ok(())
    }
}
