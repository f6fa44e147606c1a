use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// An uploaded image as received from the client, before any processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub name: String,
    /// MIME type as declared by the uploader, not sniffed.
    pub mime_type: String,
    pub data: Vec<u8>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ImageUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
            last_modified: None,
        }
    }

    #[must_use]
    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// An encoded artifact produced from an upload. The source is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl DerivedImage {
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Wraps this artifact as a new upload so it can be fed to the next pipeline step.
    #[must_use]
    pub fn to_upload(&self, source: &ImageUpload) -> ImageUpload {
        ImageUpload {
            name: source.name.clone(),
            mime_type: self.mime_type.clone(),
            data: self.data.clone(),
            last_modified: source.last_modified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub size: u64,
    pub name: String,
    pub mime_type: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Everything `process_upload` produces for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedUpload {
    /// The compressed image, or the untouched original when it was small enough.
    pub image: DerivedImage,
    pub compressed: bool,
    pub watermarked: DerivedImage,
    pub thumbnail: DerivedImage,
    /// Metadata of the original upload.
    pub metadata: ImageMetadata,
}
