use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mirror of `config/settings.yaml`, before validation.
#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub processing: RawProcessingSettings,
    pub face_matching: RawFaceMatchSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawProcessingSettings {
    pub max_upload_bytes: u64,
    /// Declared MIME types an upload may carry.
    pub accepted_mime_types: Vec<String>,
    /// Uploads above this size get compressed before watermarking.
    pub precompress_threshold_bytes: u64,
    pub precompress_quality: f32,
    pub compression: CompressionSettings,
    pub thumbnails: ThumbnailSettings,
    pub watermark: RawWatermarkSettings,
}

/// Defaults for `compress` when the caller passes none.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CompressionSettings {
    /// Encoder quality in `(0, 1]`.
    pub quality: f32,
    /// Wider images are downscaled to this width.
    pub max_width: u32,
}

/// Bounding box for generated thumbnails.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ThumbnailSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawWatermarkSettings {
    pub text: String,
    pub opacity: f32,
    /// `#RRGGBB`
    pub color: String,
    /// TrueType/OpenType font used for the watermark text.
    pub font_path: Option<PathBuf>,
    /// Font size as a fraction of the image width.
    pub font_scale: f32,
    pub min_font_size: f32,
    pub output_quality: f32,
    pub shadow: ShadowSettings,
    pub tile: TileSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ShadowSettings {
    pub offset_px: i32,
    pub blur_px: f32,
    pub opacity: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TileSettings {
    /// Grid cell size as a multiple of the font size.
    pub spacing_factor: f32,
    pub angle_degrees: f32,
    /// Multiplied with the watermark opacity in tiled mode.
    pub opacity_factor: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawFaceMatchSettings {
    pub threshold: f32,
    pub deduplicate_per_photo: bool,
    pub cache: RawDescriptorCacheSettings,
    pub batch_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawDescriptorCacheSettings {
    pub max_capacity: u64,
    pub ttl_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}
