use crate::{
    ACCEPTED_MIME_TYPES, BATCH_DELAY_MS, COMPRESS_MAX_WIDTH, COMPRESS_QUALITY,
    CompressionSettings, DESCRIPTOR_CACHE_CAPACITY, DESCRIPTOR_CACHE_TTL_SECONDS, LoggingSettings,
    MATCH_THRESHOLD, MAX_UPLOAD_BYTES, PRECOMPRESS_QUALITY, PRECOMPRESS_THRESHOLD_BYTES,
    RawFaceMatchSettings, RawProcessingSettings, RawSettings, RawWatermarkSettings,
    SHADOW_BLUR_PX, SHADOW_OFFSET_PX, SHADOW_OPACITY, ShadowSettings, THUMBNAIL_MAX_HEIGHT,
    THUMBNAIL_MAX_WIDTH, THUMBNAIL_QUALITY, TILE_ANGLE_DEGREES, TILE_OPACITY_FACTOR,
    TILE_SPACING_FACTOR, ThumbnailSettings, TileSettings, WATERMARK_COLOR, WATERMARK_FONT_SCALE,
    WATERMARK_MIN_FONT_SIZE, WATERMARK_OPACITY, WATERMARK_OUTPUT_QUALITY, WATERMARK_TEXT,
    ensure_unit_interval, ensure_unit_quality, parse_hex_color,
};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub processing: ProcessingSettings,
    pub face_matching: FaceMatchSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingSettings {
    pub max_upload_bytes: u64,
    pub accepted_mime_types: Vec<String>,
    pub precompress_threshold_bytes: u64,
    pub precompress_quality: f32,
    pub compression: CompressionSettings,
    pub thumbnails: ThumbnailSettings,
    pub watermark: WatermarkSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSettings {
    pub text: String,
    pub opacity: f32,
    pub color: [u8; 3],
    pub font_path: Option<PathBuf>,
    pub font_scale: f32,
    pub min_font_size: f32,
    pub output_quality: f32,
    pub shadow: ShadowSettings,
    pub tile: TileSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatchSettings {
    /// Faces closer than this distance to the reference count as a match.
    pub threshold: f32,
    /// Keep only the best face per photo instead of one entry per qualifying face.
    pub deduplicate_per_photo: bool,
    pub cache: DescriptorCacheSettings,
    /// Pause between items of a batch run.
    pub batch_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorCacheSettings {
    pub max_capacity: u64,
    pub ttl: Duration,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            accepted_mime_types: ACCEPTED_MIME_TYPES.iter().map(ToString::to_string).collect(),
            precompress_threshold_bytes: PRECOMPRESS_THRESHOLD_BYTES,
            precompress_quality: PRECOMPRESS_QUALITY,
            compression: CompressionSettings {
                quality: COMPRESS_QUALITY,
                max_width: COMPRESS_MAX_WIDTH,
            },
            thumbnails: ThumbnailSettings {
                max_width: THUMBNAIL_MAX_WIDTH,
                max_height: THUMBNAIL_MAX_HEIGHT,
                quality: THUMBNAIL_QUALITY,
            },
            watermark: WatermarkSettings::default(),
        }
    }
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            text: WATERMARK_TEXT.to_string(),
            opacity: WATERMARK_OPACITY,
            color: WATERMARK_COLOR,
            font_path: None,
            font_scale: WATERMARK_FONT_SCALE,
            min_font_size: WATERMARK_MIN_FONT_SIZE,
            output_quality: WATERMARK_OUTPUT_QUALITY,
            shadow: ShadowSettings {
                offset_px: SHADOW_OFFSET_PX,
                blur_px: SHADOW_BLUR_PX,
                opacity: SHADOW_OPACITY,
            },
            tile: TileSettings {
                spacing_factor: TILE_SPACING_FACTOR,
                angle_degrees: TILE_ANGLE_DEGREES,
                opacity_factor: TILE_OPACITY_FACTOR,
            },
        }
    }
}

impl Default for FaceMatchSettings {
    fn default() -> Self {
        Self {
            threshold: MATCH_THRESHOLD,
            deduplicate_per_photo: false,
            cache: DescriptorCacheSettings {
                max_capacity: DESCRIPTOR_CACHE_CAPACITY,
                ttl: Duration::from_secs(DESCRIPTOR_CACHE_TTL_SECONDS),
            },
            batch_delay: Duration::from_millis(BATCH_DELAY_MS),
        }
    }
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self> {
        Ok(Self {
            processing: raw.processing.try_into()?,
            face_matching: raw.face_matching.try_into()?,
            logging: raw.logging,
        })
    }
}

impl TryFrom<RawProcessingSettings> for ProcessingSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawProcessingSettings) -> Result<Self> {
        if raw.accepted_mime_types.is_empty() {
            return Err(eyre!("processing.accepted_mime_types cannot be empty"));
        }
        if raw.compression.max_width == 0 {
            return Err(eyre!("processing.compression.max_width must be positive"));
        }
        if raw.thumbnails.max_width == 0 || raw.thumbnails.max_height == 0 {
            return Err(eyre!("processing.thumbnails bounds must be positive"));
        }
        ensure_unit_quality("processing.precompress_quality", raw.precompress_quality)?;
        ensure_unit_quality("processing.compression.quality", raw.compression.quality)?;
        ensure_unit_quality("processing.thumbnails.quality", raw.thumbnails.quality)?;

        Ok(Self {
            max_upload_bytes: raw.max_upload_bytes,
            accepted_mime_types: raw
                .accepted_mime_types
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            precompress_threshold_bytes: raw.precompress_threshold_bytes,
            precompress_quality: raw.precompress_quality,
            compression: raw.compression,
            thumbnails: raw.thumbnails,
            watermark: raw.watermark.try_into()?,
        })
    }
}

impl TryFrom<RawWatermarkSettings> for WatermarkSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawWatermarkSettings) -> Result<Self> {
        ensure_unit_interval("processing.watermark.opacity", raw.opacity)?;
        ensure_unit_interval("processing.watermark.shadow.opacity", raw.shadow.opacity)?;
        ensure_unit_interval(
            "processing.watermark.tile.opacity_factor",
            raw.tile.opacity_factor,
        )?;
        ensure_unit_quality("processing.watermark.output_quality", raw.output_quality)?;
        if raw.tile.spacing_factor <= 0.0 {
            return Err(eyre!("processing.watermark.tile.spacing_factor must be positive"));
        }

        Ok(Self {
            text: raw.text,
            opacity: raw.opacity,
            color: parse_hex_color(&raw.color)?,
            font_path: raw.font_path,
            font_scale: raw.font_scale,
            min_font_size: raw.min_font_size,
            output_quality: raw.output_quality,
            shadow: raw.shadow,
            tile: raw.tile,
        })
    }
}

impl TryFrom<RawFaceMatchSettings> for FaceMatchSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawFaceMatchSettings) -> Result<Self> {
        if raw.cache.max_capacity == 0 {
            return Err(eyre!("face_matching.cache.max_capacity must be positive"));
        }
        Ok(Self {
            threshold: raw.threshold,
            deduplicate_per_photo: raw.deduplicate_per_photo,
            cache: DescriptorCacheSettings {
                max_capacity: raw.cache.max_capacity,
                ttl: Duration::from_secs(raw.cache.ttl_seconds),
            },
            batch_delay: Duration::from_millis(raw.batch_delay_ms),
        })
    }
}
