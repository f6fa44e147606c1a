use crate::codec::{self, decode, encode_jpeg};
use crate::error::PipelineError;
use crate::resize::{fit_within, resize_rgb, scale_to_width};
use crate::validation::check_upload;
use crate::watermark::{FontRasterizer, TextRasterizer, WatermarkOptions, WatermarkStyle, draw_watermark};
use app_state::ProcessingSettings;
use common_types::{DerivedImage, ImageMetadata, ImageUpload, JPEG_MIME_TYPE, ProcessedUpload};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info, instrument};

/// Turns uploads into compressed, watermarked and thumbnail variants.
///
/// Each operation decodes, transforms and encodes on tokio's blocking pool, so
/// independent uploads can be processed concurrently from async code.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    settings: ProcessingSettings,
    /// Watermark text renderer. The bundled font is used when unset.
    rasterizer: Option<Arc<dyn TextRasterizer>>,
}

impl ImageProcessor {
    #[must_use]
    pub fn new(settings: ProcessingSettings) -> Self {
        Self {
            settings,
            rasterizer: None,
        }
    }

    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn TextRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Builds a processor, loading `watermark.font_path` if one is configured.
    pub fn from_settings(settings: ProcessingSettings) -> Result<Self, PipelineError> {
        let font_path = settings.watermark.font_path.clone();
        let processor = Self::new(settings);
        match font_path {
            Some(path) => {
                let rasterizer = FontRasterizer::from_file(&path)?;
                Ok(processor.with_rasterizer(Arc::new(rasterizer)))
            }
            None => Ok(processor),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ProcessingSettings {
        &self.settings
    }

    /// Whether the declared type and size are acceptable. Check before processing.
    #[must_use]
    pub fn validate(&self, upload: &ImageUpload) -> bool {
        self.check(upload).is_ok()
    }

    /// Same rule as [`Self::validate`], with a message that can be shown to the uploader.
    pub fn check(&self, upload: &ImageUpload) -> Result<(), PipelineError> {
        check_upload(upload, &self.settings)
    }

    #[must_use]
    pub const fn needs_precompression(&self, size: u64) -> bool {
        size > self.settings.precompress_threshold_bytes
    }

    /// Re-encodes as JPEG, downscaling to `max_width` if the source is wider.
    /// Never upsamples.
    #[instrument(skip_all, fields(name = %upload.name), err(Debug))]
    pub async fn compress(
        &self,
        upload: &ImageUpload,
        quality: Option<f32>,
        max_width: Option<u32>,
    ) -> Result<DerivedImage, PipelineError> {
        let quality = quality.unwrap_or(self.settings.compression.quality);
        if !(quality > 0.0 && quality <= 1.0) {
            return Err(PipelineError::InvalidQuality(quality));
        }
        let max_width = max_width.unwrap_or(self.settings.compression.max_width).max(1);
        let data = upload.data.clone();

        let compressed = task::spawn_blocking(move || -> Result<DerivedImage, PipelineError> {
            let rgb = decode(&data)?.into_rgb8();
            let (width, height) = scale_to_width(rgb.width(), rgb.height(), max_width);
            let resized = resize_rgb(rgb, width, height)?;
            jpeg_artifact(&resized, quality)
        })
        .await??;

        debug!(
            "Compressed {} -> {} bytes ({}x{})",
            upload.size(),
            compressed.size(),
            compressed.width,
            compressed.height
        );
        Ok(compressed)
    }

    /// Draws the watermark and re-encodes as JPEG, whatever the input format.
    #[instrument(skip_all, fields(name = %upload.name, tiled = options.tiled), err(Debug))]
    pub async fn apply_watermark(
        &self,
        upload: &ImageUpload,
        options: &WatermarkOptions,
    ) -> Result<DerivedImage, PipelineError> {
        let data = upload.data.clone();
        let options = options.clone();
        let settings = self.settings.watermark.clone();
        let rasterizer: Arc<dyn TextRasterizer> = match &self.rasterizer {
            Some(rasterizer) => Arc::clone(rasterizer),
            None => Arc::new(FontRasterizer::bundled()?),
        };

        task::spawn_blocking(move || -> Result<DerivedImage, PipelineError> {
            let mut canvas = decode(&data)?.into_rgb8();
            let style = WatermarkStyle::resolve(&options, &settings, canvas.width());
            draw_watermark(&mut canvas, &style, &settings, rasterizer.as_ref());
            jpeg_artifact(&canvas, settings.output_quality)
        })
        .await?
    }

    /// Scales down to fit the thumbnail box, keeping the aspect ratio.
    #[instrument(skip_all, fields(name = %upload.name), err(Debug))]
    pub async fn create_thumbnail(
        &self,
        upload: &ImageUpload,
        max_width: Option<u32>,
        max_height: Option<u32>,
    ) -> Result<DerivedImage, PipelineError> {
        let thumbs = &self.settings.thumbnails;
        let max_width = max_width.unwrap_or(thumbs.max_width).max(1);
        let max_height = max_height.unwrap_or(thumbs.max_height).max(1);
        let quality = thumbs.quality;
        let data = upload.data.clone();

        task::spawn_blocking(move || -> Result<DerivedImage, PipelineError> {
            let rgb = decode(&data)?.into_rgb8();
            let (width, height) = fit_within(rgb.width(), rgb.height(), max_width, max_height);
            let resized = resize_rgb(rgb, width, height)?;
            jpeg_artifact(&resized, quality)
        })
        .await?
    }

    /// Reads the dimensions from the image header and combines them with the declared attributes.
    pub async fn extract_metadata(&self, upload: &ImageUpload) -> Result<ImageMetadata, PipelineError> {
        let data = upload.data.clone();
        let (width, height) = task::spawn_blocking(move || codec::dimensions(&data)).await??;

        Ok(ImageMetadata {
            width,
            height,
            aspect_ratio: f64::from(width) / f64::from(height),
            size: upload.size(),
            name: upload.name.clone(),
            mime_type: upload.mime_type.clone(),
            last_modified: upload.last_modified,
        })
    }

    /// Validates, optionally pre-compresses, watermarks and thumbnails one upload.
    /// Either every artifact is returned or the first error.
    #[instrument(skip_all, fields(name = %upload.name, size = upload.size()), err(Debug))]
    pub async fn process_upload(
        &self,
        upload: &ImageUpload,
        options: &WatermarkOptions,
    ) -> Result<ProcessedUpload, PipelineError> {
        self.check(upload)?;

        let variants = async {
            let compressed = self.needs_precompression(upload.size());
            let image = if compressed {
                info!(
                    "Upload is {} bytes, compressing before watermarking",
                    upload.size()
                );
                self.compress(upload, Some(self.settings.precompress_quality), None)
                    .await?
            } else {
                self.passthrough(upload).await?
            };

            let watermarked = self.apply_watermark(&image.to_upload(upload), options).await?;
            // Thumbnails come from the watermarked image so they are protected too.
            let thumbnail = self
                .create_thumbnail(&watermarked.to_upload(upload), None, None)
                .await?;
            Ok::<_, PipelineError>((image, compressed, watermarked, thumbnail))
        };

        let ((image, compressed, watermarked, thumbnail), metadata) =
            tokio::try_join!(variants, self.extract_metadata(upload))?;

        info!(
            "Processed {} ({}x{}), compressed: {compressed}",
            upload.name, metadata.width, metadata.height
        );
        Ok(ProcessedUpload {
            image,
            compressed,
            watermarked,
            thumbnail,
            metadata,
        })
    }

    async fn passthrough(&self, upload: &ImageUpload) -> Result<DerivedImage, PipelineError> {
        let metadata = self.extract_metadata(upload).await?;
        Ok(DerivedImage {
            data: upload.data.clone(),
            mime_type: upload.mime_type.clone(),
            width: metadata.width,
            height: metadata.height,
        })
    }
}

fn jpeg_artifact(image: &image::RgbImage, quality: f32) -> Result<DerivedImage, PipelineError> {
    Ok(DerivedImage {
        data: encode_jpeg(image, quality)?,
        mime_type: JPEG_MIME_TYPE.to_string(),
        width: image.width(),
        height: image.height(),
    })
}
