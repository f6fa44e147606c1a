use crate::error::PipelineError;
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer};
use image::RgbImage;

/// Target size for `compress`: only ever shrinks, height follows the aspect ratio.
#[must_use]
pub fn scale_to_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let new_height = f64::from(height) * f64::from(max_width) / f64::from(width);
    (max_width, round_dimension(new_height))
}

/// Fits into a `max_width` x `max_height` box. Width is constrained first and the
/// result is then rechecked against the height.
#[must_use]
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let mut w = f64::from(width);
    let mut h = f64::from(height);
    let max_w = f64::from(max_width);
    let max_h = f64::from(max_height);

    if w > max_w {
        h = h * max_w / w;
        w = max_w;
    }
    if h > max_h {
        w = w * max_h / h;
        h = max_h;
    }
    (round_dimension(w), round_dimension(h))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_dimension(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Resamples to exactly `width` x `height`. Returns the input untouched if it already matches.
pub fn resize_rgb(src: RgbImage, width: u32, height: u32) -> Result<RgbImage, PipelineError> {
    let (src_w, src_h) = src.dimensions();
    if (src_w, src_h) == (width, height) {
        return Ok(src);
    }

    let src_image = Image::from_vec_u8(src_w, src_h, src.into_raw(), PixelType::U8x3)
        .map_err(|e| PipelineError::Resize(format!("source buffer: {e}")))?;
    let mut dst_image = Image::new(width, height, PixelType::U8x3);

    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, None)
        .map_err(|e| PipelineError::Resize(e.to_string()))?;

    RgbImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| PipelineError::Resize("failed to construct resized image".to_string()))
}
