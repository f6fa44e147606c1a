mod blend;
mod layout;
mod text;

pub use blend::blend_mask;
pub use layout::{Anchor, HorizontalAlign, TilePlan, VerticalAlign, anchor_for};
pub use text::{FontRasterizer, TextRasterizer};

use app_state::WatermarkSettings;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use std::fmt;
use std::str::FromStr;

/// Where a single (non-tiled) watermark is anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WatermarkPosition {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl WatermarkPosition {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatermarkPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "center" | "centre" => Ok(Self::Center),
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            other => Err(format!(
                "unknown watermark position '{other}', expected one of: center, top-left, top-right, bottom-left, bottom-right"
            )),
        }
    }
}

/// Per-call overrides. Anything left as `None` falls back to the configured watermark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatermarkOptions {
    pub text: Option<String>,
    pub opacity: Option<f32>,
    pub position: WatermarkPosition,
    pub color: Option<[u8; 3]>,
    pub font_size: Option<f32>,
    pub tiled: bool,
}

/// Watermark options resolved against settings and the target image.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkStyle {
    pub text: String,
    pub opacity: f32,
    pub position: WatermarkPosition,
    pub color: Rgb<u8>,
    pub font_size: f32,
    pub tiled: bool,
}

impl WatermarkStyle {
    #[must_use]
    pub fn resolve(options: &WatermarkOptions, settings: &WatermarkSettings, image_width: u32) -> Self {
        let derived_size = image_width as f32 * settings.font_scale;
        // Glyphs wider than the image can't be read anyway.
        let max_size = (image_width as f32).max(settings.min_font_size);
        let font_size = options
            .font_size
            .unwrap_or(derived_size)
            .max(settings.min_font_size)
            .min(max_size);

        Self {
            text: options.text.clone().unwrap_or_else(|| settings.text.clone()),
            opacity: options.opacity.unwrap_or(settings.opacity).clamp(0.0, 1.0),
            position: options.position,
            color: Rgb(options.color.unwrap_or(settings.color)),
            font_size,
            tiled: options.tiled,
        }
    }
}

/// Draws the watermark onto `canvas` in place.
pub fn draw_watermark(
    canvas: &mut RgbImage,
    style: &WatermarkStyle,
    settings: &WatermarkSettings,
    rasterizer: &dyn TextRasterizer,
) {
    if style.text.is_empty() || style.opacity == 0.0 {
        return;
    }
    if style.tiled {
        draw_tiled(canvas, style, settings, rasterizer);
    } else {
        draw_single(canvas, style, settings, rasterizer);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn draw_single(
    canvas: &mut RgbImage,
    style: &WatermarkStyle,
    settings: &WatermarkSettings,
    rasterizer: &dyn TextRasterizer,
) {
    let (width, height) = canvas.dimensions();
    let (text_w, text_h) = rasterizer.measure(style.font_size, &style.text);
    let (x, y) = anchor_for(style.position, width, height).text_origin(text_w, text_h);

    // Only the text box plus room for the blur is rasterized, clipped to the
    // canvas grown by the distance the shadow can reach.
    let shadow = &settings.shadow;
    let pad = (shadow.blur_px.max(0.0) * 2.0).ceil() as i32 + 1;
    let reach = pad + shadow.offset_px.abs();
    let text_w = i32::try_from(text_w).unwrap_or(i32::MAX);
    let text_h = i32::try_from(text_h).unwrap_or(i32::MAX);
    let left = x.saturating_sub(pad).max(-reach);
    let top = y.saturating_sub(pad).max(-reach);
    let right = x.saturating_add(text_w).saturating_add(pad).min(width as i32 + reach);
    let bottom = y.saturating_add(text_h).saturating_add(pad).min(height as i32 + reach);
    if right <= left || bottom <= top {
        return;
    }

    let mut mask = GrayImage::new((right - left) as u32, (bottom - top) as u32);
    rasterizer.draw(&mut mask, x.saturating_sub(left), y.saturating_sub(top), style.font_size, &style.text);
    let (mask_x, mask_y) = (left, top);

    if shadow.opacity > 0.0 {
        let shadow_mask = if shadow.blur_px > 0.0 {
            // Canvas shadow blur corresponds to a gaussian with sigma = blur / 2.
            gaussian_blur_f32(&mask, shadow.blur_px / 2.0)
        } else {
            mask.clone()
        };
        blend_mask(
            canvas,
            &shadow_mask,
            mask_x + shadow.offset_px,
            mask_y + shadow.offset_px,
            Rgb([0, 0, 0]),
            shadow.opacity * style.opacity,
        );
    }
    blend_mask(canvas, &mask, mask_x, mask_y, style.color, style.opacity);
}

#[allow(clippy::cast_possible_truncation)]
fn draw_tiled(
    canvas: &mut RgbImage,
    style: &WatermarkStyle,
    settings: &WatermarkSettings,
    rasterizer: &dyn TextRasterizer,
) {
    let (width, height) = canvas.dimensions();
    let plan = TilePlan::new(
        width,
        height,
        style.font_size,
        settings.tile.spacing_factor,
        settings.tile.angle_degrees,
    );
    let (text_w, text_h) = rasterizer.measure(style.font_size, &style.text);

    let mut layer = GrayImage::new(width, height);
    for &(cx, cy) in &plan.centers {
        let x = (cx - text_w as f32 / 2.0).round() as i32;
        let y = (cy - text_h as f32 / 2.0).round() as i32;
        rasterizer.draw(&mut layer, x, y, style.font_size, &style.text);
    }

    // `rotate_about_center` pivots on the image centre, same as the plan.
    let rotated = rotate_about_center(
        &layer,
        plan.rotation_radians(),
        Interpolation::Bilinear,
        Luma([0u8]),
    );
    blend_mask(
        canvas,
        &rotated,
        0,
        0,
        style.color,
        style.opacity * settings.tile.opacity_factor,
    );
}
