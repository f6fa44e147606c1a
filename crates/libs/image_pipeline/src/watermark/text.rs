use crate::error::PipelineError;
use ab_glyph::{FontArc, PxScale};
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fmt::Debug;
use std::path::Path;

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Turns a string into glyph coverage. Coverage is drawn as `Luma(255)` on a
/// mask so colour, opacity and shadow can be applied afterwards.
pub trait TextRasterizer: Send + Sync + Debug {
    /// Pixel width and height of `text` at `font_size`.
    fn measure(&self, font_size: f32, text: &str) -> (u32, u32);

    /// Draws `text` with its top-left corner at `(x, y)`. Out-of-bounds parts are clipped.
    fn draw(&self, mask: &mut GrayImage, x: i32, y: i32, font_size: f32, text: &str);
}

/// Rasterizes with a TrueType/OpenType font.
#[derive(Clone)]
pub struct FontRasterizer {
    font: FontArc,
}

impl Debug for FontRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRasterizer").finish_non_exhaustive()
    }
}

impl FontRasterizer {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, PipelineError> {
        let font = FontArc::try_from_vec(data).map_err(|e| PipelineError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// DejaVu Sans Bold, compiled into the crate. Used when no font file is configured.
    pub fn bundled() -> Result<Self, PipelineError> {
        let font = FontArc::try_from_slice(BUNDLED_FONT).map_err(|e| PipelineError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let data = std::fs::read(path)
            .map_err(|e| PipelineError::Font(format!("{}: {e}", path.display())))?;
        Self::from_bytes(data)
    }
}

impl TextRasterizer for FontRasterizer {
    fn measure(&self, font_size: f32, text: &str) -> (u32, u32) {
        text_size(PxScale::from(font_size), &self.font, text)
    }

    fn draw(&self, mask: &mut GrayImage, x: i32, y: i32, font_size: f32, text: &str) {
        draw_text_mut(
            mask,
            Luma([255u8]),
            x,
            y,
            PxScale::from(font_size),
            &self.font,
            text,
        );
    }
}
