//! Pure geometry for watermark placement. Nothing in here touches pixels.

use super::WatermarkPosition;

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

const CORNER_INSET: f32 = 0.1;

/// Anchor point for a single watermark. Corners sit at 10%/90% of each axis and
/// align the text away from the edge so it stays inside the corner region.
#[must_use]
pub fn anchor_for(position: WatermarkPosition, width: u32, height: u32) -> Anchor {
    let (w, h) = (width as f32, height as f32);
    let near = CORNER_INSET;
    let far = 1.0 - CORNER_INSET;

    let (x, y, horizontal, vertical) = match position {
        WatermarkPosition::Center => (
            w / 2.0,
            h / 2.0,
            HorizontalAlign::Center,
            VerticalAlign::Middle,
        ),
        WatermarkPosition::TopLeft => (
            w * near,
            h * near,
            HorizontalAlign::Left,
            VerticalAlign::Top,
        ),
        WatermarkPosition::TopRight => (
            w * far,
            h * near,
            HorizontalAlign::Right,
            VerticalAlign::Top,
        ),
        WatermarkPosition::BottomLeft => (
            w * near,
            h * far,
            HorizontalAlign::Left,
            VerticalAlign::Bottom,
        ),
        WatermarkPosition::BottomRight => (
            w * far,
            h * far,
            HorizontalAlign::Right,
            VerticalAlign::Bottom,
        ),
    };
    Anchor {
        x,
        y,
        horizontal,
        vertical,
    }
}

impl Anchor {
    /// Top-left corner of a `text_width` x `text_height` box aligned on this anchor.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn text_origin(&self, text_width: u32, text_height: u32) -> (i32, i32) {
        let (tw, th) = (text_width as f32, text_height as f32);
        let x = match self.horizontal {
            HorizontalAlign::Left => self.x,
            HorizontalAlign::Center => self.x - tw / 2.0,
            HorizontalAlign::Right => self.x - tw,
        };
        let y = match self.vertical {
            VerticalAlign::Top => self.y,
            VerticalAlign::Middle => self.y - th / 2.0,
            VerticalAlign::Bottom => self.y - th,
        };
        (x.round() as i32, y.round() as i32)
    }
}

/// Grid of repeated watermark texts, drawn unrotated and then turned as a whole
/// by `rotation_degrees` around the image centre.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlan {
    pub spacing: f32,
    pub rows: u32,
    pub columns: u32,
    pub rotation_degrees: f32,
    /// Centres of every tile, row by row.
    pub centers: Vec<(f32, f32)>,
}

impl TilePlan {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn new(
        width: u32,
        height: u32,
        font_size: f32,
        spacing_factor: f32,
        rotation_degrees: f32,
    ) -> Self {
        let spacing = (font_size * spacing_factor).max(1.0);
        let (w, h) = (width as f32, height as f32);
        let rows = (h / spacing).ceil() as u32;
        let columns = (w / spacing).ceil() as u32;

        let mut centers = Vec::with_capacity((rows * columns) as usize);
        for row in 0..rows {
            // Odd rows shift by half a cell so the pattern doesn't read as a rigid grid.
            let offset = if row % 2 == 1 { spacing / 2.0 } else { 0.0 };
            for column in 0..columns {
                centers.push((column as f32 * spacing + offset, row as f32 * spacing));
            }
        }

        Self {
            spacing,
            rows,
            columns,
            rotation_degrees,
            centers,
        }
    }

    #[must_use]
    pub fn rotation_radians(&self) -> f32 {
        self.rotation_degrees.to_radians()
    }
}
