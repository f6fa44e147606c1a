use image::{GrayImage, Rgb, RgbImage};

/// Blends `color` into `canvas` wherever `mask` has coverage, shifted by
/// `(dx, dy)`. Effective alpha is `coverage * opacity`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn blend_mask(
    canvas: &mut RgbImage,
    mask: &GrayImage,
    dx: i32,
    dy: i32,
    color: Rgb<u8>,
    opacity: f32,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity == 0.0 {
        return;
    }
    let (width, height) = canvas.dimensions();

    for (mx, my, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        let x = mx as i32 + dx;
        let y = my as i32 + dy;
        if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
            continue;
        }
        let alpha = f32::from(coverage[0]) / 255.0 * opacity;
        let pixel = canvas.get_pixel_mut(x as u32, y as u32);
        for channel in 0..3 {
            let base = f32::from(pixel[channel]);
            let top = f32::from(color[channel]);
            pixel[channel] = (base + (top - base) * alpha).round().clamp(0.0, 255.0) as u8;
        }
    }
}
