use crate::error::PipelineError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, RgbImage};
use std::io::Cursor;
use tokio::task;

/// Decodes raw bytes into pixels, sniffing the actual format from the payload.
pub fn decode(data: &[u8]) -> Result<DynamicImage, PipelineError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode(e.into()))?
        .decode()
        .map_err(PipelineError::Decode)
}

/// Reads only as much of the header as needed to learn the dimensions.
pub fn dimensions(data: &[u8]) -> Result<(u32, u32), PipelineError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode(e.into()))?
        .into_dimensions()
        .map_err(PipelineError::Decode)
}

/// Encodes as baseline JPEG. `quality` follows the `(0, 1]` convention.
pub fn encode_jpeg(image: &RgbImage, quality: f32) -> Result<Vec<u8>, PipelineError> {
    let quality = jpeg_quality(quality)?;
    let mut buffer = Vec::new();
    image
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
        .map_err(|e| PipelineError::Encode(e.to_string()))?;

    if buffer.is_empty() {
        return Err(PipelineError::Encode("encoder produced no output".to_string()));
    }
    Ok(buffer)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality(quality: f32) -> Result<u8, PipelineError> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(PipelineError::InvalidQuality(quality));
    }
    Ok((quality * 100.0).round().clamp(1.0, 100.0) as u8)
}

/// Decodes on the blocking pool so the async caller only suspends.
pub async fn decode_image(data: Vec<u8>) -> Result<DynamicImage, PipelineError> {
    task::spawn_blocking(move || decode(&data)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 120, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn reads_dimensions_without_full_decode() {
        assert_eq!(dimensions(&png_bytes(37, 21)).unwrap(), (37, 21));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn jpeg_roundtrip_keeps_size() {
        let img = RgbImage::from_pixel(64, 48, Rgb([200, 30, 30]));
        let encoded = encode_jpeg(&img, 0.9).unwrap();
        assert_eq!(&encoded[..2], &[0xFF, 0xD8]);
        assert_eq!(dimensions(&encoded).unwrap(), (64, 48));
    }

    #[test]
    fn quality_is_mapped_to_percent() {
        assert_eq!(jpeg_quality(0.8).unwrap(), 80);
        assert_eq!(jpeg_quality(1.0).unwrap(), 100);
        assert!(matches!(jpeg_quality(0.0), Err(PipelineError::InvalidQuality(_))));
        assert!(jpeg_quality(1.5).is_err());
    }
}
