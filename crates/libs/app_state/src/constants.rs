/// Uploads larger than this are rejected before any processing.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
/// Uploads larger than this are compressed before watermarking.
pub const PRECOMPRESS_THRESHOLD_BYTES: u64 = 5 * 1024 * 1024;
pub const PRECOMPRESS_QUALITY: f32 = 0.85;

pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub const COMPRESS_QUALITY: f32 = 0.8;
pub const COMPRESS_MAX_WIDTH: u32 = 1920;

pub const THUMBNAIL_MAX_WIDTH: u32 = 300;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 300;
pub const THUMBNAIL_QUALITY: f32 = 0.8;

pub const WATERMARK_TEXT: &str = "© PhotoMarket";
pub const WATERMARK_OPACITY: f32 = 0.7;
/// Gold.
pub const WATERMARK_COLOR: [u8; 3] = [0xFF, 0xD7, 0x00];
/// Font size as a fraction of the image width.
pub const WATERMARK_FONT_SCALE: f32 = 0.05;
pub const WATERMARK_MIN_FONT_SIZE: f32 = 20.0;
pub const WATERMARK_OUTPUT_QUALITY: f32 = 0.9;

pub const SHADOW_OFFSET_PX: i32 = 2;
pub const SHADOW_BLUR_PX: f32 = 4.0;
pub const SHADOW_OPACITY: f32 = 0.5;

pub const TILE_SPACING_FACTOR: f32 = 3.0;
pub const TILE_ANGLE_DEGREES: f32 = -30.0;
pub const TILE_OPACITY_FACTOR: f32 = 0.3;

pub const MATCH_THRESHOLD: f32 = 0.6;
pub const DESCRIPTOR_CACHE_CAPACITY: u64 = 1_000;
pub const DESCRIPTOR_CACHE_TTL_SECONDS: u64 = 60 * 60;
pub const BATCH_DELAY_MS: u64 = 100;
