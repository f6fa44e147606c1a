#![deny(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! # Image Pipeline
//!
//! Turns one uploaded photo into the variants a storefront needs to show it
//! without giving the original away.
//!
//! ## Features
//!
//! - **Validation**: declared MIME type against the configured list (JPEG, PNG and
//!   WebP by default) and size limit, checked
//!   before any decoding.
//! - **Compression**: JPEG re-encoding with an optional width cap. Never upsamples.
//! - **Watermarking**: a single text anchored at the centre or one of four corners
//!   with a drop shadow, or a faint tiled pattern rotated about the image centre.
//! - **Thumbnails**: aspect-preserving downscale into a bounding box, taken from
//!   the watermarked image.
//! - **Metadata**: dimensions and aspect ratio read from the image header.
//!
//! ## Entry Points
//!
//! - `ImageProcessor::process_upload`: validate, pre-compress large files, watermark,
//!   thumbnail and collect metadata in one call.
//! - The individual `ImageProcessor` operations for callers that need a single variant.

mod codec;
mod error;
mod processor;
mod resize;
mod validation;
pub mod watermark;

pub use codec::{decode_image, dimensions};
pub use error::PipelineError;
pub use processor::ImageProcessor;
pub use resize::{fit_within, scale_to_width};
pub use validation::check_upload;
pub use watermark::{FontRasterizer, TextRasterizer, WatermarkOptions, WatermarkPosition};
