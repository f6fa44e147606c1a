#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
mod face;
mod image;
mod photo;

pub use face::*;
pub use image::*;
pub use photo::*;
