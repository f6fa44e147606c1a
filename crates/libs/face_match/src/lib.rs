#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Face search over a photo catalogue.
//!
//! Faces are compared by the Euclidean distance between their descriptors.
//! Descriptor extraction, the catalogue and descriptor persistence are external
//! collaborators behind the traits in [`sources`].

mod batch;
mod cache;
mod distance;
mod error;
mod matcher;
pub mod sources;
#[cfg(test)]
mod testing;

pub use batch::{BatchFailure, BatchProgress, BatchReport, ProgressObserver};
pub use cache::DescriptorCache;
pub use distance::{MAX_DISTANCE, confidence, face_distance};
pub use error::FaceMatchError;
pub use matcher::FaceMatcher;
pub use sources::{DescriptorStore, EmbeddingSource, PhotoSource};
