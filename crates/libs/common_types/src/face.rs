use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// A face as returned by the embedding source. The descriptor is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub descriptor: Vec<f32>,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub landmarks: Vec<(f32, f32)>,
    pub confidence: f32,
}

/// A photo containing a face close to the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub photo_id: String,
    pub photo_url: String,
    pub title: String,
    pub photographer: Option<String>,
    /// `1 - distance`. A ranking score, can be negative for far-off faces.
    pub confidence: f32,
    pub distance: f32,
    pub bounding_box: BoundingBox,
    pub matched_at: DateTime<Utc>,
}
