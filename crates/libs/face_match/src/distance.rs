/// Distance reported when two descriptors can't be compared.
pub const MAX_DISTANCE: f32 = 1.0;

/// Euclidean distance between two face descriptors.
///
/// Empty or differently sized descriptors are not an error: they return
/// [`MAX_DISTANCE`], which never passes a match threshold below 1.
#[must_use]
pub fn face_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return MAX_DISTANCE;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

/// Ranking score derived from a distance. Not a probability, can go negative.
#[must_use]
pub fn confidence(distance: f32) -> f32 {
    1.0 - distance
}
