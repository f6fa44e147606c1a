use crate::cache::DescriptorCache;
use crate::distance::{confidence, face_distance};
use crate::sources::{DescriptorStore, EmbeddingSource, PhotoSource};
use crate::FaceMatchError;
use app_state::FaceMatchSettings;
use chrono::Utc;
use common_types::{DetectedFace, ImageUpload, MatchRecord, PhotoFilter, PhotoRecord};
use image_pipeline::decode_image;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ranks catalogue photos by how close their faces are to a reference face.
#[derive(Clone)]
pub struct FaceMatcher {
    pub(crate) embeddings: Arc<dyn EmbeddingSource>,
    pub(crate) photos: Arc<dyn PhotoSource>,
    pub(crate) store: Arc<dyn DescriptorStore>,
    pub(crate) cache: DescriptorCache,
    pub(crate) settings: FaceMatchSettings,
}

impl FaceMatcher {
    #[must_use]
    pub fn new(
        settings: FaceMatchSettings,
        embeddings: Arc<dyn EmbeddingSource>,
        photos: Arc<dyn PhotoSource>,
        store: Arc<dyn DescriptorStore>,
    ) -> Self {
        Self {
            embeddings,
            photos,
            store,
            cache: DescriptorCache::new(&settings.cache),
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &FaceMatchSettings {
        &self.settings
    }

    #[must_use]
    pub const fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    /// Picks the face to search with. With several faces the largest bounding box
    /// wins, not the most confident detection.
    #[instrument(skip_all, fields(name = %upload.name), err(Debug))]
    pub async fn resolve_reference_embedding(
        &self,
        upload: &ImageUpload,
    ) -> Result<DetectedFace, FaceMatchError> {
        let decoded = decode_image(upload.data.clone()).await?;
        debug!("Reference image is {}x{}", decoded.width(), decoded.height());

        let faces = self.embeddings.detect_faces(upload).await?;
        if faces.len() > 1 {
            info!("{} faces in reference photo, using the largest", faces.len());
        }
        faces
            .into_iter()
            .max_by(|a, b| a.bounding_box.area().total_cmp(&b.bounding_box.area()))
            .ok_or(FaceMatchError::NoFaceDetected)
    }

    /// Faces for one photo: cache, then the persisted store, then fresh extraction
    /// (which is persisted for next time).
    pub async fn photo_faces(
        &self,
        photo: &PhotoRecord,
    ) -> Result<Arc<Vec<DetectedFace>>, FaceMatchError> {
        if let Some(faces) = self.cache.get(&photo.id).await {
            return Ok(faces);
        }

        let faces = if let Some(stored) = self.store.load(&photo.id).await? {
            stored
        } else {
            let faces = self.extract_faces(photo).await?;
            self.store.save(&photo.id, &faces).await?;
            faces
        };

        let faces = Arc::new(faces);
        self.cache.insert(&photo.id, Arc::clone(&faces)).await;
        Ok(faces)
    }

    pub(crate) async fn extract_faces(
        &self,
        photo: &PhotoRecord,
    ) -> Result<Vec<DetectedFace>, FaceMatchError> {
        let image = self.photos.load_image(photo).await?;
        self.embeddings.detect_faces(&image).await
    }

    /// Every face closer than `threshold` (default from settings) to `reference`,
    /// best first. A photo yields one record per qualifying face unless
    /// `deduplicate_per_photo` is set. Photos whose faces can't be looked up are
    /// logged and skipped.
    #[instrument(skip_all, fields(photos = photos.len()))]
    pub async fn find_matches(
        &self,
        reference: &[f32],
        photos: &[PhotoRecord],
        threshold: Option<f32>,
    ) -> Vec<MatchRecord> {
        let threshold = threshold.unwrap_or(self.settings.threshold);
        let mut matches = Vec::new();

        for photo in photos {
            let faces = match self.photo_faces(photo).await {
                Ok(faces) => faces,
                Err(e) => {
                    warn!("Skipping photo {}: {e}", photo.id);
                    continue;
                }
            };
            matches.extend(match_faces(reference, photo, &faces, threshold));
        }

        sort_by_confidence(&mut matches);
        if self.settings.deduplicate_per_photo {
            keep_best_per_photo(&mut matches);
        }
        info!(
            "{} matches across {} photos (threshold {threshold})",
            matches.len(),
            photos.len()
        );
        matches
    }

    /// Resolves the reference face and searches the photos selected by `filter`.
    #[instrument(skip_all, fields(name = %upload.name), err(Debug))]
    pub async fn search_by_face(
        &self,
        upload: &ImageUpload,
        filter: &PhotoFilter,
    ) -> Result<Vec<MatchRecord>, FaceMatchError> {
        let reference = self.resolve_reference_embedding(upload).await?;
        let photos = self.photos.list_photos(filter).await?;
        Ok(self
            .find_matches(&reference.descriptor, &photos, None)
            .await)
    }
}

fn match_faces(
    reference: &[f32],
    photo: &PhotoRecord,
    faces: &[DetectedFace],
    threshold: f32,
) -> Vec<MatchRecord> {
    faces
        .iter()
        .filter_map(|face| {
            let distance = face_distance(reference, &face.descriptor);
            (distance < threshold).then(|| MatchRecord {
                photo_id: photo.id.clone(),
                photo_url: photo.url.clone(),
                title: photo.title.clone(),
                photographer: photo.photographer.clone(),
                confidence: confidence(distance),
                distance,
                bounding_box: face.bounding_box,
                matched_at: Utc::now(),
            })
        })
        .collect()
}

fn sort_by_confidence(matches: &mut [MatchRecord]) {
    matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// Expects `matches` sorted best first.
fn keep_best_per_photo(matches: &mut Vec<MatchRecord>) {
    let mut seen = HashSet::new();
    matches.retain(|m| seen.insert(m.photo_id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryPhotos, InMemoryStore, StaticEmbeddings, face, photo, png_upload};
    use app_state::FaceMatchSettings;
    use std::collections::HashMap;

    fn matcher(
        embeddings: StaticEmbeddings,
        photos: InMemoryPhotos,
        store: InMemoryStore,
        settings: FaceMatchSettings,
    ) -> FaceMatcher {
        FaceMatcher::new(settings, Arc::new(embeddings), Arc::new(photos), Arc::new(store))
    }

    fn stored(entries: &[(&str, Vec<DetectedFace>)]) -> InMemoryStore {
        InMemoryStore::with(
            entries
                .iter()
                .map(|(id, faces)| ((*id).to_string(), faces.clone()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn only_close_faces_match() {
        let store = stored(&[
            ("a", vec![face(&[0.0, 0.0, 0.1], 10.0)]),
            ("b", vec![face(&[1.0, 1.0, 1.0], 10.0)]),
        ]);
        let m = matcher(
            StaticEmbeddings::default(),
            InMemoryPhotos::default(),
            store,
            FaceMatchSettings::default(),
        );

        let result = m
            .find_matches(&[0.0, 0.0, 0.0], &[photo("a"), photo("b")], Some(0.6))
            .await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].photo_id, "a");
        assert!((result[0].confidence - 0.9).abs() < 1e-6);
        assert!((result[0].distance - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn results_are_sorted_and_under_threshold() {
        let store = stored(&[
            ("a", vec![face(&[0.5, 0.0], 10.0)]),
            ("b", vec![face(&[0.1, 0.0], 10.0), face(&[0.3, 0.0], 5.0)]),
            ("c", vec![face(&[0.59, 0.0], 10.0), face(&[0.7, 0.0], 10.0)]),
        ]);
        let m = matcher(
            StaticEmbeddings::default(),
            InMemoryPhotos::default(),
            store,
            FaceMatchSettings::default(),
        );

        let result = m
            .find_matches(&[0.0, 0.0], &[photo("a"), photo("b"), photo("c")], None)
            .await;

        assert!(result.iter().all(|r| r.distance < 0.6));
        assert!(result.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        // b contributes two faces, c only the one strictly under the threshold.
        let ids: Vec<&str> = result.iter().map(|r| r.photo_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "b", "a", "c"]);
    }

    #[tokio::test]
    async fn deduplication_keeps_the_best_face() {
        let store = stored(&[(
            "b",
            vec![face(&[0.3, 0.0], 5.0), face(&[0.1, 0.0], 10.0)],
        )]);
        let settings = FaceMatchSettings {
            deduplicate_per_photo: true,
            ..FaceMatchSettings::default()
        };
        let m = matcher(
            StaticEmbeddings::default(),
            InMemoryPhotos::default(),
            store,
            settings,
        );

        let result = m.find_matches(&[0.0, 0.0], &[photo("b")], None).await;
        assert_eq!(result.len(), 1);
        assert!((result[0].distance - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn lookup_failures_skip_the_photo() {
        let store = stored(&[("good", vec![face(&[0.0], 1.0)])]);
        // "missing" is neither stored nor loadable from the catalogue.
        let m = matcher(
            StaticEmbeddings::default(),
            InMemoryPhotos::default(),
            store,
            FaceMatchSettings::default(),
        );

        let result = m
            .find_matches(&[0.0], &[photo("missing"), photo("good")], None)
            .await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].photo_id, "good");
    }

    #[tokio::test]
    async fn missing_descriptors_are_extracted_persisted_and_cached() {
        let photos = InMemoryPhotos::with(vec![photo("fresh")]);
        let embeddings = StaticEmbeddings::with(HashMap::from([(
            "fresh.png".to_string(),
            vec![face(&[0.2, 0.2], 8.0)],
        )]));
        let store = InMemoryStore::default();
        let m = matcher(embeddings.clone(), photos, store.clone(), FaceMatchSettings::default());

        let first = m.photo_faces(&photo("fresh")).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(store.load("fresh").await.unwrap().is_some());
        assert_eq!(embeddings.calls(), 1);

        let second = m.photo_faces(&photo("fresh")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(embeddings.calls(), 1, "second lookup should hit the cache");
    }

    #[tokio::test]
    async fn largest_face_is_the_reference() {
        let mut small = face(&[9.0, 9.0], 50.0);
        small.confidence = 0.99;
        let mut large = face(&[1.0, 1.0], 100.0);
        large.confidence = 0.6;
        let embeddings = StaticEmbeddings::with(HashMap::from([(
            "reference.png".to_string(),
            vec![small, large],
        )]));
        let m = matcher(
            embeddings,
            InMemoryPhotos::default(),
            InMemoryStore::default(),
            FaceMatchSettings::default(),
        );

        let reference = m
            .resolve_reference_embedding(&png_upload("reference.png"))
            .await
            .unwrap();
        assert_eq!(reference.descriptor, vec![1.0, 1.0]);
    }

    #[tokio::test]
    async fn no_face_is_a_hard_failure() {
        let m = matcher(
            StaticEmbeddings::default(),
            InMemoryPhotos::default(),
            InMemoryStore::default(),
            FaceMatchSettings::default(),
        );
        let err = m
            .resolve_reference_embedding(&png_upload("empty.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, FaceMatchError::NoFaceDetected));
        assert!(err.to_string().contains("clearer photo"));
    }

    #[tokio::test]
    async fn undecodable_reference_is_rejected() {
        let m = matcher(
            StaticEmbeddings::default(),
            InMemoryPhotos::default(),
            InMemoryStore::default(),
            FaceMatchSettings::default(),
        );
        let upload = ImageUpload::new("ref.jpg", "image/jpeg", b"garbage".to_vec());
        let err = m.resolve_reference_embedding(&upload).await.unwrap_err();
        assert!(matches!(err, FaceMatchError::Pipeline(_)));
    }

    #[tokio::test]
    async fn search_by_face_applies_the_filter() {
        let mut wedding = photo("w1");
        wedding.category = Some("weddings".to_string());
        let mut sports = photo("s1");
        sports.category = Some("sports".to_string());

        let embeddings = StaticEmbeddings::with(HashMap::from([(
            "me.png".to_string(),
            vec![face(&[0.0, 0.0], 40.0)],
        )]));
        let store = stored(&[
            ("w1", vec![face(&[0.05, 0.0], 10.0)]),
            ("s1", vec![face(&[0.05, 0.0], 10.0)]),
        ]);
        let m = matcher(
            embeddings,
            InMemoryPhotos::with(vec![wedding, sports]),
            store,
            FaceMatchSettings::default(),
        );

        let filter = PhotoFilter::builder()
            .categories(vec!["weddings".to_string()])
            .build();
        let result = m.search_by_face(&png_upload("me.png"), &filter).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].photo_id, "w1");
    }
}
