use crate::matcher::FaceMatcher;
use common_types::PhotoRecord;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Reported to the observer after every item of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    /// 1-based index of the item just handled.
    pub current: usize,
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub photo_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub faces_found: usize,
    pub errors: Vec<BatchFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}/{} photos failed, {} faces found",
            self.failed, self.total, self.faces_found
        )
    }
}

pub type ProgressObserver<'a> = &'a (dyn Fn(&BatchProgress) + Send + Sync);

impl FaceMatcher {
    /// Extracts and persists face descriptors for every photo, one at a time with
    /// the configured pause in between. A failing photo is recorded in the report
    /// and the batch carries on.
    #[instrument(skip_all, fields(photos = photos.len()))]
    pub async fn process_batch(
        &self,
        photos: &[PhotoRecord],
        observer: Option<ProgressObserver<'_>>,
    ) -> BatchReport {
        let mut report = BatchReport {
            total: photos.len(),
            ..BatchReport::default()
        };

        for (index, photo) in photos.iter().enumerate() {
            match self.index_photo(photo).await {
                Ok(face_count) => {
                    report.processed += 1;
                    report.faces_found += face_count;
                }
                Err(reason) => {
                    warn!("Face extraction failed for {}: {reason}", photo.id);
                    report.failed += 1;
                    report.errors.push(BatchFailure {
                        photo_id: photo.id.clone(),
                        reason,
                    });
                }
            }

            if let Some(observer) = observer {
                observer(&BatchProgress {
                    current: index + 1,
                    total: report.total,
                    processed: report.processed,
                    failed: report.failed,
                });
            }

            let is_last = index + 1 == photos.len();
            if !is_last && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        info!("Batch done: {}", report.summary());
        report
    }

    async fn index_photo(&self, photo: &PhotoRecord) -> Result<usize, String> {
        let faces = self.extract_faces(photo).await.map_err(|e| e.to_string())?;
        self.store
            .save(&photo.id, &faces)
            .await
            .map_err(|e| e.to_string())?;
        let count = faces.len();
        self.cache.insert(&photo.id, Arc::new(faces)).await;
        Ok(count)
    }
}
