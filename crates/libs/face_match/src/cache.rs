use app_state::DescriptorCacheSettings;
use common_types::DetectedFace;
use moka::future::Cache;
use std::sync::Arc;

/// Bounded in-memory cache of photo id -> detected faces. Entries are evicted by
/// size and expire after the configured TTL.
#[derive(Debug, Clone)]
pub struct DescriptorCache {
    inner: Cache<String, Arc<Vec<DetectedFace>>>,
}

impl DescriptorCache {
    #[must_use]
    pub fn new(settings: &DescriptorCacheSettings) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(settings.max_capacity)
                .time_to_live(settings.ttl)
                .build(),
        }
    }

    pub async fn get(&self, photo_id: &str) -> Option<Arc<Vec<DetectedFace>>> {
        self.inner.get(photo_id).await
    }

    pub async fn insert(&self, photo_id: &str, faces: Arc<Vec<DetectedFace>>) {
        self.inner.insert(photo_id.to_string(), faces).await;
    }

    pub async fn invalidate(&self, photo_id: &str) {
        self.inner.invalidate(photo_id).await;
    }

    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}
