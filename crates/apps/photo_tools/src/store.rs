use async_trait::async_trait;
use common_types::DetectedFace;
use face_match::{DescriptorStore, FaceMatchError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Face descriptors per photo id, persisted as a single JSON file. The whole file
/// is rewritten on every save.
#[derive(Debug)]
pub struct JsonDescriptorStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Vec<DetectedFace>>>,
}

impl JsonDescriptorStore {
    /// Opens the store at `path`, starting empty if the file doesn't exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, FaceMatchError> {
        let path = path.into();
        let entries = if fs::try_exists(&path).await? {
            serde_json::from_slice(&fs::read(&path).await?)?
        } else {
            BTreeMap::new()
        };
        debug!("Descriptor store {} holds {} photos", path.display(), entries.len());
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn photo_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl DescriptorStore for JsonDescriptorStore {
    async fn load(&self, photo_id: &str) -> Result<Option<Vec<DetectedFace>>, FaceMatchError> {
        Ok(self.entries.read().await.get(photo_id).cloned())
    }

    async fn save(&self, photo_id: &str, faces: &[DetectedFace]) -> Result<(), FaceMatchError> {
        // Held across the write so concurrent saves can't interleave on disk.
        let mut entries = self.entries.write().await;
        let mut updated = entries.clone();
        updated.insert(photo_id.to_string(), faces.to_vec());
        let json = serde_json::to_vec_pretty(&updated)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        // Only what reached the disk is visible to `load`.
        *entries = updated;
        Ok(())
    }
}
