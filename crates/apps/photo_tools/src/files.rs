use chrono::{DateTime, Utc};
use color_eyre::eyre::{Result, WrapErr};
use common_types::ImageUpload;
use serde::Serialize;
use std::path::Path;
use tokio::fs;

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

pub async fn read_upload(path: &Path) -> Result<ImageUpload> {
    let data = fs::read(path)
        .await
        .wrap_err_with(|| format!("Cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mut upload = ImageUpload::new(name, guess_mime(path), data);

    if let Ok(modified) = fs::metadata(path).await.and_then(|m| m.modified()) {
        upload = upload.with_last_modified(DateTime::<Utc>::from(modified));
    }
    Ok(upload)
}

pub async fn write_bytes(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, data)
        .await
        .wrap_err_with(|| format!("Cannot write {}", path.display()))
}

pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_bytes(path, &serde_json::to_vec_pretty(value)?).await
}
