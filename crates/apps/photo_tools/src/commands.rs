use crate::CatalogueArgs;
use crate::files::{read_upload, write_bytes, write_json};
use crate::sources::{DetectionsFileSource, DirectoryPhotoSource};
use crate::store::JsonDescriptorStore;
use app_state::AppSettings;
use color_eyre::Result;
use common_types::PhotoFilter;
use face_match::{BatchProgress, FaceMatcher, PhotoSource};
use image_pipeline::{ImageProcessor, WatermarkOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn process(
    settings: AppSettings,
    input: &Path,
    out_dir: &Path,
    options: WatermarkOptions,
) -> Result<()> {
    let processor = ImageProcessor::from_settings(settings.processing)?;
    let upload = read_upload(input).await?;
    let processed = processor.process_upload(&upload, &options).await?;

    let image_name = if processed.compressed {
        "compressed.jpg".to_string()
    } else {
        original_file_name(&upload.name)
    };
    write_bytes(&out_dir.join(&image_name), &processed.image.data).await?;
    write_bytes(&out_dir.join("watermarked.jpg"), &processed.watermarked.data).await?;
    write_bytes(&out_dir.join("thumbnail.jpg"), &processed.thumbnail.data).await?;
    write_json(&out_dir.join("metadata.json"), &processed.metadata).await?;

    info!(
        "Wrote {image_name} ({} bytes), watermarked.jpg ({}x{}), thumbnail.jpg ({}x{}) to {}",
        processed.image.size(),
        processed.watermarked.width,
        processed.watermarked.height,
        processed.thumbnail.width,
        processed.thumbnail.height,
        out_dir.display()
    );
    Ok(())
}

/// Fixed name for an upload written back unchanged, so it can't collide with the
/// other outputs. Keeps the extension of `name`.
fn original_file_name(name: &str) -> String {
    match Path::new(name).extension() {
        Some(extension) => format!("original.{}", extension.to_string_lossy().to_lowercase()),
        None => "original".to_string(),
    }
}

pub async fn thumbnail(
    settings: AppSettings,
    input: &Path,
    out: &Path,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> Result<()> {
    let processor = ImageProcessor::new(settings.processing);
    let upload = read_upload(input).await?;
    processor.check(&upload)?;

    let thumbnail = processor
        .create_thumbnail(&upload, max_width, max_height)
        .await?;
    write_bytes(out, &thumbnail.data).await?;
    info!(
        "Thumbnail {}x{} written to {}",
        thumbnail.width,
        thumbnail.height,
        out.display()
    );
    Ok(())
}

pub async fn metadata(settings: AppSettings, input: &Path) -> Result<()> {
    let processor = ImageProcessor::new(settings.processing);
    let upload = read_upload(input).await?;
    let metadata = processor.extract_metadata(&upload).await?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

async fn open_matcher(settings: AppSettings, catalogue: &CatalogueArgs) -> Result<FaceMatcher> {
    let photos = DirectoryPhotoSource::new(&catalogue.photos).with_photographer(catalogue.credit.clone());
    let embeddings = DetectionsFileSource::open(&catalogue.detections).await?;
    let store = JsonDescriptorStore::open(&catalogue.store).await?;
    info!(
        "Using descriptor store {} ({} photos indexed)",
        store.path().display(),
        store.photo_count().await
    );

    Ok(FaceMatcher::new(
        settings.face_matching,
        Arc::new(embeddings),
        Arc::new(photos),
        Arc::new(store),
    ))
}

pub async fn index(
    settings: AppSettings,
    catalogue: &CatalogueArgs,
    limit: Option<usize>,
) -> Result<()> {
    let photos = DirectoryPhotoSource::new(&catalogue.photos)
        .with_photographer(catalogue.credit.clone())
        .list_photos(&PhotoFilter::builder().maybe_limit(limit).build())
        .await?;
    let matcher = open_matcher(settings, catalogue).await?;

    let observer = |progress: &BatchProgress| {
        info!(
            "[{}/{}] processed {}, failed {}",
            progress.current, progress.total, progress.processed, progress.failed
        );
    };
    let report = matcher.process_batch(&photos, Some(&observer)).await;

    info!("{}", report.summary());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn search(
    mut settings: AppSettings,
    reference: &Path,
    catalogue: &CatalogueArgs,
    threshold: Option<f32>,
    filter: &PhotoFilter,
) -> Result<()> {
    if let Some(threshold) = threshold {
        settings.face_matching.threshold = threshold;
    }
    let matcher = open_matcher(settings, catalogue).await?;
    let upload = read_upload(reference).await?;

    let matches = matcher.search_by_face(&upload, filter).await?;
    info!("{} matching faces", matches.len());
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}
