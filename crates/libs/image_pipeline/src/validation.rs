use crate::error::PipelineError;
use app_state::ProcessingSettings;
use common_types::ImageUpload;

/// Checks the declared type and size of an upload. Content is not inspected.
pub fn check_upload(upload: &ImageUpload, settings: &ProcessingSettings) -> Result<(), PipelineError> {
    let mime_type = upload.mime_type.trim().to_lowercase();
    if !settings.accepted_mime_types.iter().any(|m| *m == mime_type) {
        return Err(PipelineError::UnsupportedType {
            mime_type: upload.mime_type.clone(),
            accepted: settings.accepted_mime_types.clone(),
            max_bytes: settings.max_upload_bytes,
        });
    }
    if upload.size() > settings.max_upload_bytes {
        return Err(PipelineError::TooLarge {
            size: upload.size(),
            accepted: settings.accepted_mime_types.clone(),
            max_bytes: settings.max_upload_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    fn upload(mime: &str, size: usize) -> ImageUpload {
        ImageUpload::new("photo", mime, vec![0; size])
    }

    #[test]
    fn accepts_supported_types_up_to_the_limit() {
        let settings = ProcessingSettings::default();
        for mime in ["image/jpeg", "image/jpg", "image/png", "image/webp", "IMAGE/JPEG"] {
            assert!(check_upload(&upload(mime, 1024), &settings).is_ok(), "{mime}");
        }
        assert!(check_upload(&upload("image/png", 10 * MIB), &settings).is_ok());
    }

    #[test]
    fn twelve_mib_jpeg_is_rejected() {
        let err = check_upload(&upload("image/jpeg", 12 * MIB), &ProcessingSettings::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::TooLarge { .. }));
        assert!(err.is_validation());
        assert!(err.to_string().contains("10 MiB"));
    }

    #[test]
    fn other_types_are_rejected_with_the_accepted_list() {
        let err = check_upload(&upload("image/gif", 10), &ProcessingSettings::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedType { .. }));
        assert!(
            err.to_string()
                .contains("image/jpeg, image/jpg, image/png, image/webp up to 10 MiB")
        );
    }

    #[test]
    fn messages_follow_the_configured_types() {
        let settings = ProcessingSettings {
            accepted_mime_types: vec!["image/png".to_string()],
            max_upload_bytes: 2 * MIB as u64,
            ..ProcessingSettings::default()
        };

        let err = check_upload(&upload("image/jpeg", 10), &settings).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Accepted: image/png up to 2 MiB"), "{message}");
        assert!(!message.contains("webp"), "{message}");

        let err = check_upload(&upload("image/png", 3 * MIB), &settings).unwrap_err();
        assert!(matches!(err, PipelineError::TooLarge { .. }));
        assert!(err.to_string().contains("Accepted: image/png up to 2 MiB"));
    }
}
