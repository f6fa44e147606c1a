use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use std::path::Path;
use tracing::debug;

pub const SETTINGS_PATH: &str = "config/settings.yaml";

/// Loads `config/settings.yaml`, layered with `APP__*` environment overrides.
pub fn load_app_settings() -> Result<AppSettings> {
    load_app_settings_from(Path::new(SETTINGS_PATH))
}

pub fn load_app_settings_from(config_path: &Path) -> Result<AppSettings> {
    // Need to load from dotenv so its values can overwrite the yaml file.
    dotenv::from_path(".env").ok();
    let config_path = config_path.canonicalize()?;
    debug!("Loading settings from {}", config_path.display());

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    AppSettings::try_from(raw_settings)
}
