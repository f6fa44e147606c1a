use app_state::{SETTINGS_PATH, load_app_settings_from, parse_hex_color};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use image_pipeline::{WatermarkOptions, WatermarkPosition};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;
mod files;
mod sources;
mod store;

#[derive(Parser, Debug)]
#[command(version, about = "Watermark, thumbnail and face-search photos", long_about = None)]
struct Args {
    /// Settings file. Values can be overridden with `APP__SECTION__KEY` variables.
    #[clap(long, global = true, default_value = SETTINGS_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an upload and write its watermarked image, thumbnail and metadata.
    Process {
        input: PathBuf,
        #[clap(long)]
        out_dir: PathBuf,
        #[command(flatten)]
        watermark: WatermarkArgs,
    },
    /// Write a JPEG thumbnail that fits the given (or configured) box.
    Thumbnail {
        input: PathBuf,
        #[clap(long)]
        out: PathBuf,
        #[clap(long)]
        max_width: Option<u32>,
        #[clap(long)]
        max_height: Option<u32>,
    },
    /// Print dimensions, size and type of an image as JSON.
    Metadata { input: PathBuf },
    /// Extract and store face descriptors for every photo in the catalogue.
    Index {
        #[command(flatten)]
        catalogue: CatalogueArgs,
        #[clap(long)]
        limit: Option<usize>,
    },
    /// Find catalogue photos containing the face in `reference`.
    Search {
        reference: PathBuf,
        #[command(flatten)]
        catalogue: CatalogueArgs,
        /// Maximum face distance, defaults to `face_matching.threshold`.
        #[clap(long)]
        threshold: Option<f32>,
        #[clap(long)]
        photographer: Vec<String>,
        #[clap(long)]
        category: Vec<String>,
        #[clap(long)]
        limit: Option<usize>,
    },
}

#[derive(clap::Args, Debug)]
struct WatermarkArgs {
    #[clap(long)]
    text: Option<String>,
    #[clap(long, default_value_t = WatermarkPosition::Center)]
    position: WatermarkPosition,
    /// Repeat the text over the whole image instead of placing it once.
    #[clap(long, default_value_t = false, action)]
    tiled: bool,
    #[clap(long)]
    opacity: Option<f32>,
    /// `#RRGGBB`
    #[clap(long, value_parser = parse_color)]
    color: Option<[u8; 3]>,
    #[clap(long)]
    font_size: Option<f32>,
}

#[derive(clap::Args, Debug)]
struct CatalogueArgs {
    /// Folder of photos. Sub-folder names are used as categories.
    #[clap(long)]
    photos: PathBuf,
    /// JSON object of file name -> detected faces, produced by the face model.
    #[clap(long)]
    detections: PathBuf,
    /// JSON file the extracted descriptors are persisted in.
    #[clap(long)]
    store: PathBuf,
    /// Photographer credited for every photo in the folder.
    #[clap(long)]
    credit: Option<String>,
}

impl From<WatermarkArgs> for WatermarkOptions {
    fn from(args: WatermarkArgs) -> Self {
        Self {
            text: args.text,
            opacity: args.opacity,
            position: args.position,
            color: args.color,
            font_size: args.font_size,
            tiled: args.tiled,
        }
    }
}

fn parse_color(value: &str) -> Result<[u8; 3], String> {
    parse_hex_color(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let settings = load_app_settings_from(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Process {
            input,
            out_dir,
            watermark,
        } => commands::process(settings, &input, &out_dir, watermark.into()).await,
        Command::Thumbnail {
            input,
            out,
            max_width,
            max_height,
        } => commands::thumbnail(settings, &input, &out, max_width, max_height).await,
        Command::Metadata { input } => commands::metadata(settings, &input).await,
        Command::Index { catalogue, limit } => commands::index(settings, &catalogue, limit).await,
        Command::Search {
            reference,
            catalogue,
            threshold,
            photographer,
            category,
            limit,
        } => {
            let filter = common_types::PhotoFilter::builder()
                .photographers(photographer)
                .categories(category)
                .maybe_limit(limit)
                .build();
            commands::search(settings, &reference, &catalogue, threshold, &filter).await
        }
    }
}
