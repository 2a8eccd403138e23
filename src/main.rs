// src/main.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Settings, DEFAULT_TIMEOUT_SECS};
use crate::error::AppError;
use crate::render::export::{export_json, write_export};
use crate::render::plan::classify;
use crate::render::text::render_text;
use crate::transport::connector::ImageProcessor;
use crate::transport::webhook::WebhookClient;
use crate::upload::image::UploadedImage;

mod config;
mod error;
mod gui;
mod render;
mod session;
mod transport;
mod upload;

#[derive(Parser)]
#[command(name = "taskshot")]
#[command(about = "Upload task images to a processing webhook and browse the results", long_about = None)]
struct Cli {
    /// Webhook endpoint that processes uploaded images
    #[arg(long, env = "WEBHOOK_URL", global = true)]
    webhook_url: Option<String>,

    /// Show the diagnostic panel in the GUI
    #[arg(long, env = "DEBUG_MODE", global = true)]
    debug: bool,

    /// Seconds to wait for the webhook before giving up
    #[arg(long, env = "WEBHOOK_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run graphical user interface (default)
    Gui,
    /// Process a single image without the GUI
    Process {
        /// PNG or JPEG image to upload
        image: PathBuf,

        /// Save the result as JSON
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print the raw JSON result instead of the rendered view
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration and exit
    Check,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or("RUST_LOG", "info")
    );

    let cli = Cli::parse();

    let settings = match Settings::load(cli.webhook_url, cli.debug, cli.timeout_secs) {
        Ok(settings) => settings,
        Err(e) => {
            if e.is_fatal() {
                error!("Cannot start without a valid configuration: {}", e);
            }
            return Err(e.into());
        }
    };

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => {
            let processor: Arc<dyn ImageProcessor> = Arc::new(WebhookClient::from_settings(&settings)?);
            gui::run_gui(settings, processor)
        }
        Commands::Process { image, save, json } => {
            let client = WebhookClient::from_settings(&settings)?;
            if let Err(e) = run_process(&client, &image, save.as_deref(), json) {
                error!("Processing failed [{}]: {}", e.category(), e);
                println!("✗ {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Check => {
            println!("✓ Webhook URL: {}", settings.endpoint_preview());
            println!("✓ Timeout: {}s", settings.timeout.as_secs());
            Ok(())
        }
    }
}

fn run_process(
    processor: &dyn ImageProcessor,
    image_path: &Path,
    save: Option<&Path>,
    raw_json: bool,
) -> Result<(), AppError> {
    info!("Starting headless processing of {}", image_path.display());

    let image = UploadedImage::from_path(image_path)?;
    let dimensions = match image.decode() {
        Ok(preview) => Some((preview.width, preview.height)),
        Err(e) => {
            warn!("{}; sending it anyway", e);
            None
        }
    };
    for caption in image.captions(dimensions) {
        info!("{}", caption);
    }

    let value = processor.submit(&image)?;
    println!("✓ Image processed successfully!");

    if raw_json {
        println!("{}", export_json(&value));
    } else {
        let plan = classify(&value);
        info!("Rendering result as {}", plan.kind());
        print!("{}", render_text(&plan));
    }

    if let Some(path) = save {
        write_export(&value, path)?;
        println!("✓ Result saved to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct FixedProcessor {
        outcome: Result<Value, AppError>,
        calls: Mutex<usize>,
    }

    impl ImageProcessor for FixedProcessor {
        fn submit(&self, _image: &UploadedImage) -> Result<Value, AppError> {
            *self.calls.lock().unwrap() += 1;
            self.outcome.clone()
        }
    }

    fn write_png(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("taskshot-main-{}-{}", std::process::id(), name));
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn cli_parses_process_command() {
        let cli = Cli::try_parse_from([
            "taskshot",
            "--webhook-url",
            "https://example.com/hook",
            "process",
            "scan.png",
            "--save",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.webhook_url.as_deref(), Some("https://example.com/hook"));
        assert_eq!(cli.timeout_secs, DEFAULT_TIMEOUT_SECS);
        match cli.command {
            Some(Commands::Process { image, save, json }) => {
                assert_eq!(image, PathBuf::from("scan.png"));
                assert_eq!(save, Some(PathBuf::from("out.json")));
                assert!(!json);
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn process_submits_once_and_saves_export() {
        let image_path = write_png("in.png");
        let out_path = image_path.with_extension("json");
        let processor = FixedProcessor {
            outcome: Ok(json!({"tasks": [{"title": "Lesen"}]})),
            calls: Mutex::new(0),
        };

        run_process(&processor, &image_path, Some(&out_path), false).unwrap();
        assert_eq!(*processor.calls.lock().unwrap(), 1);
        assert_eq!(
            std::fs::read_to_string(&out_path).unwrap(),
            "{\n  \"tasks\": [\n    {\n      \"title\": \"Lesen\"\n    }\n  ]\n}"
        );

        std::fs::remove_file(&image_path).ok();
        std::fs::remove_file(&out_path).ok();
    }

    #[test]
    fn process_surfaces_transport_error() {
        let image_path = write_png("fail.png");
        let processor = FixedProcessor { outcome: Err(AppError::Timeout), calls: Mutex::new(0) };

        let err = run_process(&processor, &image_path, None, false).unwrap_err();
        assert_eq!(err, AppError::Timeout);
        std::fs::remove_file(&image_path).ok();
    }

    #[test]
    fn undecodable_image_is_still_submitted_once() {
        let path = std::env::temp_dir().join(format!("taskshot-main-{}-broken.png", std::process::id()));
        std::fs::write(&path, b"not a png").unwrap();
        let processor = FixedProcessor { outcome: Ok(json!(1)), calls: Mutex::new(0) };

        run_process(&processor, &path, None, false).unwrap();
        assert_eq!(*processor.calls.lock().unwrap(), 1);
        std::fs::remove_file(&path).ok();
    }
}
