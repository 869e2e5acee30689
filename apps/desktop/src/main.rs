mod config;
mod sources;

use anyhow::{Context, Result};
use app_settings::AppSettings;
use config::ConfigStore;
use core_types::{OutputSpec, SourceSize, Strategy};
use engine::CollageEngine;
use futures::executor::block_on;
use image::RgbImage;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use sources::CancellationFlag;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const USAGE: &str = "Usage: collagemill <width> <height> [grid|horizontal|vertical]";
const SCAN_TIMEOUT: Duration = Duration::from_secs(30);

fn main() {
    if let Err(err) = run() {
        let message = format!("{err:#}");
        eprintln!("{message}");
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title("Error")
            .set_description(message)
            .show();
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(output) = parse_output_spec(&args) else {
        eprintln!("{USAGE}");
        if args.len() < 2 {
            warn_dialog(
                "Missing dimensions",
                "Both output dimensions (width and height) are required.",
            );
        } else {
            warn_dialog(
                "Invalid dimensions",
                "Output width and height must be whole numbers no larger than 4294967295.",
            );
        }
        return Ok(());
    };

    let mut settings = AppSettings::load().unwrap_or_default();
    let store = ConfigStore::load().unwrap_or_else(|err| {
        warn!("Falling back to default config: {}", err);
        ConfigStore::new_default()
    });

    let strategy = match args.get(2) {
        Some(tag) => layout::parse_strategy(tag)?,
        None => {
            let Some(choice) = prompt_for_strategy(store.last_strategy()) else {
                return Ok(()); // dialog dismissed, nothing to do
            };
            choice
        }
    };

    let paths = gather_sources()?;
    if paths.is_empty() {
        warn_dialog("No images", "Add at least one image before composing a collage.");
        return Ok(());
    }

    let engine = CollageEngine::new();
    let mut images: Vec<RgbImage> = Vec::with_capacity(paths.len());
    for path in &paths {
        let image = engine
            .open_image(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        images.push(image);
    }

    let sizes: Vec<SourceSize> = images
        .iter()
        .map(|image| {
            let (width, height) = image.dimensions();
            SourceSize { width, height }
        })
        .collect();

    let plan = layout::plan(&sizes, strategy)?;
    debug!(
        "Planned a {} collage: {} images on a {}x{} canvas",
        strategy.as_str(),
        sizes.len(),
        plan.canvas_width,
        plan.canvas_height
    );

    let collage = engine.compose(&images, &plan, &output)?;

    let Some(chosen) = prompt_for_save_path(&settings) else {
        return Ok(()); // save canceled, nothing is written
    };
    let destination = ensure_png_extension(chosen);

    engine
        .save_png(&collage, &destination)
        .with_context(|| format!("failed to save {}", destination.display()))?;

    settings.remember_output(&destination);
    let _ = settings.save();

    let _ = store.set_last_strategy(strategy);
    let _ = store.record_composed(&destination, &chrono::Utc::now().to_rfc3339());
    if let Ok(cfg) = store.record_output(&destination) {
        debug!("{} recent outputs tracked", cfg.recent_outputs.len());
    }

    MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title("Success")
        .set_description(format!("Collage saved to {}", destination.display()))
        .show();

    Ok(())
}

fn parse_output_spec(args: &[String]) -> Option<OutputSpec> {
    if args.len() < 2 {
        return None;
    }
    let target_width = args[0].parse().ok()?;
    let target_height = args[1].parse().ok()?;
    Some(OutputSpec {
        target_width,
        target_height,
    })
}

fn prompt_for_strategy(last: Option<Strategy>) -> Option<Strategy> {
    let description = match last {
        Some(strategy) => format!(
            "Choose how the images should be arranged (last used: {}).",
            strategy.as_str()
        ),
        None => "Choose how the images should be arranged.".to_string(),
    };

    let choice = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title("Collage layout")
        .set_description(description)
        .set_buttons(MessageButtons::YesNoCancelCustom(
            "Grid".to_string(),
            "Horizontal".to_string(),
            "Vertical".to_string(),
        ))
        .show();

    match choice {
        MessageDialogResult::Custom(label) => layout::parse_strategy(&label).ok(),
        _ => None,
    }
}

/// Collect source paths through repeated multi-pick dialogs, falling back to
/// a recursive folder scan when nothing was picked.
fn gather_sources() -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    loop {
        let picked = FileDialog::new()
            .set_title("Add images")
            .add_filter("Images", sources::SUPPORTED_EXTENSIONS)
            .pick_files();

        let Some(mut batch) = picked else { break };
        if batch.is_empty() {
            break;
        }

        let added = batch.len();
        paths.append(&mut batch);

        let again = MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title("Images added")
            .set_description(format!("{added} images added. Add more?"))
            .set_buttons(MessageButtons::YesNo)
            .show();
        if !matches!(again, MessageDialogResult::Yes) {
            break;
        }
    }

    if paths.is_empty() {
        let scan = MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title("No images selected")
            .set_description("Scan a folder for images instead?")
            .set_buttons(MessageButtons::YesNo)
            .show();
        if matches!(scan, MessageDialogResult::Yes) {
            if let Some(dir) = FileDialog::new().set_title("Scan folder").pick_folder() {
                paths = scan_folder(&dir)?;
                if paths.is_empty() {
                    warn!("No images found under {}", dir.display());
                }
            }
        }
    }

    Ok(paths)
}

fn scan_folder(dir: &Path) -> Result<Vec<PathBuf>> {
    // The walk is bounded; a scan canceled mid-way keeps what it found.
    let cancel = CancellationFlag::default();
    let deadline = cancel.clone();
    std::thread::spawn(move || {
        std::thread::sleep(SCAN_TIMEOUT);
        deadline.cancel();
    });

    block_on(sources::scan_directory(dir, Some(&cancel)))
        .with_context(|| format!("failed to scan {}", dir.display()))
}

fn prompt_for_save_path(settings: &AppSettings) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Save collage")
        .add_filter("PNG Files", &["png"])
        .set_file_name(settings.suggested_file_name());
    if let Some(dir) = settings.get_last_output_dir() {
        dialog = dialog.set_directory(dir);
    }
    dialog.save_file()
}

fn ensure_png_extension(path: PathBuf) -> PathBuf {
    match path.extension() {
        Some(_) => path,
        None => path.with_extension("png"),
    }
}

fn warn_dialog(title: &str, message: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(message)
        .show();
}
