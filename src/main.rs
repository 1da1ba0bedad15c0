use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

mod annotations;
mod app;
mod dataset;
mod debounce;
mod error;
mod render;
mod session;
mod settings;
mod strokes;
mod viewport;

use app::{InspectApp, Startup};
use settings::Settings;

/// Visual inspection of bounding-box datasets (JSON, Pascal VOC XML, YOLO TXT).
#[derive(Parser, Debug)]
#[command(name = "bbox-inspect", version, about)]
struct Args {
    /// Image to open on start
    #[arg(value_name = "IMAGE", conflicts_with = "folder")]
    image: Option<PathBuf>,

    /// Annotation file for IMAGE; looked up next to the image by stem when omitted
    #[arg(short, long, value_name = "FILE", requires = "image")]
    labels: Option<PathBuf>,

    /// Class names for YOLO labels, one per line
    #[arg(short, long, value_name = "FILE", requires = "image")]
    classes: Option<PathBuf>,

    /// Dataset folder to browse (flat, or with images/ and labels/)
    #[arg(short, long, value_name = "DIR")]
    folder: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    fn startup(self) -> Startup {
        match (self.image, self.folder) {
            (Some(image), _) => Startup::Pair {
                image,
                labels: self.labels,
                classes: self.classes,
            },
            (None, Some(folder)) => Startup::Folder(folder),
            (None, None) => Startup::Empty,
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let settings = match args.config.as_deref() {
        Some(path) => Settings::load(path).unwrap_or_else(|err| {
            log::error!("{err}, falling back to defaults");
            Settings::default()
        }),
        None => Settings::default(),
    };
    log::debug!("settings: {settings:?}");

    let startup = args.startup();
    let title = match &startup {
        Startup::Pair { image, .. } => format!(
            "bbox-inspect: {}",
            image.file_name().unwrap_or_default().to_string_lossy()
        ),
        Startup::Folder(root) => format!("bbox-inspect: {}", root.display()),
        Startup::Empty => "bbox-inspect".to_string(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(InspectApp::new(settings, startup)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_with_labels() {
        let args = Args::try_parse_from(["bbox-inspect", "a.png", "--labels", "a.xml"]).unwrap();
        match args.startup() {
            Startup::Pair { image, labels, classes } => {
                assert_eq!(image, PathBuf::from("a.png"));
                assert_eq!(labels, Some(PathBuf::from("a.xml")));
                assert_eq!(classes, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn folder_mode() {
        let args = Args::try_parse_from(["bbox-inspect", "--folder", "data"]).unwrap();
        assert!(matches!(args.startup(), Startup::Folder(p) if p == PathBuf::from("data")));
        assert!(matches!(
            Args::try_parse_from(["bbox-inspect"]).unwrap().startup(),
            Startup::Empty
        ));
    }

    #[test]
    fn image_and_folder_conflict() {
        assert!(Args::try_parse_from(["bbox-inspect", "a.png", "--folder", "data"]).is_err());
        assert!(Args::try_parse_from(["bbox-inspect", "--labels", "a.xml"]).is_err());
    }
}
