//! State of one viewing session: the image on screen, its parsed boxes, the
//! user's strokes, the view transform and the active tool.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::annotations::classes::load_class_names;
use crate::annotations::{normalize, BoundingBox, ParseOutcome};
use crate::dataset::{parse_position, Dataset};
use crate::error::{Error, Result};
use crate::render::draw_bounding_boxes;
use crate::settings::Settings;
use crate::strokes::StrokeLayer;
use crate::viewport::{Viewport, ZoomDirection};

// ── Tool / Interaction State ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionMode {
    Pan,
    Draw,
    Erase,
}

impl InteractionMode {
    pub const ALL: [Self; 3] = [Self::Pan, Self::Draw, Self::Erase];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pan => "Pan",
            Self::Draw => "Draw",
            Self::Erase => "Erase",
        }
    }
}

pub struct LoadedImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
    /// Bumped on every load so the UI knows to re-upload its texture.
    pub revision: u64,
}

// ── Session ─────────────────────────────────────────────────────────────────

pub struct Session {
    settings: Settings,
    image: Option<LoadedImage>,
    annotations: ParseOutcome,
    strokes: StrokeLayer,
    viewport: Viewport,
    mode: InteractionMode,
    dataset: Option<Dataset>,
    bake_boxes: bool,
    status: String,
    revision: u64,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            viewport: Viewport::from_settings(&settings),
            settings,
            image: None,
            annotations: ParseOutcome::default(),
            strokes: StrokeLayer::default(),
            mode: InteractionMode::Pan,
            dataset: None,
            bake_boxes: false,
            status: "Ready".to_string(),
            revision: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.annotations.boxes
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.annotations.diagnostics
    }

    pub fn strokes(&self) -> &StrokeLayer {
        &self.strokes
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn bake_boxes(&self) -> bool {
        self.bake_boxes
    }

    pub fn set_bake_boxes(&mut self, bake: bool) {
        self.bake_boxes = bake;
    }

    /// Show a failed operation in the status line. State is left as it was.
    pub fn report(&mut self, err: &Error) {
        log::error!("{err}");
        self.status = format!("Error: {err}");
    }

    // ── Loading ─────────────────────────────────────────────────────────────

    /// Load an image with its annotation file. Both must exist; the label
    /// content itself may be broken, which only produces diagnostics.
    pub fn load_pair(&mut self, image: &Path, labels: &Path, classes: Option<&Path>) -> Result<()> {
        let class_names = classes.map(load_class_names);
        self.load_with_names(image, labels, class_names.as_deref())?;
        self.status = format!("Successfully processed {}", file_name(image));
        Ok(())
    }

    fn load_with_names(&mut self, image: &Path, labels: &Path, class_names: Option<&[String]>) -> Result<()> {
        std::fs::metadata(labels).map_err(|e| Error::io(labels, e))?;
        std::fs::metadata(image).map_err(|e| Error::io(image, e))?;
        let pixels = image::open(image)
            .map_err(|source| Error::Image {
                path: image.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let annotations = normalize(labels, pixels.width(), pixels.height(), class_names);
        log::info!(
            "loaded {} ({}x{}) with {} boxes",
            image.display(),
            pixels.width(),
            pixels.height(),
            annotations.boxes.len()
        );

        self.viewport.set_image_size(pixels.dimensions());
        self.revision += 1;
        self.image = Some(LoadedImage {
            path: image.to_path_buf(),
            pixels,
            revision: self.revision,
        });
        self.annotations = annotations;
        self.strokes.clear();
        Ok(())
    }

    /// Scan a dataset folder and show its first pair. If that pair cannot be
    /// loaded the previous folder, if any, stays open.
    pub fn open_folder(&mut self, root: &Path) -> Result<()> {
        let dataset = Dataset::scan(root)?;
        let previous = self.dataset.replace(dataset);
        if let Err(err) = self.show_item(0) {
            self.dataset = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Load dataset item `index`, then make it current. A failed load keeps
    /// the old position along with the old image.
    fn show_item(&mut self, index: usize) -> Result<()> {
        let Some(dataset) = self.dataset.as_ref() else {
            return Ok(());
        };
        let item = dataset.item(index)?.clone();
        let names = dataset.class_names().to_vec();

        self.load_with_names(&item.image, &item.labels, Some(names.as_slice()))?;
        let position = self.dataset.as_mut().map(|dataset| {
            dataset.set_current(index);
            dataset.position_label()
        });
        self.status = format!(
            "Viewing {} ({})",
            file_name(&item.image),
            position.unwrap_or_default()
        );
        Ok(())
    }

    pub fn next_item(&mut self) -> Result<()> {
        match self.dataset.as_ref().and_then(Dataset::next_index) {
            Some(index) => self.show_item(index),
            None => Ok(()),
        }
    }

    pub fn previous_item(&mut self) -> Result<()> {
        match self.dataset.as_ref().and_then(Dataset::previous_index) {
            Some(index) => self.show_item(index),
            None => Ok(()),
        }
    }

    /// Jump to a 1-based position typed by the user.
    pub fn go_to_position(&mut self, text: &str) -> Result<()> {
        let Some(current) = self.dataset.as_ref().map(Dataset::current_index) else {
            return Ok(());
        };
        let index = parse_position(text)?;
        if index == current {
            return Ok(());
        }
        self.show_item(index)
    }

    // ── Interaction ─────────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.strokes.finish();
        self.mode = mode;
        self.status = format!("Mode: {} Tool - Use Ctrl+Scroll for Zoom", mode.label());
    }

    pub fn resize_viewport(&mut self, size: (f32, f32)) {
        self.viewport.resize(size);
    }

    pub fn zoom_at(&mut self, pointer: (f32, f32), direction: ZoomDirection) {
        if self.image.is_none() {
            return;
        }
        self.viewport.zoom_at(pointer, direction);
        self.status = format!("Zoom: {:.2}x", self.viewport.zoom());
    }

    pub fn pan_by(&mut self, delta: (f32, f32)) {
        self.viewport.pan_by(delta);
    }

    pub fn fit_to_window(&mut self) {
        let zoom = self.viewport.fit();
        self.status = format!("Zoom: {zoom:.2}x");
    }

    pub fn actual_size(&mut self) {
        self.viewport.set_zoom(1.0);
        self.status = format!("Zoom: {:.2}x", self.viewport.zoom());
    }

    pub fn pointer_pressed(&mut self, screen: (f32, f32)) {
        if self.image.is_none() {
            return;
        }
        let point = self.viewport.to_image_space(screen);
        match self.mode {
            InteractionMode::Pan => {}
            InteractionMode::Draw => {
                self.strokes
                    .begin(point, self.settings.stroke_color, self.settings.stroke_width)
            }
            InteractionMode::Erase => self.erase_at(point),
        }
    }

    pub fn pointer_dragged(&mut self, screen: (f32, f32), delta: (f32, f32)) {
        if self.image.is_none() {
            return;
        }
        match self.mode {
            InteractionMode::Pan => self.viewport.pan_by(delta),
            InteractionMode::Draw => self.strokes.extend(self.viewport.to_image_space(screen)),
            InteractionMode::Erase => self.erase_at(self.viewport.to_image_space(screen)),
        }
    }

    pub fn pointer_released(&mut self) {
        if self.mode == InteractionMode::Draw {
            self.strokes.finish();
        }
    }

    fn erase_at(&mut self, point: (f32, f32)) {
        let tolerance = self.viewport.image_tolerance(self.settings.erase_tolerance_px);
        let removed = self.strokes.erase_near(point, tolerance);
        if removed > 0 {
            log::debug!("erased {removed} strokes near {point:?}");
        }
    }

    // ── Saving ──────────────────────────────────────────────────────────────

    /// Write the image with all strokes burned in, and the parsed boxes too
    /// when `bake_boxes` is set. JPEG for `.jpg`/`.jpeg`, PNG otherwise.
    pub fn save_to(&mut self, path: &Path) -> Result<PathBuf> {
        let loaded = self.image.as_ref().ok_or(Error::NoImageLoaded)?;
        let mut img = if self.bake_boxes {
            draw_bounding_boxes(&loaded.pixels, &self.annotations.boxes, self.settings.box_outline_width)
        } else {
            loaded.pixels.clone()
        };
        self.strokes.burn_into(&mut img);

        let path = output_path(path);
        let save_err = |source| Error::Save {
            path: path.clone(),
            source,
        };
        if is_jpeg(&path) {
            DynamicImage::ImageRgba8(img)
                .to_rgb8()
                .save_with_format(&path, ImageFormat::Jpeg)
                .map_err(save_err)?;
        } else {
            img.save_with_format(&path, ImageFormat::Png).map_err(save_err)?;
        }

        log::info!("saved {}", path.display());
        self.status = format!("Image saved to {}", file_name(&path));
        Ok(path)
    }
}

fn output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("png")
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
