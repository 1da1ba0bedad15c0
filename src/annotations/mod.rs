//! Annotation normalization.
//!
//! Every supported on-disk format is read into the same list of
//! [`BoundingBox`]es in original-image pixel space. Reading never fails:
//! unreadable or malformed input shows up as diagnostics next to whatever
//! boxes could be recovered, so one corrupt label file does not stop a
//! dataset from being browsed.

pub mod classes;
mod json;
mod voc;
mod yolo;

use std::io::ErrorKind;
use std::path::Path;

/// Label used when a source annotation carries none.
pub const NO_LABEL: &str = "No Label";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub label: String,
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn new(label: impl Into<String>, x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            label: label.into(),
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

/// Boxes recovered from one annotation file plus the warnings raised on the
/// way. An empty `boxes` with no diagnostics means the file was simply empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseOutcome {
    pub boxes: Vec<BoundingBox>,
    pub diagnostics: Vec<String>,
}

impl ParseOutcome {
    fn diagnose(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnotationFormat {
    /// `[{"annotations": [{label, coordinates: {x, y, width, height}}]}]`
    Json,
    /// Pascal-VOC style `<object><name/><bndbox/></object>`
    Voc,
    /// `class_id x_center y_center width height`, normalized
    Yolo,
}

impl AnnotationFormat {
    /// Order in which label files are looked up next to an image.
    pub const PAIRING_ORDER: [Self; 3] = [Self::Json, Self::Voc, Self::Yolo];

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "xml" => Some(Self::Voc),
            "txt" => Some(Self::Yolo),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Voc => "xml",
            Self::Yolo => "txt",
        }
    }

    /// Parse already-read file contents.
    pub fn parse(
        self,
        text: &str,
        image_width: u32,
        image_height: u32,
        class_names: Option<&[String]>,
    ) -> ParseOutcome {
        let mut out = ParseOutcome::default();
        match self {
            Self::Json => json::parse(text, &mut out),
            Self::Voc => voc::parse(text, &mut out),
            Self::Yolo => yolo::parse(text, image_width, image_height, class_names, &mut out),
        }
        out
    }
}

/// Read the annotation file at `path` into bounding boxes.
///
/// The format is picked from the file extension alone. `image_width` and
/// `image_height` are only used to denormalize YOLO coordinates.
pub fn normalize(
    path: &Path,
    image_width: u32,
    image_height: u32,
    class_names: Option<&[String]>,
) -> ParseOutcome {
    let Some(format) = AnnotationFormat::from_path(path) else {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut out = ParseOutcome::default();
        out.diagnose(format!("unsupported annotation file format: {ext:?}"));
        log::warn!("{}: {}", path.display(), out.diagnostics[0]);
        return out;
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            let mut out = ParseOutcome::default();
            if e.kind() == ErrorKind::NotFound {
                out.diagnose("annotation file not found");
            } else {
                out.diagnose(format!("cannot read annotation file: {e}"));
            }
            log::warn!("{}: {}", path.display(), out.diagnostics[0]);
            return out;
        }
    };

    let out = format.parse(&text, image_width, image_height, class_names);
    for message in &out.diagnostics {
        log::warn!("{}: {message}", path.display());
    }
    log::debug!(
        "{}: {} boxes read as {:?}",
        path.display(),
        out.boxes.len(),
        format
    );
    out
}
