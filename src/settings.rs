use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_egui(&self) -> egui::Color32 {
        let [r, g, b, a] = self.to_rgba8();
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r * 255.0) as u8,
            (self.g * 255.0) as u8,
            (self.b * 255.0) as u8,
            (self.a * 255.0) as u8,
        ]
    }
}

impl Default for Color4 {
    fn default() -> Self {
        Self::BLUE
    }
}

// ── Settings ────────────────────────────────────────────────────────────────

/// Tunables for rendering and interaction. Every field has a default, so a
/// config file only needs the keys it wants to change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bounding-box outline width in image pixels.
    pub box_outline_width: f32,
    pub stroke_color: Color4,
    pub stroke_width: f32,
    /// Color of the stroke currently being drawn.
    pub preview_color: Color4,
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Erase hit-test tolerance in screen pixels.
    pub erase_tolerance_px: f32,
    pub resize_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            box_outline_width: 3.0,
            stroke_color: Color4::BLUE,
            stroke_width: 2.0,
            preview_color: Color4::CYAN,
            zoom_step: 1.1,
            min_zoom: 0.01,
            max_zoom: 100.0,
            erase_tolerance_px: 5.0,
            resize_debounce_ms: 50,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&data).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}
