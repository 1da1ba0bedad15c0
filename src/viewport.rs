//! Mapping between original-image pixels and on-screen canvas pixels.
//!
//! Screen position of an image point is `image * zoom + offset - scroll`.
//! `offset` centers the scaled image on an axis where it is smaller than the
//! viewport; `scroll` is the pan position on an axis where it is larger.

use crate::settings::Settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    zoom: f32,
    offset: (f32, f32),
    scroll: (f32, f32),
    image_size: (f32, f32),
    viewport_size: (f32, f32),
    zoom_step: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Viewport {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            zoom: 1.0,
            offset: (0.0, 0.0),
            scroll: (0.0, 0.0),
            image_size: (0.0, 0.0),
            viewport_size: (0.0, 0.0),
            zoom_step: settings.zoom_step,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[cfg(test)]
    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    #[cfg(test)]
    pub fn scroll(&self) -> (f32, f32) {
        self.scroll
    }

    /// Size of the image after zooming, in screen pixels.
    pub fn scaled_size(&self) -> (f32, f32) {
        (self.image_size.0 * self.zoom, self.image_size.1 * self.zoom)
    }

    /// Show a new image, fitted to the current viewport.
    pub fn set_image_size(&mut self, size: (u32, u32)) {
        self.image_size = (size.0 as f32, size.1 as f32);
        self.scroll = (0.0, 0.0);
        self.fit();
    }

    /// Apply a new viewport size and refit the image.
    pub fn resize(&mut self, viewport_size: (f32, f32)) {
        self.viewport_size = viewport_size;
        self.fit();
    }

    /// Pick the largest zoom that shows the whole image, within the zoom
    /// limits. Keeps the current zoom while either size is degenerate.
    pub fn fit(&mut self) -> f32 {
        if let Some(zoom) = fit_to_viewport(self.image_size, self.viewport_size) {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
        self.relayout();
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.relayout();
    }

    pub fn to_image_space(&self, (sx, sy): (f32, f32)) -> (f32, f32) {
        (
            (sx + self.scroll.0 - self.offset.0) / self.zoom,
            (sy + self.scroll.1 - self.offset.1) / self.zoom,
        )
    }

    pub fn to_screen_space(&self, (ix, iy): (f32, f32)) -> (f32, f32) {
        (
            ix * self.zoom + self.offset.0 - self.scroll.0,
            iy * self.zoom + self.offset.1 - self.scroll.1,
        )
    }

    /// Zoom one step around `pointer` (screen space), keeping the image point
    /// under it in place as far as scroll limits allow.
    pub fn zoom_at(&mut self, pointer: (f32, f32), direction: ZoomDirection) {
        let anchor = self.to_image_space(pointer);
        let zoom = match direction {
            ZoomDirection::In => self.zoom * self.zoom_step,
            ZoomDirection::Out => self.zoom / self.zoom_step,
        };
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.relayout();

        self.scroll = (
            anchor.0 * self.zoom + self.offset.0 - pointer.0,
            anchor.1 * self.zoom + self.offset.1 - pointer.1,
        );
        self.clamp_scroll();
    }

    /// Drag the content by `delta` screen pixels.
    pub fn pan_by(&mut self, delta: (f32, f32)) {
        self.scroll.0 -= delta.0;
        self.scroll.1 -= delta.1;
        self.clamp_scroll();
    }

    /// Screen-pixel `tolerance` expressed in image pixels at the current zoom.
    pub fn image_tolerance(&self, tolerance: f32) -> f32 {
        tolerance / self.zoom
    }

    fn relayout(&mut self) {
        let (w, h) = self.scaled_size();
        self.offset = (
            ((self.viewport_size.0 - w) / 2.0).max(0.0),
            ((self.viewport_size.1 - h) / 2.0).max(0.0),
        );
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let (w, h) = self.scaled_size();
        let max_x = (w - self.viewport_size.0).max(0.0);
        let max_y = (h - self.viewport_size.1).max(0.0);
        self.scroll = (self.scroll.0.clamp(0.0, max_x), self.scroll.1.clamp(0.0, max_y));
    }
}

/// `min(vw / iw, vh / ih)`, or `None` when either size is degenerate.
pub fn fit_to_viewport(image_size: (f32, f32), viewport_size: (f32, f32)) -> Option<f32> {
    let (iw, ih) = image_size;
    let (vw, vh) = viewport_size;
    if vw <= 1.0 || vh <= 1.0 || iw <= 0.0 || ih <= 0.0 {
        return None;
    }
    Some((vw / iw).min(vh / ih))
}
