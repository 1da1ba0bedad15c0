use image::RgbaImage;

use crate::render::draw_line_on_image;
use crate::settings::Color4;

/// A freehand polyline in image-pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct FreehandStroke {
    pub points: Vec<(f32, f32)>,
    pub color: Color4,
    pub width: f32,
}

impl FreehandStroke {
    /// True when some point lies within `tolerance` of `target` on both axes.
    pub fn is_near(&self, target: (f32, f32), tolerance: f32) -> bool {
        self.points.iter().any(|&(x, y)| {
            (x - target.0).abs() < tolerance && (y - target.1).abs() < tolerance
        })
    }

    fn burn_into(&self, img: &mut RgbaImage) {
        let color = self.color.to_rgba8();
        match self.points.as_slice() {
            [] => {}
            [only] => draw_line_on_image(img, *only, *only, self.width, color),
            points => {
                for pair in points.windows(2) {
                    draw_line_on_image(img, pair[0], pair[1], self.width, color);
                }
            }
        }
    }
}

/// User strokes for the image on screen, plus the one being drawn.
#[derive(Clone, Debug, Default)]
pub struct StrokeLayer {
    strokes: Vec<FreehandStroke>,
    active: Option<FreehandStroke>,
}

impl StrokeLayer {
    pub fn strokes(&self) -> &[FreehandStroke] {
        &self.strokes
    }

    pub fn active(&self) -> Option<&FreehandStroke> {
        self.active.as_ref()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn begin(&mut self, point: (f32, f32), color: Color4, width: f32) {
        self.active = Some(FreehandStroke {
            points: vec![point],
            color,
            width,
        });
    }

    pub fn extend(&mut self, point: (f32, f32)) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.points.push(point);
        }
    }

    /// Commit the stroke in progress.
    pub fn finish(&mut self) -> bool {
        match self.active.take() {
            Some(stroke) => {
                log::debug!("stroke committed with {} points", stroke.points.len());
                self.strokes.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Remove every committed stroke touching `point`; returns how many went.
    pub fn erase_near(&mut self, point: (f32, f32), tolerance: f32) -> usize {
        let before = self.strokes.len();
        self.strokes.retain(|stroke| !stroke.is_near(point, tolerance));
        before - self.strokes.len()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active = None;
    }

    pub fn burn_into(&self, img: &mut RgbaImage) {
        for stroke in &self.strokes {
            stroke.burn_into(img);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn layer_with(points: Vec<Vec<(f32, f32)>>) -> StrokeLayer {
        let mut layer = StrokeLayer::default();
        for stroke in &points {
            layer.begin(stroke[0], Color4::BLUE, 2.0);
            for &p in &stroke[1..] {
                layer.extend(p);
            }
            assert!(layer.finish());
        }
        layer
    }

    #[test]
    fn drawing_builds_a_stroke() {
        let mut layer = StrokeLayer::default();
        layer.extend((1.0, 1.0));
        assert!(!layer.finish());

        layer.begin((1.0, 2.0), Color4::BLUE, 2.0);
        layer.extend((3.0, 4.0));
        assert_eq!(layer.active().unwrap().points.len(), 2);
        assert!(layer.strokes().is_empty());
        layer.finish();
        assert_eq!(layer.strokes()[0].points, vec![(1.0, 2.0), (3.0, 4.0)]);
        assert!(layer.active().is_none());
    }

    #[test]
    fn erase_uses_per_axis_tolerance() {
        // 5 screen px at zoom 2 is 2.5 image px
        let tolerance = 5.0 / 2.0;
        let mut layer = layer_with(vec![
            vec![(10.0, 10.0), (52.0, 51.0)],
            vec![(53.0, 50.0)],
            vec![(50.0, 47.4), (90.0, 90.0)],
            vec![(47.6, 52.4)],
        ]);
        assert_eq!(layer.erase_near((50.0, 50.0), tolerance), 2);
        let left: Vec<_> = layer.strokes().iter().map(|s| s.points[0]).collect();
        assert_eq!(left, vec![(53.0, 50.0), (50.0, 47.4)]);
    }

    #[test]
    fn erase_boundary_is_exclusive() {
        let mut layer = layer_with(vec![vec![(52.5, 50.0)]]);
        assert_eq!(layer.erase_near((50.0, 50.0), 2.5), 0);
    }

    #[test]
    fn burn_draws_all_strokes() {
        let layer = layer_with(vec![vec![(1.0, 1.0), (8.0, 1.0)], vec![(5.0, 8.0)]]);
        let mut img = RgbaImage::new(10, 10);
        layer.burn_into(&mut img);
        let blue = Rgba([0, 0, 255, 255]);
        assert_eq!(*img.get_pixel(4, 1), blue);
        assert_eq!(*img.get_pixel(5, 8), blue);
        assert_eq!(*img.get_pixel(5, 5), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn clear_drops_everything() {
        let mut layer = layer_with(vec![vec![(1.0, 1.0)]]);
        layer.begin((2.0, 2.0), Color4::BLUE, 2.0);
        layer.clear();
        assert!(layer.is_empty());
        assert!(layer.active().is_none());
    }
}
