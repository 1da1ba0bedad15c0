//! Box colors, label placement, and rasterizing overlays into images.

use image::{Rgba, RgbaImage};

use crate::annotations::BoundingBox;
use crate::settings::Color4;

/// Vertical distance between a label and the box top edge.
const LABEL_RAISE: i32 = 20;
/// Offset below the top edge when there is no room above.
const LABEL_DROP: i32 = 5;

/// Box color by case-insensitive label match.
pub fn box_color(label: &str) -> Color4 {
    let label = label.to_lowercase();
    if label.contains("silver marking") {
        Color4::YELLOW
    } else if label.contains("balancing weight") {
        Color4::CYAN
    } else {
        Color4::RED
    }
}

/// Image-space position of a box label: just above the top edge, or just
/// below it when the label would leave the image.
pub fn label_anchor(bbox: &BoundingBox) -> (i32, i32) {
    let above = bbox.y_min.saturating_sub(LABEL_RAISE);
    if above > 0 {
        (bbox.x_min, above)
    } else {
        (bbox.x_min, bbox.y_min.saturating_add(LABEL_DROP))
    }
}

/// Copy of `image` with every box outline drawn in.
///
/// Label text is left to the on-screen overlay.
pub fn draw_bounding_boxes(image: &RgbaImage, boxes: &[BoundingBox], outline_width: f32) -> RgbaImage {
    let mut img = image.clone();
    let width = (outline_width.round() as i32).max(1);
    for bbox in boxes {
        let color = Rgba(box_color(&bbox.label).to_rgba8());
        draw_rect_outline(&mut img, bbox, width, color);
    }
    img
}

/// Outline grows inward from the box edges. Edge runs are walked only over
/// the pixels that exist, so corners far outside the image cost nothing.
fn draw_rect_outline(img: &mut RgbaImage, bbox: &BoundingBox, width: i32, color: Rgba<u8>) {
    let (x0, x1) = (bbox.x_min.min(bbox.x_max), bbox.x_min.max(bbox.x_max));
    let (y0, y1) = (bbox.y_min.min(bbox.y_max), bbox.y_min.max(bbox.y_max));
    let last_x = i32::try_from(img.width()).unwrap_or(i32::MAX) - 1;
    let last_y = i32::try_from(img.height()).unwrap_or(i32::MAX) - 1;
    if x1 < 0 || y1 < 0 || x0 > last_x || y0 > last_y {
        return;
    }

    for inset in 0..width {
        let (l, r) = (x0.saturating_add(inset), x1.saturating_sub(inset));
        let (t, b) = (y0.saturating_add(inset), y1.saturating_sub(inset));
        if l > r || t > b {
            break;
        }
        for x in l.max(0)..=r.min(last_x) {
            put_clipped(img, x, t, color);
            put_clipped(img, x, b, color);
        }
        for y in t.max(0)..=b.min(last_y) {
            put_clipped(img, l, y, color);
            put_clipped(img, r, y, color);
        }
    }
}

fn put_clipped(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Thick line by stamping squares along the segment.
pub fn draw_line_on_image(
    img: &mut RgbaImage,
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    thickness: f32,
    color: [u8; 4],
) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len = (dx * dx + dy * dy).sqrt();
    let steps = (len * 2.0) as i32;
    let half_t = (thickness / 2.0).max(0.5) as i32;

    for i in 0..=steps {
        let t = i as f32 / steps.max(1) as f32;
        let cx = (x0 + dx * t) as i32;
        let cy = (y0 + dy * t) as i32;
        for oy in -half_t..=half_t {
            for ox in -half_t..=half_t {
                put_clipped(img, cx + ox, cy + oy, Rgba(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationFormat;

    #[test]
    fn colors_by_label() {
        assert_eq!(box_color("Silver Marking left"), Color4::YELLOW);
        assert_eq!(box_color("BALANCING WEIGHT"), Color4::CYAN);
        assert_eq!(box_color("Weight"), Color4::RED);
        assert_eq!(box_color(""), Color4::RED);
    }

    #[test]
    fn label_goes_below_near_top() {
        assert_eq!(label_anchor(&BoundingBox::new("a", 7, 50, 9, 60)), (7, 30));
        assert_eq!(label_anchor(&BoundingBox::new("a", 7, 20, 9, 60)), (7, 25));
        assert_eq!(label_anchor(&BoundingBox::new("a", 7, 3, 9, 60)), (7, 8));
    }

    #[test]
    fn drawing_leaves_source_untouched() {
        let src = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        let boxes = [BoundingBox::new("balancing weight", 2, 2, 10, 10)];
        let out = draw_bounding_boxes(&src, &boxes, 3.0);

        assert!(src.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
        assert_eq!(*out.get_pixel(2, 2), Rgba([0, 255, 255, 255]));
        assert_eq!(*out.get_pixel(4, 6), Rgba([0, 255, 255, 255]));
        // inside the 3px border
        assert_eq!(*out.get_pixel(6, 6), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn out_of_bounds_boxes_are_clipped() {
        let src = RgbaImage::new(10, 10);
        let boxes = [BoundingBox::new("x", -5, -5, 50, 50)];
        let out = draw_bounding_boxes(&src, &boxes, 3.0);
        assert_eq!(out.dimensions(), (10, 10));
    }

    #[test]
    fn saturated_coordinates_stay_in_range() {
        let json = AnnotationFormat::Json.parse(
            r#"[{"annotations":[{"label":"w","coordinates":{"x":0,"y":-3e9,"width":10,"height":10}}]}]"#,
            10,
            10,
            None,
        );
        let yolo = AnnotationFormat::Yolo.parse("0 1e12 1e12 0 0\n", 10, 10, None);
        let mut boxes = json.boxes;
        boxes.extend(yolo.boxes);
        assert_eq!(boxes[0].y_min, i32::MIN);
        assert_eq!(boxes[1].x_min, i32::MAX);

        assert_eq!(label_anchor(&boxes[0]), (0, i32::MIN + LABEL_DROP));
        assert_eq!(label_anchor(&boxes[1]), (i32::MAX, i32::MAX - LABEL_RAISE));

        // both boxes lie entirely off the image
        let src = RgbaImage::new(10, 10);
        assert_eq!(draw_bounding_boxes(&src, &boxes, 3.0), src);
    }

    #[test]
    fn full_range_box_draws_only_visible_edges() {
        let src = RgbaImage::new(10, 10);
        let boxes = [
            BoundingBox::new("x", i32::MIN, i32::MIN, i32::MAX, i32::MAX),
            BoundingBox::new("x", 4, 4, i32::MAX, i32::MAX),
        ];
        let out = draw_bounding_boxes(&src, &boxes, 3.0);
        let red = Rgba([255, 0, 0, 255]);
        assert_eq!(*out.get_pixel(4, 9), red);
        assert_eq!(*out.get_pixel(9, 4), red);
        assert_eq!(*out.get_pixel(6, 6), red);
        assert_eq!(*out.get_pixel(7, 7), Rgba([0, 0, 0, 0]));
        assert_eq!(*out.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn line_is_drawn_with_thickness() {
        let mut img = RgbaImage::new(20, 20);
        draw_line_on_image(&mut img, (2.0, 10.0), (17.0, 10.0), 2.0, [0, 0, 255, 255]);
        assert_eq!(*img.get_pixel(10, 10), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(10, 11), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(10, 15), Rgba([0, 0, 0, 0]));
    }
}
