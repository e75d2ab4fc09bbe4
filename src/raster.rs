use egui::{Color32, ColorImage, Pos2};
use image::{Rgba, RgbaImage};

use crate::coords::ViewportSize;
use crate::geometry::{calculate_bounds, distance_to_segment};

/// The rasterized representation of one shape at a given viewport size.
///
/// The pixel buffer only covers the shape's bounding box (clipped to the
/// viewport); `origin` places it on the canvas.
#[derive(Clone)]
pub struct RenderedLayer {
    /// Absolute, pixel-truncated path the layer was drawn from
    pub path: Vec<Pos2>,
    pub viewport: ViewportSize,
    pub origin: [u32; 2],
    pub image: RgbaImage,
    /// Bumped on every rasterization, used as texture cache key
    pub version: u64,
}

impl std::fmt::Debug for RenderedLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedLayer")
            .field("path", &self.path)
            .field("viewport", &self.viewport)
            .field("origin", &self.origin)
            .field("size", &self.image.dimensions())
            .field("version", &self.version)
            .finish()
    }
}

impl RenderedLayer {
    /// A layer without pixels, e.g. for a zero-sized viewport
    pub fn empty(path: Vec<Pos2>, viewport: ViewportSize, version: u64) -> Self {
        Self {
            path,
            viewport,
            origin: [0, 0],
            image: RgbaImage::new(0, 0),
            version,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Canvas-space rectangle covered by the pixel buffer
    pub fn rect(&self) -> egui::Rect {
        let min = Pos2::new(self.origin[0] as f32, self.origin[1] as f32);
        egui::Rect::from_min_size(
            min,
            egui::vec2(self.image.width() as f32, self.image.height() as f32),
        )
    }

    /// Alpha of the pixel at canvas position (`x`, `y`), 0 outside the buffer
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        let (Some(lx), Some(ly)) = (x.checked_sub(self.origin[0]), y.checked_sub(self.origin[1])) else {
            return 0;
        };
        self.image.get_pixel_checked(lx, ly).map_or(0, |p| p.0[3])
    }

    pub fn to_color_image(&self) -> ColorImage {
        let size = [self.image.width() as usize, self.image.height() as usize];
        ColorImage::from_rgba_unmultiplied(size, self.image.as_raw())
    }
}

/// The "draw a shape into a layer" capability the engine consumes
pub trait Rasterizer {
    fn rasterize(&mut self, path: &[Pos2], color: Color32, stroke_width: u32, viewport: ViewportSize) -> RenderedLayer;
}

/// Draws anti-aliased strokes into an RGBA buffer on the CPU
#[derive(Debug, Default)]
pub struct SoftwareRasterizer {
    next_version: u64,
}

impl SoftwareRasterizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&mut self, path: &[Pos2], color: Color32, stroke_width: u32, viewport: ViewportSize) -> RenderedLayer {
        self.next_version += 1;
        let version = self.next_version;

        if path.is_empty() || viewport.is_empty() {
            return RenderedLayer::empty(path.to_vec(), viewport, version);
        }

        let half_width = stroke_width.max(1) as f32 / 2.0;
        let bounds = calculate_bounds(path, half_width + 1.0);
        let min_x = bounds.min.x.floor().max(0.0) as u32;
        let min_y = bounds.min.y.floor().max(0.0) as u32;
        let max_x = (bounds.max.x.ceil().max(0.0) as u32).min(viewport.width);
        let max_y = (bounds.max.y.ceil().max(0.0) as u32).min(viewport.height);
        if min_x >= max_x || min_y >= max_y {
            log::debug!("Path lies outside the {}x{} viewport", viewport.width, viewport.height);
            return RenderedLayer::empty(path.to_vec(), viewport, version);
        }

        let mut image = RgbaImage::new(max_x - min_x, max_y - min_y);
        let [r, g, b, a] = color.to_srgba_unmultiplied();

        let segments: Vec<(Pos2, Pos2)> = if path.len() == 1 {
            vec![(path[0], path[0])]
        } else {
            path.windows(2).map(|w| (w[0], w[1])).collect()
        };

        // Each segment only visits the pixels of its own padded bounding box
        for (start, end) in segments {
            let seg_bounds = calculate_bounds(&[start, end], half_width + 1.0);
            let x0 = (seg_bounds.min.x.floor().max(min_x as f32) as u32).max(min_x);
            let y0 = (seg_bounds.min.y.floor().max(min_y as f32) as u32).max(min_y);
            let x1 = (seg_bounds.max.x.ceil().max(0.0) as u32).min(max_x);
            let y1 = (seg_bounds.max.y.ceil().max(0.0) as u32).min(max_y);

            for y in y0..y1 {
                for x in x0..x1 {
                    let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let coverage = (half_width + 0.5 - distance_to_segment(center, start, end)).clamp(0.0, 1.0);
                    if coverage <= 0.0 {
                        continue;
                    }
                    let alpha = (a as f32 * coverage).round() as u8;
                    let pixel = image.get_pixel_mut(x - min_x, y - min_y);
                    if alpha > pixel.0[3] {
                        *pixel = Rgba([r, g, b, alpha]);
                    }
                }
            }
        }

        RenderedLayer {
            path: path.to_vec(),
            viewport,
            origin: [min_x, min_y],
            image,
            version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn horizontal_line_covers_its_pixels() {
        let mut rasterizer = SoftwareRasterizer::new();
        let color = Color32::from_rgba_unmultiplied(227, 23, 138, 127);
        let layer = rasterizer.rasterize(&[pos2(10.0, 10.0), pos2(50.0, 10.0)], color, 2, ViewportSize::new(100, 100));

        assert!(!layer.is_empty());
        assert_eq!(layer.alpha_at(30, 10), 127);
        assert_eq!(layer.alpha_at(30, 30), 0);
        assert_eq!(layer.alpha_at(90, 90), 0);
    }

    #[test]
    fn layer_is_clipped_to_viewport() {
        let mut rasterizer = SoftwareRasterizer::new();
        let layer = rasterizer.rasterize(&[pos2(-50.0, 5.0), pos2(500.0, 5.0)], Color32::RED, 2, ViewportSize::new(100, 20));
        let rect = layer.rect();
        assert!(rect.min.x >= 0.0);
        assert!(rect.max.x <= 100.0);
    }

    #[test]
    fn versions_increase() {
        let mut rasterizer = SoftwareRasterizer::new();
        let first = rasterizer.rasterize(&[pos2(1.0, 1.0)], Color32::RED, 2, ViewportSize::new(10, 10));
        let second = rasterizer.rasterize(&[pos2(1.0, 1.0)], Color32::RED, 2, ViewportSize::new(10, 10));
        assert!(second.version > first.version);
    }

    #[test]
    fn empty_viewport_yields_empty_layer() {
        let mut rasterizer = SoftwareRasterizer::new();
        let layer = rasterizer.rasterize(&[pos2(1.0, 1.0), pos2(5.0, 5.0)], Color32::RED, 2, ViewportSize::new(0, 10));
        assert!(layer.is_empty());
        assert_eq!(layer.to_color_image().size, [0, 0]);
    }
}
