//! Conversion between device pixels and viewport-relative coordinates.
//!
//! All vertex data is stored relative to the viewport (`[0, 1]` on each axis,
//! unclamped) so that shapes keep their place when the window is resized.
//! Pointer input arrives in absolute device pixels and is converted here,
//! immediately on capture.

use egui::{Pos2, Vec2, pos2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absorbs the representation error of a relative round-trip before truncating
/// to a whole device pixel.
const PIXEL_EPSILON: f64 = 1e-6;

/// A point expressed as a fraction of the viewport width and height
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelativePos {
    pub x: f64,
    pub y: f64,
}

impl RelativePos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for RelativePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// Size of the drawing viewport in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Truncates an egui size (in points) to whole pixels
    pub fn from_vec2(size: Vec2) -> Self {
        Self {
            width: size.x.max(0.0) as u32,
            height: size.y.max(0.0) as u32,
        }
    }

    /// True when either dimension is zero, e.g. while the window is minimized
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Converts an absolute pointer position into viewport-relative coordinates.
///
/// Returns `None` for an empty viewport; callers skip the conversion for that
/// frame instead of storing a division by zero.
pub fn to_relative(point: Pos2, viewport: ViewportSize) -> Option<RelativePos> {
    if viewport.is_empty() {
        return None;
    }
    Some(RelativePos {
        x: point.x as f64 / viewport.width as f64,
        y: point.y as f64 / viewport.height as f64,
    })
}

/// Projects a relative point back onto the viewport, keeping fractional
/// precision for hit-testing math.
pub fn to_absolute(point: RelativePos, viewport: ViewportSize) -> Pos2 {
    pos2(
        (point.x * viewport.width as f64) as f32,
        (point.y * viewport.height as f64) as f32,
    )
}

/// Projects a relative point onto the viewport and truncates it to a whole
/// device pixel, as used for rasterization.
pub fn to_device_pixel(point: RelativePos, viewport: ViewportSize) -> Pos2 {
    let x = (point.x * viewport.width as f64 + PIXEL_EPSILON).floor();
    let y = (point.y * viewport.height as f64 + PIXEL_EPSILON).floor();
    pos2(x as f32, y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_pixels() {
        let viewport = ViewportSize::new(800, 600);
        for point in [pos2(0.0, 0.0), pos2(100.0, 100.0), pos2(700.0, 500.0), pos2(799.0, 599.0), pos2(123.0, 457.0)] {
            let relative = to_relative(point, viewport).unwrap();
            assert_eq!(to_device_pixel(relative, viewport), point);
            let absolute = to_absolute(relative, viewport);
            assert!((absolute - point).length() < 1e-3);
        }
    }

    #[test]
    fn empty_viewport_is_skipped() {
        assert!(to_relative(pos2(10.0, 10.0), ViewportSize::new(0, 600)).is_none());
        assert!(to_relative(pos2(10.0, 10.0), ViewportSize::new(800, 0)).is_none());
        assert!(ViewportSize::from_vec2(Vec2::new(-3.0, 20.0)).is_empty());
    }

    #[test]
    fn points_outside_the_viewport_are_accepted() {
        let viewport = ViewportSize::new(200, 100);
        let relative = to_relative(pos2(-20.0, 150.0), viewport).unwrap();
        assert_eq!(relative, RelativePos::new(-0.1, 1.5));
    }

    #[test]
    fn resize_reprojects_relative_points() {
        let relative = to_relative(pos2(700.0, 500.0), ViewportSize::new(800, 600)).unwrap();
        assert_eq!(to_device_pixel(relative, ViewportSize::new(400, 300)), pos2(350.0, 250.0));
    }
}
