use egui::{Pos2, Rect};

use crate::coords::{RelativePos, ViewportSize, to_absolute, to_device_pixel};
use crate::shape::{Geometry, Shape};

/// Tolerance around a shape's path that still counts as a hit, in device pixels
pub const HIT_MARGIN: f32 = 5.0;

/// The polyline a shape is drawn along, in absolute coordinates.
///
/// Lines and polylines use their vertices verbatim. A rectangle becomes the
/// closed loop bottom-left, bottom-right, top-right, top-left, bottom-left.
pub fn to_path(geometry: &Geometry, viewport: ViewportSize) -> Vec<Pos2> {
    path_with(geometry, |p| to_absolute(p, viewport))
}

/// Same as [`to_path`] but truncated to whole device pixels, for rasterization
pub fn to_device_path(geometry: &Geometry, viewport: ViewportSize) -> Vec<Pos2> {
    path_with(geometry, |p| to_device_pixel(p, viewport))
}

fn path_with(geometry: &Geometry, project: impl Fn(RelativePos) -> Pos2) -> Vec<Pos2> {
    match geometry.corners() {
        Some(corners) => corners
            .iter()
            .chain(std::iter::once(&corners[0]))
            .map(|p| project(*p))
            .collect(),
        None => geometry.vertices().into_iter().map(project).collect(),
    }
}

/// Distance from `point` to the segment `start`-`end`
pub fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq == 0.0 {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

/// Distance from `point` to the nearest segment of `path`
pub fn distance_to_path(point: Pos2, path: &[Pos2]) -> Option<f32> {
    match path {
        [] => None,
        [single] => Some(point.distance(*single)),
        _ => path
            .windows(2)
            .map(|w| distance_to_segment(point, w[0], w[1]))
            .reduce(f32::min),
    }
}

/// True if `point` lies within `margin` of the shape's path
pub fn hit_test(shape: &Shape, point: Pos2, margin: f32, viewport: ViewportSize) -> bool {
    let path = to_path(shape.geometry(), viewport);
    distance_to_path(point, &path).is_some_and(|distance| distance <= margin)
}

/// Finds the handle closest to `point`, returning its relative position and index.
///
/// Ties go to the lowest index. For a complete rectangle the chosen corner
/// becomes movable: the diagonally opposite corner is pinned and the
/// returned index is 0, the movable handle of a pinned rectangle.
pub fn nearest_vertex(shape: &mut Shape, point: Pos2, viewport: ViewportSize) -> Option<(RelativePos, usize)> {
    let handles = shape.geometry().handles();

    let mut nearest: Option<(RelativePos, usize, f32)> = None;
    for (index, handle) in handles.iter().enumerate() {
        let distance = to_absolute(*handle, viewport).distance_sq(point);
        if nearest.is_none_or(|(_, _, best)| distance < best) {
            nearest = Some((*handle, index, distance));
        }
    }
    let (handle, index, _) = nearest?;

    if shape.geometry().corners().is_some() {
        shape.geometry_mut().pin_rectangle_corner(index);
        return Some((handle, 0));
    }
    Some((handle, index))
}

/// Marquee containment: true if any vertex of a line or polyline, or any of
/// the four corners of a rectangle, falls inside `rect`.
pub fn contained_in(shape: &Shape, rect: Rect, viewport: ViewportSize) -> bool {
    shape
        .geometry()
        .handles()
        .into_iter()
        .any(|handle| rect.contains(to_absolute(handle, viewport)))
}
