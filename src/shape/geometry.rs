use serde::{Deserialize, Serialize};

use super::ShapeKind;
use crate::coords::RelativePos;

/// Vertex data of a shape, one variant per kind.
///
/// Every variant holds at least one vertex, so a shape can never be empty.
/// Line and Rectangle are complete once their second point is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Line {
        start: RelativePos,
        end: Option<RelativePos>,
    },
    /// Two opposite corners. After a corner has been picked for reshaping,
    /// `anchor` is the pinned corner and `corner` the movable one.
    Rectangle {
        anchor: RelativePos,
        corner: Option<RelativePos>,
    },
    Polyline {
        vertices: Vec<RelativePos>,
    },
}

impl Geometry {
    /// Starts the geometry of a new shape at its first vertex
    pub fn new(kind: ShapeKind, first: RelativePos) -> Self {
        match kind {
            ShapeKind::Line => Geometry::Line { start: first, end: None },
            ShapeKind::Rectangle => Geometry::Rectangle { anchor: first, corner: None },
            ShapeKind::Polyline => Geometry::Polyline { vertices: vec![first] },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Line { .. } => ShapeKind::Line,
            Geometry::Rectangle { .. } => ShapeKind::Rectangle,
            Geometry::Polyline { .. } => ShapeKind::Polyline,
        }
    }

    /// The stored vertices, in order
    pub fn vertices(&self) -> Vec<RelativePos> {
        match self {
            Geometry::Line { start, end } => std::iter::once(*start).chain(*end).collect(),
            Geometry::Rectangle { anchor, corner } => std::iter::once(*anchor).chain(*corner).collect(),
            Geometry::Polyline { vertices } => vertices.clone(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Line { end, .. } => 1 + usize::from(end.is_some()),
            Geometry::Rectangle { corner, .. } => 1 + usize::from(corner.is_some()),
            Geometry::Polyline { vertices } => vertices.len(),
        }
    }

    /// Whether the geometry may be committed to the registry
    pub fn is_complete(&self) -> bool {
        match self {
            Geometry::Line { end, .. } => end.is_some(),
            Geometry::Rectangle { corner, .. } => corner.is_some(),
            Geometry::Polyline { vertices } => !vertices.is_empty(),
        }
    }

    /// Appends a vertex. Lines and rectangles accept exactly one more point;
    /// returns false when the point was refused.
    pub fn push(&mut self, point: RelativePos) -> bool {
        match self {
            Geometry::Line { end, .. } | Geometry::Rectangle { corner: end, .. } => {
                if end.is_some() {
                    return false;
                }
                *end = Some(point);
                true
            }
            Geometry::Polyline { vertices } => {
                vertices.push(point);
                true
            }
        }
    }

    /// The four corners of a complete rectangle, in the order
    /// bottom-left, bottom-right, top-right, top-left (min/max per axis).
    pub fn corners(&self) -> Option<[RelativePos; 4]> {
        let Geometry::Rectangle { anchor, corner: Some(corner) } = self else {
            return None;
        };
        let (min_x, max_x) = (anchor.x.min(corner.x), anchor.x.max(corner.x));
        let (min_y, max_y) = (anchor.y.min(corner.y), anchor.y.max(corner.y));
        Some([
            RelativePos::new(min_x, min_y),
            RelativePos::new(max_x, min_y),
            RelativePos::new(max_x, max_y),
            RelativePos::new(min_x, max_y),
        ])
    }

    /// The editable handle set: vertices for lines and polylines, the four
    /// derived corners for a rectangle.
    pub fn handles(&self) -> Vec<RelativePos> {
        match self.corners() {
            Some(corners) => corners.to_vec(),
            None => self.vertices(),
        }
    }

    /// Number of handles that a drag may target
    pub fn movable_handle_count(&self) -> usize {
        match self {
            Geometry::Rectangle { corner, .. } => usize::from(corner.is_some()),
            _ => self.vertex_count(),
        }
    }

    /// Pins the corner diagonally opposite to `corner_index` (an index into
    /// [`Geometry::corners`]) and makes the chosen corner the movable one.
    pub fn pin_rectangle_corner(&mut self, corner_index: usize) -> bool {
        let Some(corners) = self.corners() else {
            return false;
        };
        if corner_index >= corners.len() {
            return false;
        }
        if let Geometry::Rectangle { anchor, corner } = self {
            *anchor = corners[(corner_index + 2) % 4];
            *corner = Some(corners[corner_index]);
        }
        true
    }

    /// Overwrites a movable handle. For a rectangle, index 0 is the free corner.
    pub fn move_handle(&mut self, index: usize, point: RelativePos) -> bool {
        match self {
            Geometry::Line { start, end } => match (index, end) {
                (0, _) => *start = point,
                (1, Some(end)) => *end = point,
                _ => return false,
            },
            Geometry::Rectangle { corner: Some(corner), .. } if index == 0 => *corner = point,
            Geometry::Rectangle { .. } => return false,
            Geometry::Polyline { vertices } => match vertices.get_mut(index) {
                Some(vertex) => *vertex = point,
                None => return false,
            },
        }
        true
    }

    /// Removes the last polyline vertex, never the first one
    pub fn pop_vertex(&mut self) -> Option<RelativePos> {
        match self {
            Geometry::Polyline { vertices } if vertices.len() > 1 => vertices.pop(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(a: (f64, f64), b: (f64, f64)) -> Geometry {
        Geometry::Rectangle {
            anchor: RelativePos::new(a.0, a.1),
            corner: Some(RelativePos::new(b.0, b.1)),
        }
    }

    #[test]
    fn line_accepts_exactly_two_points() {
        let mut line = Geometry::new(ShapeKind::Line, RelativePos::new(0.1, 0.1));
        assert!(!line.is_complete());
        assert!(line.push(RelativePos::new(0.2, 0.2)));
        assert!(line.is_complete());
        assert!(!line.push(RelativePos::new(0.3, 0.3)));
        assert_eq!(line.vertex_count(), 2);
    }

    #[test]
    fn corners_are_ordered_from_min_corner() {
        let corners = rect((0.8, 0.2), (0.1, 0.6)).corners().unwrap();
        assert_eq!(corners[0], RelativePos::new(0.1, 0.2));
        assert_eq!(corners[1], RelativePos::new(0.8, 0.2));
        assert_eq!(corners[2], RelativePos::new(0.8, 0.6));
        assert_eq!(corners[3], RelativePos::new(0.1, 0.6));
    }

    #[test]
    fn pinning_keeps_opposite_corner_fixed() {
        let mut geometry = rect((0.1, 0.1), (0.5, 0.4));
        // bottom-right is index 1, its opposite is top-left (index 3)
        assert!(geometry.pin_rectangle_corner(1));
        assert_eq!(
            geometry.vertices(),
            vec![RelativePos::new(0.1, 0.4), RelativePos::new(0.5, 0.1)]
        );
        assert!(geometry.move_handle(0, RelativePos::new(0.9, 0.0)));
        assert_eq!(geometry.vertices()[0], RelativePos::new(0.1, 0.4));
        assert!(!geometry.move_handle(1, RelativePos::new(0.9, 0.0)));
    }

    #[test]
    fn out_of_range_handles_are_refused() {
        let mut polyline = Geometry::new(ShapeKind::Polyline, RelativePos::new(0.1, 0.1));
        polyline.push(RelativePos::new(0.2, 0.1));
        assert!(!polyline.move_handle(2, RelativePos::new(0.5, 0.5)));
        assert!(polyline.move_handle(1, RelativePos::new(0.5, 0.5)));
        assert_eq!(polyline.movable_handle_count(), 2);
    }

    #[test]
    fn pop_vertex_keeps_first_vertex() {
        let mut polyline = Geometry::new(ShapeKind::Polyline, RelativePos::new(0.1, 0.1));
        polyline.push(RelativePos::new(0.5, 0.5));
        assert_eq!(polyline.pop_vertex(), Some(RelativePos::new(0.5, 0.5)));
        assert_eq!(polyline.pop_vertex(), None);
        assert_eq!(polyline.vertex_count(), 1);

        let mut line = Geometry::new(ShapeKind::Line, RelativePos::new(0.1, 0.1));
        line.push(RelativePos::new(0.2, 0.2));
        assert_eq!(line.pop_vertex(), None);
    }
}
