use eframe_vector::geometry::{contained_in, hit_test, nearest_vertex, to_path};
use eframe_vector::{
    EditorError, Geometry, RelativePos, Shape, ShapeKind, ViewportSize, to_absolute, to_relative,
};
use egui::{Pos2, Rect};

fn line(start: (f64, f64), end: (f64, f64)) -> Shape {
    Shape::from_geometry(
        0,
        Geometry::Line {
            start: RelativePos::new(start.0, start.1),
            end: Some(RelativePos::new(end.0, end.1)),
        },
    )
}

#[test]
fn test_relative_round_trip() {
    let size = ViewportSize::new(800, 600);
    for p in [Pos2::new(0.0, 0.0), Pos2::new(123.0, 456.0), Pos2::new(799.0, 599.0)] {
        let relative = to_relative(p, size).unwrap();
        let back = to_absolute(relative, size);
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }
}

#[test]
fn test_empty_viewport_refuses_normalization() {
    assert!(to_relative(Pos2::new(10.0, 10.0), ViewportSize::new(0, 600)).is_none());
}

#[test]
fn test_rectangle_pinning() {
    // a 1x1 viewport makes relative and absolute coordinates coincide
    let viewport = ViewportSize::new(1, 1);
    let mut rect = Shape::from_geometry(
        0,
        Geometry::Rectangle {
            anchor: RelativePos::new(10.0, 10.0),
            corner: Some(RelativePos::new(100.0, 50.0)),
        },
    );

    let (handle, index) = nearest_vertex(&mut rect, Pos2::new(100.0, 50.0), viewport).unwrap();
    assert_eq!(handle, RelativePos::new(100.0, 50.0));
    assert_eq!(index, 0);
    assert_eq!(
        rect.vertices(),
        vec![RelativePos::new(10.0, 10.0), RelativePos::new(100.0, 50.0)]
    );
    assert_eq!(rect.geometry().movable_handle_count(), 1);
}

#[test]
fn test_pinned_rectangle_drag_keeps_opposite_corner() {
    let viewport = ViewportSize::new(1, 1);
    let mut rect = Shape::from_geometry(
        0,
        Geometry::Rectangle {
            anchor: RelativePos::new(10.0, 10.0),
            corner: Some(RelativePos::new(100.0, 50.0)),
        },
    );

    // pick the corner at (10, 50); (100, 10) gets pinned
    let (_, index) = nearest_vertex(&mut rect, Pos2::new(12.0, 48.0), viewport).unwrap();
    assert!(rect.move_handle(index, RelativePos::new(0.0, 70.0)));
    assert_eq!(
        rect.vertices(),
        vec![RelativePos::new(100.0, 10.0), RelativePos::new(0.0, 70.0)]
    );
}

#[test]
fn test_hit_margin() {
    let viewport = ViewportSize::new(1, 1);
    let shape = line((0.0, 0.0), (100.0, 0.0));

    assert!(hit_test(&shape, Pos2::new(50.0, 3.0), 5.0, viewport));
    assert!(!hit_test(&shape, Pos2::new(50.0, 10.0), 5.0, viewport));
}

#[test]
fn test_rectangle_hit_is_on_the_outline_only() {
    let viewport = ViewportSize::new(100, 100);
    let rect = Shape::from_geometry(
        0,
        Geometry::Rectangle {
            anchor: RelativePos::new(0.2, 0.2),
            corner: Some(RelativePos::new(0.8, 0.8)),
        },
    );

    assert!(hit_test(&rect, Pos2::new(50.0, 21.0), 5.0, viewport));
    assert!(!hit_test(&rect, Pos2::new(50.0, 50.0), 5.0, viewport));
    assert_eq!(to_path(rect.geometry(), viewport).len(), 5);
}

#[test]
fn test_containment_is_asymmetric() {
    let viewport = ViewportSize::new(100, 100);
    let marquee = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(30.0, 30.0));

    // one endpoint inside is enough for a line
    let partial_line = line((0.1, 0.1), (0.9, 0.9));
    assert!(contained_in(&partial_line, marquee, viewport));

    // a rectangle counts with any derived corner inside, not only its stored points
    let rect = Shape::from_geometry(
        0,
        Geometry::Rectangle {
            anchor: RelativePos::new(0.2, 0.9),
            corner: Some(RelativePos::new(0.9, 0.2)),
        },
    );
    assert!(contained_in(&rect, marquee, viewport));

    let far_line = line((0.5, 0.5), (0.9, 0.9));
    assert!(!contained_in(&far_line, marquee, viewport));
}

#[test]
fn test_invalid_shape_type() {
    assert_eq!("PolyLine".parse::<ShapeKind>().unwrap(), ShapeKind::Polyline);

    let err = "Circle".parse::<ShapeKind>().unwrap_err();
    assert!(matches!(err, EditorError::InvalidShapeType(ref name) if name == "Circle"));
}

#[test]
fn test_shape_names() {
    let shape = Shape::new(3, ShapeKind::Polyline, RelativePos::new(0.5, 0.5));
    assert_eq!(shape.name(), "PolyLine_3");
    assert_eq!(shape.key().to_string(), "PolyLine_3");
}
