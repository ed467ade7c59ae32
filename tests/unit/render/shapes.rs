use super::*;

const ALL: [ShapeKind; 7] = [
    ShapeKind::Rect,
    ShapeKind::Circle,
    ShapeKind::Triangle,
    ShapeKind::Star,
    ShapeKind::Heart,
    ShapeKind::Line,
    ShapeKind::Arrow,
];

#[test]
fn every_shape_stays_inside_its_box() {
    for kind in ALL {
        let bb = shape_path(kind, 120.0, 80.0, 10.0).bounding_box();
        assert!(bb.x0 >= -1e-6 && bb.y0 >= -1e-6, "{kind:?} {bb:?}");
        assert!(bb.x1 <= 120.0 + 1e-6 && bb.y1 <= 80.0 + 1e-6, "{kind:?} {bb:?}");
    }
}

#[test]
fn star_and_circle_span_the_box() {
    let c = shape_path(ShapeKind::Circle, 100.0, 50.0, 0.0).bounding_box();
    assert!((c.width() - 100.0).abs() < 0.5);
    assert!((c.height() - 50.0).abs() < 0.5);
    let s = shape_path(ShapeKind::Star, 100.0, 100.0, 0.0).bounding_box();
    assert!(s.y0.abs() < 1e-6);
}

#[test]
fn corner_radius_is_capped() {
    let p = shape_path(ShapeKind::Rect, 10.0, 10.0, 100.0);
    assert!(p.contains(Point::new(5.0, 5.0)));
    assert!(!p.contains(Point::new(0.2, 0.2)));
}

#[test]
fn only_lines_are_unfillable() {
    assert!(!is_fillable(ShapeKind::Line));
    assert!(is_fillable(ShapeKind::Heart));
}

#[test]
fn stroke_outline_has_area() {
    let line = shape_path(ShapeKind::Line, 100.0, 10.0, 0.0);
    let solid = stroke_outline(&line, 4.0, BorderStyle::Solid);
    assert!(solid.contains(Point::new(50.0, 5.0)));
    assert!(!solid.contains(Point::new(50.0, 9.0)));

    let dashed = stroke_outline(&line, 4.0, BorderStyle::Dashed);
    assert!(dashed.elements().len() > solid.elements().len());
}
