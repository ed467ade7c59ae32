use super::*;
use crate::geometry::units::{CanvasLayout, PhysicalSize};

fn geom() -> ViewGeometry {
    let size = PhysicalSize {
        width_in: 20.0,
        height_in: 24.0,
    };
    ViewGeometry::for_view(&CanvasLayout::default(), Some(size), size, 10.0)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn rect_bounds_follow_shared_conversion() {
    let g = geom();
    let p = Placeholder::rect("chest", 7.0, 4.0, 6.0, 8.0);
    let b = p.pixel_bounds(&g);
    assert!(approx(b.x0, g.to_pixels(7.0)));
    assert!(approx(b.y0, g.to_pixels(4.0)));
    assert!(approx(b.width(), g.length_to_pixels(6.0)));
    assert!(approx(b.height(), g.length_to_pixels(8.0)));
    assert!(matches!(p.clip_shape(&g), ClipShape::Rect(_)));
}

#[test]
fn scale_grows_rect_from_origin() {
    let g = geom();
    let mut p = Placeholder::rect("chest", 7.0, 4.0, 6.0, 8.0);
    p.scale = 2.0;
    let b = p.pixel_bounds(&g);
    assert!(approx(b.x0, g.to_pixels(7.0)));
    assert!(approx(b.width(), 2.0 * g.length_to_pixels(6.0)));
}

#[test]
fn rotated_rect_becomes_polygon_with_wider_bounds() {
    let g = geom();
    let mut p = Placeholder::rect("chest", 7.0, 4.0, 6.0, 2.0);
    let flat = p.pixel_bounds(&g);
    p.rotation_deg = 90.0;
    let shape = p.clip_shape(&g);
    let ClipShape::Polygon(pts) = &shape else {
        panic!("rotated rectangles clip as polygons");
    };
    assert_eq!(pts.len(), 4);
    let b = shape.bounds();
    assert!(approx(b.width(), flat.height()));
    assert!(approx(b.height(), flat.width()));
    assert!(approx(b.center().x, flat.center().x));
}

#[test]
fn polygon_bounds_are_min_max_of_points() {
    let g = geom();
    let p = Placeholder::polygon(
        "pocket",
        vec![
            InchPoint::new(2.0, 2.0),
            InchPoint::new(6.0, 2.0),
            InchPoint::new(4.0, 5.0),
        ],
    );
    let b = p.pixel_bounds(&g);
    assert!(approx(b.x0, g.to_pixels(2.0)));
    assert!(approx(b.x1, g.to_pixels(6.0)));
    assert!(approx(b.y1, g.to_pixels(5.0)));
}

#[test]
fn polygon_contains_is_exact_not_bounding_box() {
    let g = geom();
    let p = Placeholder::polygon(
        "tri",
        vec![
            InchPoint::new(0.0, 0.0),
            InchPoint::new(10.0, 0.0),
            InchPoint::new(0.0, 10.0),
        ],
    );
    let shape = p.clip_shape(&g);
    assert!(shape.contains(g.point_to_pixels(1.0, 1.0)));
    // Inside the bounding box, outside the triangle.
    assert!(!shape.contains(g.point_to_pixels(9.0, 9.0)));
}

#[test]
fn mask_path_and_hit_test_share_vertices() {
    let g = geom();
    let p = Placeholder::polygon(
        "tri",
        vec![
            InchPoint::new(0.0, 0.0),
            InchPoint::new(10.0, 0.0),
            InchPoint::new(0.0, 10.0),
        ],
    );
    let shape = p.clip_shape(&g);
    let path = shape.to_bez_path();
    let path_pts: Vec<Point> = path.elements().iter().filter_map(|el| el.end_point()).collect();
    assert_eq!(&path_pts[..3], shape.vertices().as_slice());
}

#[test]
fn validation_rejects_short_polygons_and_bad_scale() {
    let p = Placeholder::polygon("x", vec![InchPoint::new(0.0, 0.0), InchPoint::new(1.0, 1.0)]);
    assert!(p.validate().is_err());
    let mut r = Placeholder::rect("r", 0.0, 0.0, 1.0, 1.0);
    assert!(r.validate().is_ok());
    r.scale = 0.0;
    assert!(r.validate().is_err());
}

#[test]
fn lock_size_resize_changes_scale_only() {
    let g = geom();
    let mut p = Placeholder::rect("chest", 7.0, 4.0, 6.0, 8.0);
    p.lock_size = true;
    let w = p.pixel_bounds(&g).width();
    p.resize_to(&g, w * 1.5, 10.0);
    assert!(approx(p.scale, 1.5));
    assert_eq!(
        p.shape,
        PlaceholderShape::Rect {
            x_in: 7.0,
            y_in: 4.0,
            width_in: 6.0,
            height_in: 8.0
        }
    );
}

#[test]
fn free_resize_updates_inches() {
    let g = geom();
    let mut p = Placeholder::rect("chest", 7.0, 4.0, 6.0, 8.0);
    p.resize_to(&g, g.length_to_pixels(3.0), g.length_to_pixels(4.0));
    let PlaceholderShape::Rect {
        width_in,
        height_in,
        ..
    } = p.shape
    else {
        panic!("still a rect");
    };
    assert!(approx(width_in, 3.0));
    assert!(approx(height_in, 4.0));
}

#[test]
fn move_and_rotate_gestures() {
    let g = geom();
    let mut p = Placeholder::rect("chest", 7.0, 4.0, 6.0, 8.0);
    p.move_to(&g, Point::new(100.0, 120.0));
    let b = p.pixel_bounds(&g);
    assert!(approx(b.x0, 100.0) && approx(b.y0, 120.0));
    p.rotate_to(-90.0);
    assert!(approx(p.rotation_deg, 270.0));
}

#[test]
fn catalog_json_shape() {
    let json = r#"{
        "id": "front-chest",
        "shapeType": "rect",
        "xIn": 7, "yIn": 4, "widthIn": 6, "heightIn": 8,
        "rotationDeg": 0
    }"#;
    let p: Placeholder = serde_json::from_str(json).unwrap();
    assert_eq!(p.scale, 1.0);
    assert!(!p.lock_size);

    let json = r#"{
        "id": "pocket", "shapeType": "polygon", "rotationDeg": 15, "scale": 1.2, "lockSize": true,
        "polygonPoints": [{"xIn":1,"yIn":1},{"xIn":3,"yIn":1},{"xIn":2,"yIn":3}]
    }"#;
    let p: Placeholder = serde_json::from_str(json).unwrap();
    assert!(p.lock_size);
    assert!(matches!(p.shape, PlaceholderShape::Polygon { ref polygon_points } if polygon_points.len() == 3));
}
