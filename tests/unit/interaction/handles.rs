use super::*;

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-9
}

#[test]
fn handles_sit_on_the_box() {
    let f = BoxFrame::new(Point::new(10.0, 20.0), Vec2::new(100.0, 50.0), 0.0);
    assert!(close(f.handle(ResizeAnchor::Nw), Point::new(10.0, 20.0)));
    assert!(close(f.handle(ResizeAnchor::Se), Point::new(110.0, 70.0)));
    assert!(close(f.handle(ResizeAnchor::E), Point::new(110.0, 45.0)));
    assert!(close(f.rotate_handle(), Point::new(60.0, 20.0 - ROTATE_HANDLE_OFFSET)));
}

#[test]
fn local_and_canvas_are_inverse() {
    let f = BoxFrame::new(Point::new(0.0, 0.0), Vec2::new(40.0, 20.0), 33.0);
    let p = Point::new(17.0, -4.0);
    assert!(close(f.to_canvas(f.to_local(p)), p));
}

#[test]
fn contains_respects_rotation() {
    let f = BoxFrame::new(Point::new(0.0, 0.0), Vec2::new(100.0, 10.0), 90.0);
    assert!(f.contains(Point::new(50.0, -40.0)));
    assert!(!f.contains(Point::new(5.0, 5.0)));
}

#[test]
fn east_resize_keeps_the_west_edge() {
    let f = BoxFrame::new(Point::new(10.0, 10.0), Vec2::new(100.0, 50.0), 0.0);
    let r = f.resized(ResizeAnchor::E, Vec2::new(20.0, 999.0), false);
    assert!(close(r.origin, Point::new(10.0, 10.0)));
    assert_eq!(r.size, Vec2::new(120.0, 50.0));
}

#[test]
fn rotated_resize_keeps_opposite_corner_fixed() {
    let f = BoxFrame::new(Point::new(0.0, 0.0), Vec2::new(60.0, 40.0), 30.0);
    let fixed = f.handle(ResizeAnchor::Nw);
    let r = f.resized(ResizeAnchor::Se, Vec2::new(15.0, 10.0), false);
    assert!(close(r.handle(ResizeAnchor::Nw), fixed));
}

#[test]
fn aspect_lock_scales_uniformly() {
    let f = BoxFrame::new(Point::new(0.0, 0.0), Vec2::new(100.0, 50.0), 0.0);
    let r = f.resized(ResizeAnchor::Se, Vec2::new(100.0, 0.0), true);
    assert!((r.size.x / r.size.y - 2.0).abs() < 1e-9);
    assert!((r.size.x - 200.0).abs() < 1e-9);
}

#[test]
fn resize_never_collapses() {
    let f = BoxFrame::new(Point::new(0.0, 0.0), Vec2::new(10.0, 10.0), 0.0);
    let r = f.resized(ResizeAnchor::W, Vec2::new(500.0, 0.0), false);
    assert!((r.size.x - MIN_RESIZE).abs() < 1e-9);
}

#[test]
fn rotation_points_handle_at_pointer() {
    let c = Point::new(0.0, 0.0);
    assert!((rotation_from_pointer(c, Point::new(0.0, -10.0)) - 0.0).abs() < 1e-9);
    assert!((rotation_from_pointer(c, Point::new(10.0, 0.0)) - 90.0).abs() < 1e-9);
    assert!((rotation_from_pointer(c, Point::new(0.0, 10.0)) - 180.0).abs() < 1e-9);
}
