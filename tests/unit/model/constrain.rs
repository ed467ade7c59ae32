use super::*;
use crate::foundation::core::Rgb8;
use crate::geometry::bounds::contains_rect;
use crate::model::element::{CurveShape, FontStyle, ShapeKind, ShapeProps, TextCurve};
use crate::text::measure::ApproxTextMeasure;

fn region(x0: f64, y0: f64, x1: f64, y1: f64) -> RegionBounds {
    RegionBounds {
        bounds: Rect::new(x0, y0, x1, y1),
        lock_size: false,
    }
}

fn text_el(s: &str, size: f64) -> CanvasElement {
    CanvasElement::new(
        "t1",
        0.0,
        0.0,
        ElementKind::Text(TextProps {
            text: s.to_string(),
            font_family: "Arial".to_string(),
            font_size: size,
            font_style: FontStyle::Normal,
            fill: Rgb8::BLACK,
            align: Default::default(),
            letter_spacing: 0.0,
            curve: TextCurve::default(),
        }),
    )
}

fn image_el(w: f64, h: f64, lock: bool) -> CanvasElement {
    CanvasElement::new(
        "i1",
        0.0,
        0.0,
        ElementKind::Image(ImageProps {
            src: "https://cdn/logo.png".to_string(),
            width: w,
            height: h,
            flip_x: false,
            flip_y: false,
            scale_x: 1.0,
            scale_y: 1.0,
            lock_aspect_ratio: lock,
            filters: Default::default(),
        }),
    )
}

fn applied(el: &CanvasElement, upd: &ElementUpdate) -> CanvasElement {
    let mut out = el.clone();
    upd.apply(&mut out);
    out
}

#[test]
fn sale_text_right_edge_stays_inside_narrow_region() {
    let m = ApproxTextMeasure::default();
    let r = region(150.0, 100.0, 250.0, 300.0);
    let el = text_el("SALE", 48.0);
    let upd = el.constrain(&ElementUpdate::position(200.0, 150.0), Some(&r), &m);
    let after = applied(&el, &upd);
    let measured = after.box_size(&m).x;
    assert!(after.x + measured <= r.bounds.x1 + 1e-6);
    assert!(after.x >= r.bounds.x0 - 1e-6);
}

#[test]
fn unbound_elements_pass_through() {
    let m = ApproxTextMeasure::default();
    let el = text_el("hi", 20.0);
    let upd = ElementUpdate::position(-500.0, 9000.0);
    assert_eq!(el.constrain(&upd, None, &m), upd);
}

#[test]
fn drag_past_edge_clamps_to_nearest_position() {
    let m = ApproxTextMeasure::default();
    let r = region(100.0, 100.0, 400.0, 400.0);
    let el = image_el(50.0, 50.0, false);
    let upd = el.constrain(&ElementUpdate::position(390.0, 20.0), Some(&r), &m);
    assert_eq!(upd.x, Some(350.0));
    assert_eq!(upd.y, Some(100.0));
    assert!(upd.width.is_none());
}

#[test]
fn image_resize_is_clamped_to_region() {
    let m = ApproxTextMeasure::default();
    let r = region(0.0, 0.0, 200.0, 100.0);
    let el = image_el(50.0, 50.0, false);
    let upd = el.constrain(&ElementUpdate::size(500.0, 80.0), Some(&r), &m);
    assert_eq!(upd.width, Some(200.0));
    assert_eq!(upd.height, Some(80.0));
}

#[test]
fn aspect_lock_co_derives_before_clamping() {
    let m = ApproxTextMeasure::default();
    let r = region(0.0, 0.0, 200.0, 100.0);
    let el = image_el(40.0, 20.0, true);
    let upd = ElementUpdate {
        width: Some(100.0),
        ..ElementUpdate::default()
    };
    let out = el.constrain(&upd, Some(&r), &m);
    assert_eq!(out.width, Some(100.0));
    assert_eq!(out.height, Some(50.0));

    // Too big: shrinks uniformly to the tighter axis.
    let upd = ElementUpdate {
        width: Some(400.0),
        ..ElementUpdate::default()
    };
    let out = el.constrain(&upd, Some(&r), &m);
    assert!((out.width.unwrap() - 200.0).abs() < 1e-9);
    assert!((out.height.unwrap() - 100.0).abs() < 1e-9);
}

#[test]
fn rotation_is_accounted_for() {
    let m = ApproxTextMeasure::default();
    let r = region(0.0, 0.0, 100.0, 100.0);
    let el = image_el(100.0, 20.0, false);
    let upd = ElementUpdate {
        rotation: Some(45.0),
        ..ElementUpdate::default()
    };
    let out = el.constrain(&upd, Some(&r), &m);
    let after = applied(&el, &out);
    assert!(contains_rect(r.bounds, after.rotated_bounds(&m)));
}

#[test]
fn lock_size_rejects_resize_but_keeps_move() {
    let m = ApproxTextMeasure::default();
    let mut r = region(0.0, 0.0, 300.0, 300.0);
    r.lock_size = true;
    let el = text_el("HELLO", 20.0);
    let upd = ElementUpdate {
        font_size: Some(60.0),
        x: Some(50.0),
        y: Some(60.0),
        ..ElementUpdate::default()
    };
    let out = el.constrain(&upd, Some(&r), &m);
    assert_eq!(out.font_size, None);
    assert_eq!(out.x, Some(50.0));
    assert_eq!(out.y, Some(60.0));
}

#[test]
fn curved_text_radius_is_clamped_on_text_change() {
    let m = ApproxTextMeasure::default();
    let r = region(0.0, 0.0, 300.0, 300.0);
    let mut el = text_el("CURVY", 20.0);
    if let ElementKind::Text(t) = &mut el.kind {
        t.curve = TextCurve {
            shape: CurveShape::ArchUp,
            radius: 1000.0,
        };
    }
    let upd = ElementUpdate {
        text: Some("CURVIER".to_string()),
        ..ElementUpdate::default()
    };
    let out = el.constrain(&upd, Some(&r), &m);
    assert_eq!(out.curve_radius, Some(150.0));
}

#[test]
fn empty_text_keeps_minimum_box_inside_region() {
    let m = ApproxTextMeasure::default();
    let r = region(0.0, 0.0, 100.0, 100.0);
    let el = text_el("", 40.0);
    let out = el.constrain(&ElementUpdate::position(95.0, 95.0), Some(&r), &m);
    assert_eq!(out.x, Some(80.0));
    assert_eq!(out.y, Some(60.0));
}

#[test]
fn any_accepted_update_keeps_rotated_box_inside() {
    let m = ApproxTextMeasure::default();
    let r = region(120.0, 80.0, 330.0, 260.0);
    let shapes = [
        text_el("FABRIC & FOLDS", 36.0),
        image_el(160.0, 90.0, true),
        CanvasElement::new(
            "s1",
            0.0,
            0.0,
            ElementKind::Shape(ShapeProps {
                kind: ShapeKind::Star,
                width: 80.0,
                height: 80.0,
                fill: None,
                stroke: None,
                stroke_width: 2.0,
                corner_radius: 0.0,
            }),
        ),
    ];
    let mut seed = 0x2545_f491_u64;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % 10_000) as f64 / 10_000.0
    };
    for el in &shapes {
        let mut cur = el.clone();
        for _ in 0..200 {
            let upd = ElementUpdate {
                x: Some(next() * 600.0 - 100.0),
                y: Some(next() * 600.0 - 100.0),
                rotation: Some(next() * 360.0),
                font_size: Some(8.0 + next() * 120.0),
                width: Some(10.0 + next() * 400.0),
                height: Some(10.0 + next() * 400.0),
                ..ElementUpdate::default()
            };
            let out = cur.constrain(&upd, Some(&r), &m);
            out.apply(&mut cur);
            let b = cur.rotated_bounds(&m);
            assert!(
                contains_rect(r.bounds, b),
                "{} escaped: {:?} not in {:?}",
                cur.kind_tag(),
                b,
                r.bounds
            );
        }
    }
}
