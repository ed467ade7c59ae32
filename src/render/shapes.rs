//! Local-space outlines for shape elements and element borders.

use kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, Shape, Stroke};

use crate::model::element::{BorderStyle, ShapeKind};

const PATH_TOLERANCE: f64 = 0.1;

/// Outline of a shape of `kind` filling the box `(0, 0) .. (w, h)`.
///
/// Lines are open paths and are only ever stroked.
pub fn shape_path(kind: ShapeKind, w: f64, h: f64, corner_radius: f64) -> BezPath {
    let bbox = Rect::new(0.0, 0.0, w, h);
    match kind {
        ShapeKind::Rect => {
            let r = corner_radius.clamp(0.0, w.min(h) * 0.5);
            RoundedRect::from_rect(bbox, r).to_path(PATH_TOLERANCE)
        }
        ShapeKind::Circle => Ellipse::from_rect(bbox).to_path(PATH_TOLERANCE),
        ShapeKind::Triangle => polygon(&[
            Point::new(w * 0.5, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ]),
        ShapeKind::Star => {
            let c = bbox.center();
            let pts: Vec<Point> = (0..10)
                .map(|i| {
                    let k = if i % 2 == 0 { 1.0 } else { 0.4 };
                    let a = -std::f64::consts::FRAC_PI_2 + f64::from(i) * std::f64::consts::PI / 5.0;
                    Point::new(c.x + a.cos() * w * 0.5 * k, c.y + a.sin() * h * 0.5 * k)
                })
                .collect();
            polygon(&pts)
        }
        ShapeKind::Heart => {
            let p = |x: f64, y: f64| Point::new(x * w, y * h);
            let mut path = BezPath::new();
            path.move_to(p(0.5, 0.25));
            path.curve_to(p(0.5, 0.0), p(0.0, 0.0), p(0.0, 0.3));
            path.curve_to(p(0.0, 0.6), p(0.5, 0.8), p(0.5, 1.0));
            path.curve_to(p(0.5, 0.8), p(1.0, 0.6), p(1.0, 0.3));
            path.curve_to(p(1.0, 0.0), p(0.5, 0.0), p(0.5, 0.25));
            path.close_path();
            path
        }
        ShapeKind::Line => {
            let mut path = BezPath::new();
            path.move_to((0.0, h * 0.5));
            path.line_to((w, h * 0.5));
            path
        }
        ShapeKind::Arrow => {
            let head = (w * 0.3).min(h);
            let shaft = h * 0.3;
            let mid = h * 0.5;
            polygon(&[
                Point::new(0.0, mid - shaft * 0.5),
                Point::new(w - head, mid - shaft * 0.5),
                Point::new(w - head, 0.0),
                Point::new(w, mid),
                Point::new(w - head, h),
                Point::new(w - head, mid + shaft * 0.5),
                Point::new(0.0, mid + shaft * 0.5),
            ])
        }
    }
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut it = points.iter();
    if let Some(first) = it.next() {
        path.move_to(*first);
        for p in it {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

pub fn is_fillable(kind: ShapeKind) -> bool {
    kind != ShapeKind::Line
}

/// Fillable outline of `path` stroked at `width`.
pub fn stroke_outline(path: &BezPath, width: f64, style: BorderStyle) -> BezPath {
    let mut stroke = Stroke::new(width.max(0.0));
    if style == BorderStyle::Dashed {
        let dash = (width * 3.0).max(4.0);
        stroke = stroke.with_dashes(0.0, [dash, dash * 0.6]);
    }
    kurbo::stroke(
        path.iter(),
        &stroke,
        &kurbo::StrokeOpts::default(),
        PATH_TOLERANCE,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/shapes.rs"]
mod tests;
