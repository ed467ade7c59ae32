use crate::foundation::core::{Point, Rect, Vec2};

/// Slack used when comparing derived boxes against region bounds.
pub const CONTAIN_EPS: f64 = 1e-6;

/// Corners of a `w`×`h` box whose unrotated top-left is `origin`, rotated about its center.
///
/// Order: top-left, top-right, bottom-right, bottom-left (before rotation).
pub fn rotated_box_corners(origin: Point, w: f64, h: f64, rotation_deg: f64) -> [Point; 4] {
    let center = Point::new(origin.x + w * 0.5, origin.y + h * 0.5);
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let rot = |dx: f64, dy: f64| {
        Point::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    };
    let (hw, hh) = (w * 0.5, h * 0.5);
    [rot(-hw, -hh), rot(hw, -hh), rot(hw, hh), rot(-hw, hh)]
}

/// Axis-aligned bounds of a box rotated about its center.
pub fn rotated_aabb(origin: Point, w: f64, h: f64, rotation_deg: f64) -> Rect {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let ex = (w * cos).abs() + (h * sin).abs();
    let ey = (w * sin).abs() + (h * cos).abs();
    let center = Point::new(origin.x + w * 0.5, origin.y + h * 0.5);
    Rect::from_center_size(center, (ex, ey))
}

/// Uniform factor (≤ 1) that shrinks a box of `size` so it fits inside `bounds`.
pub fn shrink_to_fit(size: Vec2, bounds: Rect) -> f64 {
    let mut s = 1.0f64;
    if size.x > bounds.width() && size.x > 0.0 {
        s = s.min(bounds.width() / size.x);
    }
    if size.y > bounds.height() && size.y > 0.0 {
        s = s.min(bounds.height() / size.y);
    }
    s.max(0.0)
}

/// Smallest translation that moves `aabb` inside `bounds`.
///
/// An axis on which `aabb` is larger than `bounds` is aligned to the bounds' leading edge.
pub fn translate_into(aabb: Rect, bounds: Rect) -> Vec2 {
    fn axis(lo: f64, hi: f64, min: f64, max: f64) -> f64 {
        if hi - lo > max - min || lo < min {
            min - lo
        } else if hi > max {
            max - hi
        } else {
            0.0
        }
    }
    Vec2::new(
        axis(aabb.x0, aabb.x1, bounds.x0, bounds.x1),
        axis(aabb.y0, aabb.y1, bounds.y0, bounds.y1),
    )
}

/// Whether `inner` lies inside `outer` up to [`CONTAIN_EPS`].
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 - CONTAIN_EPS
        && inner.y0 >= outer.y0 - CONTAIN_EPS
        && inner.x1 <= outer.x1 + CONTAIN_EPS
        && inner.y1 <= outer.y1 + CONTAIN_EPS
}

/// Axis-aligned bounds of a point list. Returns `None` for an empty list.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut r = Rect::from_points(*first, *first);
    for p in &points[1..] {
        r = r.union_pt(*p);
    }
    Some(r)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/bounds.rs"]
mod tests;
