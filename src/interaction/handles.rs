//! Handle geometry shared by the overlay and the pointer state machine.

use crate::foundation::core::{Point, Vec2};
use crate::geometry::bounds::rotated_box_corners;
use crate::model::element::CanvasElement;
use crate::text::measure::TextMeasure;

/// Screen radius within which a handle captures the pointer.
pub const HANDLE_RADIUS: f64 = 6.0;
/// Distance of the rotation handle above the top edge, in the box's rotated frame.
pub const ROTATE_HANDLE_OFFSET: f64 = 30.0;
/// Smallest box a resize gesture may produce.
pub const MIN_RESIZE: f64 = 4.0;

/// Resize handle positions, named by compass direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeAnchor {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::Nw,
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
    ];

    /// Unit position on the box: `(-1|0|1, -1|0|1)` for (x, y).
    fn unit(self) -> (f64, f64) {
        match self {
            ResizeAnchor::N => (0.0, -1.0),
            ResizeAnchor::S => (0.0, 1.0),
            ResizeAnchor::E => (1.0, 0.0),
            ResizeAnchor::W => (-1.0, 0.0),
            ResizeAnchor::Ne => (1.0, -1.0),
            ResizeAnchor::Nw => (-1.0, -1.0),
            ResizeAnchor::Se => (1.0, 1.0),
            ResizeAnchor::Sw => (-1.0, 1.0),
        }
    }

    pub fn is_corner(self) -> bool {
        let (x, y) = self.unit();
        x != 0.0 && y != 0.0
    }
}

/// An element's unrotated box plus its rotation about the box centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxFrame {
    pub origin: Point,
    pub size: Vec2,
    pub rotation_deg: f64,
}

impl BoxFrame {
    pub fn new(origin: Point, size: Vec2, rotation_deg: f64) -> Self {
        Self {
            origin,
            size,
            rotation_deg,
        }
    }

    /// The box the overlay draws and the pointer grabs for `el`.
    pub fn of_element(el: &CanvasElement, measure: &dyn TextMeasure) -> Self {
        Self::new(el.origin(), el.box_size(measure), el.rotation)
    }

    pub fn center(&self) -> Point {
        self.origin + self.size * 0.5
    }

    /// Canvas point of a box-local offset measured from the centre.
    pub fn to_canvas(&self, local: Vec2) -> Point {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        self.center() + Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos)
    }

    /// Box-local offset from the centre of a canvas point.
    pub fn to_local(&self, p: Point) -> Vec2 {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let d = p - self.center();
        Vec2::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos)
    }

    pub fn corners(&self) -> [Point; 4] {
        rotated_box_corners(self.origin, self.size.x, self.size.y, self.rotation_deg)
    }

    pub fn contains(&self, p: Point) -> bool {
        let l = self.to_local(p);
        l.x.abs() <= self.size.x * 0.5 && l.y.abs() <= self.size.y * 0.5
    }

    pub fn handle(&self, anchor: ResizeAnchor) -> Point {
        let (ux, uy) = anchor.unit();
        self.to_canvas(Vec2::new(ux * self.size.x * 0.5, uy * self.size.y * 0.5))
    }

    pub fn rotate_handle(&self) -> Point {
        self.to_canvas(Vec2::new(0.0, -self.size.y * 0.5 - ROTATE_HANDLE_OFFSET))
    }

    /// Drag `anchor` by a canvas-space pointer delta. The opposite side stays fixed.
    ///
    /// With `keep_aspect`, corner drags scale both sides by the larger relative change.
    pub fn resized(&self, anchor: ResizeAnchor, delta: Vec2, keep_aspect: bool) -> BoxFrame {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let d = Vec2::new(delta.x * cos + delta.y * sin, -delta.x * sin + delta.y * cos);

        let (hw, hh) = (self.size.x * 0.5, self.size.y * 0.5);
        let (mut left, mut top, mut right, mut bottom) = (-hw, -hh, hw, hh);
        let (ux, uy) = anchor.unit();
        if ux < 0.0 {
            left = (left + d.x).min(right - MIN_RESIZE);
        } else if ux > 0.0 {
            right = (right + d.x).max(left + MIN_RESIZE);
        }
        if uy < 0.0 {
            top = (top + d.y).min(bottom - MIN_RESIZE);
        } else if uy > 0.0 {
            bottom = (bottom + d.y).max(top + MIN_RESIZE);
        }

        if keep_aspect && anchor.is_corner() && self.size.x > 0.0 && self.size.y > 0.0 {
            let s = ((right - left) / self.size.x).max((bottom - top) / self.size.y);
            let (w, h) = (self.size.x * s, self.size.y * s);
            if ux < 0.0 {
                left = right - w;
            } else {
                right = left + w;
            }
            if uy < 0.0 {
                top = bottom - h;
            } else {
                bottom = top + h;
            }
        }

        let size = Vec2::new(right - left, bottom - top);
        let center = self.to_canvas(Vec2::new((left + right) * 0.5, (top + bottom) * 0.5));
        BoxFrame::new(center - size * 0.5, size, self.rotation_deg)
    }
}

/// Rotation in degrees that points the rotation handle at `pointer`.
pub fn rotation_from_pointer(center: Point, pointer: Point) -> f64 {
    let d = pointer - center;
    let deg = (d.y.atan2(d.x).to_degrees() + 90.0).rem_euclid(360.0);
    if 360.0 - deg < 1e-9 { 0.0 } else { deg }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/handles.rs"]
mod tests;
