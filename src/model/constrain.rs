use crate::foundation::core::{Rect, Vec2};
use crate::geometry::bounds::{rotated_aabb, shrink_to_fit, translate_into};
use crate::model::element::{CanvasElement, ElementKind, ImageProps, TextProps};
use crate::model::update::ElementUpdate;
use crate::text::measure::{TextMeasure, clamp_curve_radius, measure_text_box, straight_text_width};

/// Pixel bounds of an element's owning region plus its size lock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionBounds {
    pub bounds: Rect,
    pub lock_size: bool,
}

const FIT_PASSES: usize = 4;

impl CanvasElement {
    /// Clamp a proposed edit so the element's rotated box stays inside `region`.
    ///
    /// Edits are never rejected: positions move to the nearest valid spot and oversized boxes
    /// shrink until they fit. A size-locked region drops size changes but still clamps position.
    /// Elements without a region pass through unchanged.
    pub fn constrain(
        &self,
        update: &ElementUpdate,
        region: Option<&RegionBounds>,
        measure: &dyn TextMeasure,
    ) -> ElementUpdate {
        let Some(region) = region else {
            return update.clone();
        };

        let mut out = update.clone();
        if region.lock_size {
            out.strip_size();
        }
        if let ElementKind::Image(img) = &self.kind {
            co_derive_aspect(img, &mut out);
        }

        let mut proposed = self.clone();
        out.apply(&mut proposed);
        let bounds = region.bounds;
        let can_resize = !region.lock_size;

        let size = match &mut proposed.kind {
            ElementKind::Text(t) => fit_text(t, proposed.rotation, bounds, can_resize, measure),
            ElementKind::Image(i) => {
                let mut w = i.width;
                let mut h = i.height;
                let sx = i.scale_x.abs().max(1e-9);
                let sy = i.scale_y.abs().max(1e-9);
                if can_resize {
                    let locked = i.lock_aspect_ratio;
                    (w, h) = fit_box(w * sx, h * sy, proposed.rotation, bounds, locked);
                    w /= sx;
                    h /= sy;
                    i.width = w;
                    i.height = h;
                }
                Vec2::new(w * sx, h * sy)
            }
            ElementKind::Shape(s) => {
                if can_resize {
                    (s.width, s.height) =
                        fit_box(s.width, s.height, proposed.rotation, bounds, false);
                }
                Vec2::new(s.width, s.height)
            }
        };

        let aabb = rotated_aabb(proposed.origin(), size.x, size.y, proposed.rotation);
        let delta = translate_into(aabb, bounds);
        proposed.x += delta.x;
        proposed.y += delta.y;

        out.x = Some(proposed.x);
        out.y = Some(proposed.y);
        match (&self.kind, &proposed.kind) {
            (ElementKind::Text(before), ElementKind::Text(after)) => {
                if after.font_size != before.font_size {
                    out.font_size = Some(after.font_size);
                }
                if after.letter_spacing != before.letter_spacing {
                    out.letter_spacing = Some(after.letter_spacing);
                }
                if after.curve.radius != before.curve.radius {
                    out.curve_radius = Some(after.curve.radius);
                }
            }
            (ElementKind::Image(before), ElementKind::Image(after)) => {
                if after.width != before.width || after.height != before.height {
                    out.width = Some(after.width);
                    out.height = Some(after.height);
                }
            }
            (ElementKind::Shape(before), ElementKind::Shape(after)) => {
                if after.width != before.width || after.height != before.height {
                    out.width = Some(after.width);
                    out.height = Some(after.height);
                }
            }
            _ => {}
        }
        out
    }
}

/// With an aspect lock, a width-only or height-only edit derives the other side from the
/// element's current ratio.
fn co_derive_aspect(img: &ImageProps, upd: &mut ElementUpdate) {
    let locked = upd.lock_aspect_ratio.unwrap_or(img.lock_aspect_ratio);
    if !locked || img.width <= 0.0 || img.height <= 0.0 {
        return;
    }
    let aspect = img.width / img.height;
    match (upd.width, upd.height) {
        (Some(w), None) => upd.height = Some(w / aspect),
        (None, Some(h)) => upd.width = Some(h * aspect),
        (Some(w), Some(_)) => upd.height = Some(w / aspect),
        (None, None) => {}
    }
}

/// Clamp a `w`×`h` box to the region size, then shrink it uniformly until its rotated bounds fit.
fn fit_box(mut w: f64, mut h: f64, rotation: f64, bounds: Rect, keep_aspect: bool) -> (f64, f64) {
    if keep_aspect {
        let s = shrink_to_fit(Vec2::new(w, h), bounds);
        w *= s;
        h *= s;
    } else {
        w = w.min(bounds.width());
        h = h.min(bounds.height());
    }
    let aabb = rotated_aabb(Default::default(), w, h, rotation);
    let s = shrink_to_fit(Vec2::new(aabb.width(), aabb.height()), bounds);
    (w * s, h * s)
}

/// Re-measure text for its proposed values, clamp a curve radius, and shrink the font until the
/// rotated box fits. Returns the final unrotated box size.
fn fit_text(
    t: &mut TextProps,
    rotation: f64,
    bounds: Rect,
    can_resize: bool,
    measure: &dyn TextMeasure,
) -> Vec2 {
    clamp_radius(t, bounds, measure);
    let mut size = measure_text_box(measure, t);
    if !can_resize {
        return size;
    }
    for pass in 0..=FIT_PASSES {
        let aabb = rotated_aabb(Default::default(), size.x, size.y, rotation);
        let s = shrink_to_fit(Vec2::new(aabb.width(), aabb.height()), bounds);
        if s >= 1.0 {
            break;
        }
        // Shaped metrics are not perfectly linear in font size; overshoot slightly after the
        // first pass so the loop converges.
        let s = if pass == 0 { s } else { s * 0.98 };
        t.font_size *= s;
        t.letter_spacing *= s;
        t.curve.radius *= s;
        clamp_radius(t, bounds, measure);
        size = measure_text_box(measure, t);
    }
    size
}

fn clamp_radius(t: &mut TextProps, bounds: Rect, measure: &dyn TextMeasure) {
    if t.curve.is_active() {
        let width = straight_text_width(measure, t);
        t.curve.radius = clamp_curve_radius(t.curve.radius, width, bounds, t.curve.shape);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/constrain.rs"]
mod tests;
