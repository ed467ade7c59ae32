use xxhash_rust::xxh3::Xxh3;

use crate::displacement::DisplacementSettings;
use crate::foundation::core::{Rgb8, ViewId};
use crate::model::element::{
    Border, BorderStyle, CanvasElement, CurveShape, ElementKind, FontStyle, ImageProps, Shadow,
    ShapeKind, ShapeProps, TextAlign, TextProps,
};
use crate::model::view::DesignUrlMap;

const XXH3_SEED: u64 = 0x8b5ad4a0c7d8e9f1;

/// 128-bit fingerprint of cache-key inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint of everything that shapes a view's design: region uploads and every element
/// that shows on the view, global ones included.
pub fn design_signature(
    view: &ViewId,
    designs: &DesignUrlMap,
    elements: &[CanvasElement],
) -> Signature {
    let mut h = StableHasher::new();
    h.write_str(view.as_str());

    h.write_u32(designs.len() as u32);
    for (pid, url) in designs {
        h.write_str(pid.as_str());
        h.write_str(url);
    }

    let visible: Vec<&CanvasElement> = elements.iter().filter(|e| e.shows_on(view)).collect();
    h.write_u32(visible.len() as u32);
    for el in visible {
        write_element(&mut h, el);
    }
    h.finish()
}

pub fn settings_signature(settings: &DisplacementSettings) -> Signature {
    let s = settings.clamped();
    let mut h = StableHasher::new();
    h.write_f32(s.scale_x);
    h.write_f32(s.scale_y);
    h.write_f32(s.contrast_boost);
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    // Length-prefixed so adjacent strings cannot alias.
    fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }

    fn write_rgb(&mut self, c: Rgb8) {
        self.write_bytes(&[c.r, c.g, c.b]);
    }

    fn write_opt_rgb(&mut self, c: Option<Rgb8>) {
        match c {
            Some(c) => {
                self.write_u8(1);
                self.write_rgb(c);
            }
            None => self.write_u8(0),
        }
    }

    fn finish(self) -> Signature {
        let v = self.inner.digest128();
        Signature {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_element(h: &mut StableHasher, el: &CanvasElement) {
    h.write_str(el.id.as_str());
    match &el.view {
        Some(v) => {
            h.write_u8(1);
            h.write_str(v.as_str());
        }
        None => h.write_u8(0),
    }
    match &el.placeholder_id {
        Some(p) => {
            h.write_u8(1);
            h.write_str(p.as_str());
        }
        None => h.write_u8(0),
    }
    h.write_f64(el.x);
    h.write_f64(el.y);
    h.write_f64(el.rotation);
    h.write_f32(el.opacity);
    h.write_u64(el.z_index as u64);
    h.write_bool(el.visible);
    h.write_bool(el.locked);
    match el.blend_mode {
        Some(m) => {
            h.write_u8(1);
            h.write_u8(m.tag());
        }
        None => h.write_u8(0),
    }
    write_shadow(h, el.shadow.as_ref());
    write_border(h, el.border.as_ref());

    match &el.kind {
        ElementKind::Text(t) => {
            h.write_u8(0);
            write_text(h, t);
        }
        ElementKind::Image(i) => {
            h.write_u8(1);
            write_image(h, i);
        }
        ElementKind::Shape(s) => {
            h.write_u8(2);
            write_shape(h, s);
        }
    }
}

fn write_shadow(h: &mut StableHasher, s: Option<&Shadow>) {
    let Some(s) = s else {
        h.write_u8(0);
        return;
    };
    h.write_u8(1);
    h.write_rgb(s.color);
    h.write_f64(s.blur);
    h.write_f64(s.offset_x);
    h.write_f64(s.offset_y);
    h.write_f32(s.effective_opacity());
}

fn write_border(h: &mut StableHasher, b: Option<&Border>) {
    let Some(b) = b else {
        h.write_u8(0);
        return;
    };
    h.write_u8(1);
    h.write_f64(b.width);
    h.write_rgb(b.color);
    h.write_u8(match b.style {
        BorderStyle::Solid => 0,
        BorderStyle::Dashed => 1,
    });
}

fn write_text(h: &mut StableHasher, t: &TextProps) {
    h.write_str(&t.text);
    h.write_str(&t.font_family);
    h.write_f64(t.font_size);
    h.write_u8(match t.font_style {
        FontStyle::Normal => 0,
        FontStyle::Bold => 1,
        FontStyle::Italic => 2,
        FontStyle::BoldItalic => 3,
    });
    h.write_rgb(t.fill);
    h.write_u8(match t.align {
        TextAlign::Left => 0,
        TextAlign::Center => 1,
        TextAlign::Right => 2,
    });
    h.write_f64(t.letter_spacing);
    h.write_u8(match t.curve.shape {
        CurveShape::None => 0,
        CurveShape::ArchUp => 1,
        CurveShape::ArchDown => 2,
        CurveShape::Circle => 3,
    });
    h.write_f64(t.curve.radius);
}

fn write_image(h: &mut StableHasher, i: &ImageProps) {
    h.write_str(&i.src);
    h.write_f64(i.width);
    h.write_f64(i.height);
    h.write_bool(i.flip_x);
    h.write_bool(i.flip_y);
    h.write_f64(i.scale_x);
    h.write_f64(i.scale_y);
    h.write_bool(i.lock_aspect_ratio);
    let f = i.filters;
    for v in [f.brightness, f.contrast, f.saturation, f.hue, f.blur] {
        h.write_f64(v);
    }
}

fn write_shape(h: &mut StableHasher, s: &ShapeProps) {
    h.write_u8(match s.kind {
        ShapeKind::Rect => 0,
        ShapeKind::Circle => 1,
        ShapeKind::Triangle => 2,
        ShapeKind::Star => 3,
        ShapeKind::Heart => 4,
        ShapeKind::Line => 5,
        ShapeKind::Arrow => 6,
    });
    h.write_f64(s.width);
    h.write_f64(s.height);
    h.write_opt_rgb(s.fill);
    h.write_opt_rgb(s.stroke);
    h.write_f64(s.stroke_width);
    h.write_f64(s.corner_radius);
}

#[cfg(test)]
#[path = "../../tests/unit/cache/signature.rs"]
mod tests;
