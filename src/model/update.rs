use crate::foundation::core::Rgb8;
use crate::model::blend::BlendMode;
use crate::model::element::{
    Border, CanvasElement, CurveShape, ElementKind, FontStyle, ImageFilters, Shadow, TextAlign,
};

/// Partial edit of a [`CanvasElement`].
///
/// `None` leaves a field unchanged. Fields that do not apply to the element's kind are ignored.
/// Optional attributes use a nested `Option` so they can be cleared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f32>,
    pub z_index: Option<i64>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub blend_mode: Option<Option<BlendMode>>,
    pub shadow: Option<Option<Shadow>>,
    pub border: Option<Option<Border>>,

    pub text: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_style: Option<FontStyle>,
    /// Text fill, or shape fill.
    pub fill: Option<Rgb8>,
    pub align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    pub curve_shape: Option<CurveShape>,
    pub curve_radius: Option<f64>,

    pub src: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub flip_x: Option<bool>,
    pub flip_y: Option<bool>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub lock_aspect_ratio: Option<bool>,
    pub filters: Option<ImageFilters>,

    pub stroke: Option<Rgb8>,
    pub stroke_width: Option<f64>,
    pub corner_radius: Option<f64>,
}

impl ElementUpdate {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether applying this update can move or resize the element's box.
    pub fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.rotation.is_some()
            || self.text.is_some()
            || self.font_family.is_some()
            || self.font_style.is_some()
            || self.curve_shape.is_some()
            || self.touches_size()
    }

    /// Whether this update asks for a different size.
    pub fn touches_size(&self) -> bool {
        self.font_size.is_some()
            || self.letter_spacing.is_some()
            || self.curve_radius.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.scale_x.is_some()
            || self.scale_y.is_some()
    }

    /// Drop every size-affecting field, keeping position and style edits.
    pub fn strip_size(&mut self) {
        self.font_size = None;
        self.letter_spacing = None;
        self.curve_radius = None;
        self.width = None;
        self.height = None;
        self.scale_x = None;
        self.scale_y = None;
    }

    /// Keep only fields that do not touch geometry (style, visibility, order).
    pub fn without_geometry(&self) -> Self {
        Self {
            x: None,
            y: None,
            rotation: None,
            text: None,
            font_family: None,
            font_style: None,
            curve_shape: None,
            font_size: None,
            letter_spacing: None,
            curve_radius: None,
            width: None,
            height: None,
            scale_x: None,
            scale_y: None,
            ..self.clone()
        }
    }

    /// Overlay `later` on top of `self`; fields set in `later` win.
    pub fn merge(&mut self, later: ElementUpdate) {
        macro_rules! take {
            ($($f:ident),* $(,)?) => {
                $(if later.$f.is_some() { self.$f = later.$f; })*
            };
        }
        take!(
            x, y, rotation, opacity, z_index, visible, locked, blend_mode, shadow, border, text,
            font_family, font_size, font_style, fill, align, letter_spacing, curve_shape,
            curve_radius, src, width, height, flip_x, flip_y, scale_x, scale_y,
            lock_aspect_ratio, filters, stroke, stroke_width, corner_radius,
        );
    }

    pub fn apply(&self, el: &mut CanvasElement) {
        if let Some(v) = self.x {
            el.x = v;
        }
        if let Some(v) = self.y {
            el.y = v;
        }
        if let Some(v) = self.rotation {
            el.rotation = v;
        }
        if let Some(v) = self.opacity {
            el.opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = self.z_index {
            el.z_index = v;
        }
        if let Some(v) = self.visible {
            el.visible = v;
        }
        if let Some(v) = self.locked {
            el.locked = v;
        }
        if let Some(v) = self.blend_mode {
            el.blend_mode = v;
        }
        if let Some(v) = self.shadow {
            el.shadow = v;
        }
        if let Some(v) = self.border {
            el.border = v;
        }

        match &mut el.kind {
            ElementKind::Text(t) => {
                if let Some(v) = &self.text {
                    t.text = v.clone();
                }
                if let Some(v) = &self.font_family {
                    t.font_family = v.clone();
                }
                if let Some(v) = self.font_size {
                    t.font_size = v.max(1.0);
                }
                if let Some(v) = self.font_style {
                    t.font_style = v;
                }
                if let Some(v) = self.fill {
                    t.fill = v;
                }
                if let Some(v) = self.align {
                    t.align = v;
                }
                if let Some(v) = self.letter_spacing {
                    t.letter_spacing = v;
                }
                if let Some(v) = self.curve_shape {
                    t.curve.shape = v;
                }
                if let Some(v) = self.curve_radius {
                    t.curve.radius = v.max(0.0);
                }
            }
            ElementKind::Image(i) => {
                if let Some(v) = &self.src {
                    i.src = v.clone();
                }
                if let Some(v) = self.width {
                    i.width = v.max(1.0);
                }
                if let Some(v) = self.height {
                    i.height = v.max(1.0);
                }
                if let Some(v) = self.flip_x {
                    i.flip_x = v;
                }
                if let Some(v) = self.flip_y {
                    i.flip_y = v;
                }
                if let Some(v) = self.scale_x {
                    i.scale_x = v;
                }
                if let Some(v) = self.scale_y {
                    i.scale_y = v;
                }
                if let Some(v) = self.lock_aspect_ratio {
                    i.lock_aspect_ratio = v;
                }
                if let Some(v) = self.filters {
                    i.filters = v.clamped();
                }
            }
            ElementKind::Shape(s) => {
                if let Some(v) = self.width {
                    s.width = v.max(1.0);
                }
                if let Some(v) = self.height {
                    s.height = v.max(1.0);
                }
                if let Some(v) = self.fill {
                    s.fill = Some(v);
                }
                if let Some(v) = self.stroke {
                    s.stroke = Some(v);
                }
                if let Some(v) = self.stroke_width {
                    s.stroke_width = v.max(0.0);
                }
                if let Some(v) = self.corner_radius {
                    s.corner_radius = v.max(0.0);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/update.rs"]
mod tests;
