use crate::foundation::core::{ElementId, PlaceholderId, Point, Rect, Rgb8, Vec2, ViewId};
use crate::geometry::bounds::rotated_aabb;
use crate::model::blend::BlendMode;
use crate::text::measure::{TextMeasure, measure_text_box};

/// A design element on the canvas.
///
/// Shared attributes live on this struct; per-kind geometry and style live in [`ElementKind`].
/// `x`/`y` are the top-left of the unrotated box in canvas pixels, and `rotation` (degrees) turns
/// the box about its center.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    pub id: ElementId,
    /// Absent means the element renders on every view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewId>,
    /// Owning print region; the element must stay inside it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_id: Option<PlaceholderId>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Explicit blend mode; `None` uses the garment-darkness default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<BlendMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

fn default_opacity() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Per-kind payload, tagged by `type`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    Text(TextProps),
    Image(ImageProps),
    Shape(ShapeProps),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Path the text follows. `None` renders straight text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveShape {
    #[default]
    None,
    ArchUp,
    ArchDown,
    Circle,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextCurve {
    #[serde(default)]
    pub shape: CurveShape,
    #[serde(default = "default_curve_radius")]
    pub radius: f64,
}

fn default_curve_radius() -> f64 {
    200.0
}

impl Default for TextCurve {
    fn default() -> Self {
        Self {
            shape: CurveShape::None,
            radius: default_curve_radius(),
        }
    }
}

impl TextCurve {
    pub fn is_active(&self) -> bool {
        self.shape != CurveShape::None
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default = "default_text_fill")]
    pub fill: Rgb8,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub letter_spacing: f64,
    #[serde(default)]
    pub curve: TextCurve,
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_font_size() -> f64 {
    24.0
}

fn default_text_fill() -> Rgb8 {
    Rgb8::BLACK
}

/// Konva-style image adjustments. Zero means "off" for every field.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImageFilters {
    /// -100..100, applied as an additive offset of `brightness / 100`.
    pub brightness: f64,
    /// -100..100.
    pub contrast: f64,
    /// -100..100, applied as a factor of `1 + saturation / 100`.
    pub saturation: f64,
    /// Hue rotation in degrees, 0..360.
    pub hue: f64,
    /// Blur radius in pixels, 0..20.
    pub blur: f64,
}

impl ImageFilters {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Copy with every field forced into its editor range.
    pub fn clamped(self) -> Self {
        Self {
            brightness: self.brightness.clamp(-100.0, 100.0),
            contrast: self.contrast.clamp(-100.0, 100.0),
            saturation: self.saturation.clamp(-100.0, 100.0),
            hue: self.hue.rem_euclid(360.0),
            blur: self.blur.clamp(0.0, 20.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Source URL as resolved by the asset library.
    pub src: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default = "default_unit_scale")]
    pub scale_x: f64,
    #[serde(default = "default_unit_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub lock_aspect_ratio: bool,
    #[serde(default)]
    pub filters: ImageFilters,
}

fn default_unit_scale() -> f64 {
    1.0
}

impl ImageProps {
    /// On-canvas size after the display scale.
    pub fn display_size(&self) -> Vec2 {
        Vec2::new(
            self.width * self.scale_x.abs(),
            self.height * self.scale_y.abs(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rect,
    Circle,
    Triangle,
    Star,
    Heart,
    Line,
    Arrow,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    pub kind: ShapeKind,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgb8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Rgb8>,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default)]
    pub corner_radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: Rgb8,
    #[serde(default)]
    pub blur: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    /// Defaults to 0.5 when blurred, else 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl Shadow {
    pub fn effective_opacity(&self) -> f32 {
        match self.opacity {
            Some(o) => o.clamp(0.0, 1.0),
            None if self.blur > 0.0 => 0.5,
            None => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Border {
    pub width: f64,
    pub color: Rgb8,
    #[serde(default)]
    pub style: BorderStyle,
}

impl CanvasElement {
    /// New element with editor defaults: visible, unlocked, opaque, unrotated.
    pub fn new(id: impl Into<ElementId>, x: f64, y: f64, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            view: None,
            placeholder_id: None,
            x,
            y,
            rotation: 0.0,
            opacity: 1.0,
            z_index: 0,
            visible: true,
            locked: false,
            blend_mode: None,
            shadow: None,
            border: None,
            kind,
        }
    }

    pub fn kind_tag(&self) -> &'static str {
        match self.kind {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Shape(_) => "shape",
        }
    }

    /// Whether this element renders on `view` (global elements render everywhere).
    pub fn shows_on(&self, view: &ViewId) -> bool {
        self.view.as_ref().is_none_or(|v| v == view)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Unrotated box size. Text is measured with `measure`.
    pub fn box_size(&self, measure: &dyn TextMeasure) -> Vec2 {
        match &self.kind {
            ElementKind::Text(t) => measure_text_box(measure, t),
            ElementKind::Image(i) => i.display_size(),
            ElementKind::Shape(s) => Vec2::new(s.width, s.height),
        }
    }

    /// Axis-aligned bounds of the rotated box.
    pub fn rotated_bounds(&self, measure: &dyn TextMeasure) -> Rect {
        let size = self.box_size(measure);
        rotated_aabb(self.origin(), size.x, size.y, self.rotation)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/element.rs"]
mod tests;
