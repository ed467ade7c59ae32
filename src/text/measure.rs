use std::cell::RefCell;

use crate::foundation::core::{Rect, Vec2};
use crate::model::element::{CurveShape, FontStyle, TextProps};
use crate::text::layout::{FontBook, TextBrushRgba8, TextLayoutEngine};

/// Glyph metrics source for the text constraint algorithm.
pub trait TextMeasure {
    /// Advance width of one line, excluding letter spacing.
    fn line_advance(&self, line: &str, family: &str, font_size: f64, style: FontStyle) -> f64;

    /// Height of one line of text.
    fn line_height(&self, font_size: f64) -> f64;
}

/// Deterministic metrics: every character advances by a fixed fraction of the font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproxTextMeasure {
    pub advance_em: f64,
    pub line_height: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            advance_em: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn line_advance(&self, line: &str, _family: &str, font_size: f64, style: FontStyle) -> f64 {
        let weight = match style {
            FontStyle::Bold | FontStyle::BoldItalic => 1.05,
            FontStyle::Normal | FontStyle::Italic => 1.0,
        };
        line.chars().count() as f64 * font_size * self.advance_em * weight
    }

    fn line_height(&self, font_size: f64) -> f64 {
        font_size * self.line_height
    }
}

/// Metrics from real font shaping, resolving families the same way the rasterizer does.
/// With an empty font book every measurement uses `fallback`.
pub struct ParleyTextMeasure {
    engine: RefCell<TextLayoutEngine>,
    fonts: FontBook,
    fallback: ApproxTextMeasure,
}

impl ParleyTextMeasure {
    pub fn new(fonts: FontBook, fallback: ApproxTextMeasure) -> Self {
        Self {
            engine: RefCell::new(TextLayoutEngine::new()),
            fonts,
            fallback,
        }
    }
}

impl TextMeasure for ParleyTextMeasure {
    fn line_advance(&self, line: &str, family: &str, font_size: f64, style: FontStyle) -> f64 {
        let Some((key, bytes)) = self.fonts.resolve(family) else {
            return self.fallback.line_advance(line, family, font_size, style);
        };
        let mut engine = self.engine.borrow_mut();
        match engine.layout_line(
            line,
            key,
            bytes,
            font_size as f32,
            0.0,
            TextBrushRgba8::default(),
        ) {
            Ok(layout) => f64::from(layout.width()),
            Err(e) => {
                tracing::warn!(family, error = %e, "text shaping failed, using approximate metrics");
                self.fallback.line_advance(line, family, font_size, style)
            }
        }
    }

    fn line_height(&self, font_size: f64) -> f64 {
        self.fallback.line_height(font_size)
    }
}

/// Width of the widest line including `letterSpacing · (charCount − 1)`.
pub fn straight_text_width(measure: &dyn TextMeasure, t: &TextProps) -> f64 {
    t.text
        .split('\n')
        .map(|line| {
            let n = line.chars().count();
            let spacing = t.letter_spacing * n.saturating_sub(1) as f64;
            measure.line_advance(line, &t.font_family, t.font_size, t.font_style) + spacing
        })
        .fold(0.0, f64::max)
}

/// Unrotated box of a text element.
///
/// Empty text keeps a `fontSize / 2 × fontSize` box so it stays draggable. Curved text uses the
/// extent of the arc it is laid along.
pub fn measure_text_box(measure: &dyn TextMeasure, t: &TextProps) -> Vec2 {
    if t.text.is_empty() {
        return Vec2::new(t.font_size * 0.5, t.font_size);
    }
    let width = straight_text_width(measure, t);
    let line_h = measure.line_height(t.font_size);
    if t.curve.is_active() {
        return curved_text_size(width, line_h, t.curve.radius, t.curve.shape);
    }
    let lines = t.text.split('\n').count().max(1) as f64;
    Vec2::new(width, line_h * lines)
}

/// Extent of text of `text_width` laid along a curve of `radius`.
pub fn curved_text_size(text_width: f64, line_h: f64, radius: f64, shape: CurveShape) -> Vec2 {
    let r = radius.max(1e-6);
    match shape {
        CurveShape::None => Vec2::new(text_width, line_h),
        CurveShape::Circle => Vec2::new(2.0 * r, 2.0 * r),
        CurveShape::ArchUp | CurveShape::ArchDown => {
            let sweep = (text_width / r).min(std::f64::consts::TAU);
            let half = sweep * 0.5;
            let chord = if sweep >= std::f64::consts::PI {
                2.0 * r
            } else {
                2.0 * r * half.sin()
            };
            let sagitta = r * (1.0 - half.cos());
            Vec2::new(chord, sagitta + line_h)
        }
    }
}

/// Allowed path radius for curved text: at least half the text width, at most the space the
/// region offers (half its width for arches, half its smaller side for a full circle).
///
/// When the region is too small for both limits the upper bound wins.
pub fn curve_radius_bounds(text_width: f64, region: Rect, shape: CurveShape) -> (f64, f64) {
    let max = match shape {
        CurveShape::Circle => region.width().min(region.height()) * 0.5,
        CurveShape::None | CurveShape::ArchUp | CurveShape::ArchDown => region.width() * 0.5,
    };
    let min = (text_width * 0.5).min(max);
    (min, max)
}

pub fn clamp_curve_radius(radius: f64, text_width: f64, region: Rect, shape: CurveShape) -> f64 {
    let (min, max) = curve_radius_bounds(text_width, region, shape);
    radius.clamp(min, max)
}

#[cfg(test)]
#[path = "../../tests/unit/text/measure.rs"]
mod tests;
