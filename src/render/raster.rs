//! `vello_cpu` rasterization of garments, design uploads, elements, and clip masks.

use std::collections::HashMap;
use std::sync::Arc;

use kurbo::{Affine, BezPath, PathEl, Rect, Shape, Vec2};

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Rgb8, Transform2D};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::model::element::{
    BorderStyle, CanvasElement, CurveShape, ElementKind, ImageProps, ShapeProps, TextAlign,
    TextProps,
};
use crate::model::placeholder::ClipShape;
use crate::render::filters::apply_image_filters;
use crate::render::shapes::{is_fillable, shape_path, stroke_outline};
use crate::text::layout::{FontBook, TextBrushRgba8, TextLayoutEngine};
use crate::text::measure::{TextMeasure, straight_text_width};

/// Inputs an element draw may need besides the element itself.
pub(crate) struct DrawInputs<'a> {
    pub(crate) fonts: &'a FontBook,
    pub(crate) measure: &'a dyn TextMeasure,
    /// Decoded image for image elements; `None` skips the element.
    pub(crate) image: Option<&'a Arc<PreparedImage>>,
}

/// Colour override used when drawing an element's silhouette (shadows).
#[derive(Clone, Copy, Debug)]
enum Fill {
    Own,
    Solid(Rgb8),
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

struct CachedPaint {
    // Keeps the source alive so its pointer key cannot be reused.
    _source: Arc<PreparedImage>,
    paint: ImagePaint,
    used: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PaintKey {
    pixels: usize,
    filters: [u64; 5],
}

/// Reusable rasterizer state: the render context, text shaping, and paint caches.
pub(crate) struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    text_engine: TextLayoutEngine,
    font_data: HashMap<String, vello_cpu::peniko::FontData>,
    paints: HashMap<PaintKey, CachedPaint>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("fonts", &self.font_data.len())
            .field("paints", &self.paints.len())
            .finish()
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub(crate) fn new() -> Self {
        Self {
            ctx: None,
            text_engine: TextLayoutEngine::new(),
            font_data: HashMap::new(),
            paints: HashMap::new(),
        }
    }

    /// Forget cached image paints (after a garment or asset teardown).
    pub(crate) fn clear_paints(&mut self) {
        self.paints.clear();
    }

    /// Drop paints no draw asked for since the previous sweep.
    ///
    /// Called once per frame, so edited filters and deleted assets do not pile up.
    pub(crate) fn sweep_paints(&mut self) {
        self.paints.retain(|_, c| std::mem::take(&mut c.used));
    }

    fn with_ctx_mut<R>(
        &mut self,
        dst: &mut vello_cpu::Pixmap,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> DrapeResult<R>,
    ) -> DrapeResult<R> {
        let (width, height) = (dst.width(), dst.height());
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx);
        if out.is_ok() {
            ctx.flush();
            ctx.render_to_pixmap(dst);
        }
        self.ctx = Some(ctx);
        out
    }

    fn image_paint(
        &mut self,
        img: &Arc<PreparedImage>,
        filters: Option<(&crate::model::element::ImageFilters, f64)>,
    ) -> DrapeResult<ImagePaint> {
        let key = PaintKey {
            pixels: Arc::as_ptr(&img.rgba8_premul) as usize,
            filters: filters
                .map(|(f, s)| {
                    let f = f.clamped();
                    [
                        f.brightness.to_bits(),
                        f.contrast.to_bits(),
                        f.saturation.to_bits(),
                        f.hue.to_bits(),
                        (f.blur * s).round().to_bits(),
                    ]
                })
                .unwrap_or_default(),
        };
        if let Some(c) = self.paints.get_mut(&key) {
            c.used = true;
            return Ok(c.paint.clone());
        }
        let filtered = match filters {
            Some((f, blur_scale)) => apply_image_filters(img, f, blur_scale)?,
            None => img.as_ref().clone(),
        };
        let pixmap =
            pixmap_from_premul_bytes(&filtered.rgba8_premul, filtered.width, filtered.height)?;
        let paint = ImagePaint {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: filtered.width,
            h: filtered.height,
        };
        self.paints.insert(
            key,
            CachedPaint {
                _source: Arc::clone(img),
                paint: paint.clone(),
                used: true,
            },
        );
        Ok(paint)
    }

    fn font_for(&mut self, key: &str, bytes: &Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
        self.font_data
            .entry(key.to_string())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
                    0,
                )
            })
            .clone()
    }

    /// Draw `img` stretched over `rect` (canvas pixels).
    pub(crate) fn draw_image_into(
        &mut self,
        img: &Arc<PreparedImage>,
        rect: Rect,
        dst: &mut vello_cpu::Pixmap,
    ) -> DrapeResult<()> {
        if img.width == 0 || img.height == 0 || rect.area() <= 0.0 {
            return Ok(());
        }
        let paint = self.image_paint(img, None)?;
        let tr = Affine::translate(rect.origin().to_vec2())
            * Affine::scale_non_uniform(
                rect.width() / f64::from(paint.w),
                rect.height() / f64::from(paint.h),
            );
        self.with_ctx_mut(dst, |_, ctx| {
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(paint.paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(paint.w),
                f64::from(paint.h),
            ));
            Ok(())
        })
    }

    /// Fill `clip` opaque white; everything else stays transparent.
    pub(crate) fn draw_clip_mask(
        &mut self,
        clip: &ClipShape,
        dst: &mut vello_cpu::Pixmap,
    ) -> DrapeResult<()> {
        let path = bezpath_to_cpu(&clip.to_bez_path());
        self.with_ctx_mut(dst, |_, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_fill_rule(vello_cpu::peniko::Fill::EvenOdd);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            ctx.fill_path(&path);
            Ok(())
        })
    }

    /// Draw the element at full opacity into `dst`. Opacity and blending happen at composite
    /// time. Returns `false` when the element was skipped for a missing asset.
    pub(crate) fn draw_element(
        &mut self,
        el: &CanvasElement,
        inputs: &DrawInputs<'_>,
        dst: &mut vello_cpu::Pixmap,
    ) -> DrapeResult<bool> {
        if let ElementKind::Image(_) = &el.kind
            && inputs.image.is_none()
        {
            return Ok(false);
        }
        let size = el.box_size(inputs.measure);
        if !(size.x > 0.0 && size.y > 0.0) {
            return Ok(true);
        }
        let base = Transform2D::centered_box(el.origin(), size, el.rotation).to_affine();

        self.with_ctx_mut(dst, |this, ctx| {
            if let Some(shadow) = el.shadow {
                let op = shadow.effective_opacity();
                if op > 0.0 {
                    let shifted =
                        Affine::translate(Vec2::new(shadow.offset_x, shadow.offset_y)) * base;
                    ctx.push_opacity_layer(op);
                    this.draw_body(ctx, el, inputs, shifted, size, Fill::Solid(shadow.color))?;
                    ctx.pop_layer();
                }
            }
            this.draw_body(ctx, el, inputs, base, size, Fill::Own)?;
            if let Some(border) = el.border
                && border.width > 0.0
            {
                let outline = stroke_outline(
                    &Rect::from_origin_size((0.0, 0.0), (size.x, size.y)).to_path(0.1),
                    border.width,
                    border.style,
                );
                fill_local(ctx, base, &outline, border.color);
            }
            Ok(())
        })?;
        Ok(true)
    }

    fn draw_body(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        el: &CanvasElement,
        inputs: &DrawInputs<'_>,
        base: Affine,
        size: Vec2,
        fill: Fill,
    ) -> DrapeResult<()> {
        match &el.kind {
            ElementKind::Text(t) => self.draw_text(ctx, t, inputs, base, size, fill),
            ElementKind::Image(i) => match inputs.image {
                Some(img) => self.draw_image(ctx, i, img, base, size, fill),
                None => Ok(()),
            },
            ElementKind::Shape(s) => {
                draw_shape(ctx, s, base, fill);
                Ok(())
            }
        }
    }

    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        props: &ImageProps,
        img: &Arc<PreparedImage>,
        base: Affine,
        size: Vec2,
        fill: Fill,
    ) -> DrapeResult<()> {
        if let Fill::Solid(c) = fill {
            fill_local(
                ctx,
                base,
                &Rect::from_origin_size((0.0, 0.0), (size.x, size.y)).to_path(0.1),
                c,
            );
            return Ok(());
        }
        if img.width == 0 || img.height == 0 {
            return Ok(());
        }
        let blur_scale = f64::from(img.width) / size.x.max(1e-6);
        let paint = self.image_paint(img, Some((&props.filters, blur_scale)))?;
        let half = size * 0.5;
        let flip = Affine::translate(half)
            * Affine::scale_non_uniform(
                if props.flip_x { -1.0 } else { 1.0 },
                if props.flip_y { -1.0 } else { 1.0 },
            )
            * Affine::translate(-half);
        let to_box = Affine::scale_non_uniform(
            size.x / f64::from(paint.w),
            size.y / f64::from(paint.h),
        );
        ctx.set_transform(affine_to_cpu(base * flip * to_box));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint.paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(paint.w),
            f64::from(paint.h),
        ));
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        t: &TextProps,
        inputs: &DrawInputs<'_>,
        base: Affine,
        size: Vec2,
        fill: Fill,
    ) -> DrapeResult<()> {
        if t.text.is_empty() {
            return Ok(());
        }
        let (key, bytes) = inputs
            .fonts
            .resolve(&t.font_family)
            .ok_or_else(|| DrapeError::asset_load(&t.font_family, "no font registered"))?;
        let key = key.to_string();
        let bytes = Arc::clone(bytes);
        let font = self.font_for(&key, &bytes);
        let color = match fill {
            Fill::Own => t.fill,
            Fill::Solid(c) => c,
        };
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255));
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: 255,
        };
        let line_h = inputs.measure.line_height(t.font_size);

        if t.curve.is_active() {
            let line = t.text.replace('\n', " ");
            let layout = self.text_engine.layout_line(
                &line,
                &key,
                &bytes,
                t.font_size as f32,
                t.letter_spacing as f32,
                brush,
            )?;
            let total = straight_text_width(inputs.measure, t).max(f64::from(layout.width()));
            let arc = ArcLayout::new(t.curve.shape, t.curve.radius, total, size, line_h);
            for run in glyph_runs(&layout) {
                for g in run.positioned_glyphs() {
                    let centre = f64::from(g.x) + f64::from(g.advance) * 0.5;
                    let placed = arc.place(centre);
                    ctx.set_transform(affine_to_cpu(base * placed));
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(std::iter::once(vello_cpu::Glyph {
                            id: g.id,
                            x: -g.advance * 0.5,
                            y: 0.0,
                        }));
                }
            }
            return Ok(());
        }

        for (i, line) in t.text.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            let layout = self.text_engine.layout_line(
                line,
                &key,
                &bytes,
                t.font_size as f32,
                t.letter_spacing as f32,
                brush,
            )?;
            let lw = f64::from(layout.width());
            let dx = match t.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => (size.x - lw) * 0.5,
                TextAlign::Right => size.x - lw,
            };
            let line_tr = base * Affine::translate((dx, line_h * i as f64));
            ctx.set_transform(affine_to_cpu(line_tr));
            for run in glyph_runs(&layout) {
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

fn glyph_runs(
    layout: &parley::Layout<TextBrushRgba8>,
) -> impl Iterator<Item = parley::layout::GlyphRun<'_, TextBrushRgba8>> {
    layout.lines().flat_map(|line| {
        line.items().filter_map(|item| match item {
            parley::layout::PositionedLayoutItem::GlyphRun(run) => Some(run),
            _ => None,
        })
    })
}

/// Maps a position along the straight baseline onto the curve inside the element box.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ArcLayout {
    shape: CurveShape,
    radius: f64,
    total: f64,
    centre: kurbo::Point,
}

impl ArcLayout {
    pub(crate) fn new(shape: CurveShape, radius: f64, total: f64, size: Vec2, line_h: f64) -> Self {
        let r = radius.max(1e-6);
        let ascent = line_h / 1.2 * 0.8;
        let centre = match shape {
            CurveShape::ArchUp => kurbo::Point::new(size.x * 0.5, ascent + r),
            CurveShape::ArchDown => kurbo::Point::new(size.x * 0.5, size.y - r - (line_h - ascent)),
            CurveShape::Circle | CurveShape::None => kurbo::Point::new(size.x * 0.5, size.y * 0.5),
        };
        Self {
            shape,
            radius: r,
            total,
            centre,
        }
    }

    /// Baseline placement for a glyph whose centre sits `s` along the straight line.
    pub(crate) fn place(&self, s: f64) -> Affine {
        let r = self.radius;
        match self.shape {
            CurveShape::ArchDown => {
                let theta = (s - self.total * 0.5) / r;
                let p = self.centre + Vec2::new(theta.sin(), theta.cos()) * r;
                Affine::translate(p.to_vec2()) * Affine::rotate(-theta)
            }
            CurveShape::Circle => {
                let theta = s / self.total.max(1e-6) * std::f64::consts::TAU;
                let p = self.centre + Vec2::new(theta.sin(), -theta.cos()) * r;
                Affine::translate(p.to_vec2()) * Affine::rotate(theta)
            }
            CurveShape::ArchUp | CurveShape::None => {
                let theta = (s - self.total * 0.5) / r;
                let p = self.centre + Vec2::new(theta.sin(), -theta.cos()) * r;
                Affine::translate(p.to_vec2()) * Affine::rotate(theta)
            }
        }
    }
}

fn draw_shape(ctx: &mut vello_cpu::RenderContext, s: &ShapeProps, base: Affine, fill: Fill) {
    let path = shape_path(s.kind, s.width, s.height, s.corner_radius);
    let (fill_color, stroke_color) = match fill {
        Fill::Own => (s.fill, s.stroke),
        Fill::Solid(c) => (s.fill.map(|_| c), s.stroke.map(|_| c)),
    };
    if is_fillable(s.kind)
        && let Some(c) = fill_color
    {
        fill_local(ctx, base, &path, c);
    }
    let stroke_width = if is_fillable(s.kind) {
        s.stroke_width
    } else {
        s.stroke_width.max(1.0)
    };
    let line_color = if is_fillable(s.kind) {
        stroke_color
    } else {
        stroke_color.or(fill_color).or(Some(Rgb8::BLACK))
    };
    if stroke_width > 0.0
        && let Some(c) = line_color
    {
        let outline = stroke_outline(&path, stroke_width, BorderStyle::Solid);
        fill_local(ctx, base, &outline, c);
    }
}

fn fill_local(ctx: &mut vello_cpu::RenderContext, tr: Affine, path: &BezPath, color: Rgb8) {
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255));
    ctx.fill_path(&bezpath_to_cpu(path));
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> DrapeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| DrapeError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| DrapeError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(DrapeError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
