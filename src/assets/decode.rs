use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> DrapeResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(DrapeError::render(format!(
                "image byte length {} does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Straight-alpha copy for resampling and PNG export.
    pub fn to_straight_rgba(&self) -> image::RgbaImage {
        let mut bytes = self.rgba8_premul.as_ref().clone();
        unpremultiply_rgba8_in_place(&mut bytes);
        image::RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

/// Largest side an SVG design is rasterized at.
const SVG_MAX_SIDE: u32 = 2048;

/// Largest side a bitmap may have; render surfaces are addressed with `u16`.
pub const BITMAP_MAX_SIDE: u32 = u16::MAX as u32;

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> DrapeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    if dyn_img.width() > BITMAP_MAX_SIDE || dyn_img.height() > BITMAP_MAX_SIDE {
        return Err(DrapeError::validation(format!(
            "image is {}x{}; sides above {BITMAP_MAX_SIDE} px are not supported",
            dyn_img.width(),
            dyn_img.height()
        )));
    }
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> DrapeResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Decode a design upload: SVG documents are rasterized, everything else goes through `image`.
pub fn decode_design(bytes: &[u8]) -> DrapeResult<PreparedImage> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        let (w, h) = svg_raster_size(&tree)?;
        let data = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
        return PreparedImage::from_premul(w, h, data);
    }
    decode_image(bytes)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && text.contains("<svg"))
}

/// Intrinsic SVG size, scaled down so the long side stays within [`SVG_MAX_SIDE`].
fn svg_raster_size(tree: &usvg::Tree) -> DrapeResult<(u32, u32)> {
    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(DrapeError::render("svg has invalid width/height"));
    }
    let s = (SVG_MAX_SIDE as f32 / w.max(h)).min(1.0);
    Ok((
        ((w * s).ceil() as u32).max(1),
        ((h * s).ceil() as u32).max(1),
    ))
}

fn rasterize_svg_to_premul_rgba8(tree: &usvg::Tree, width: u32, height: u32) -> DrapeResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| DrapeError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
