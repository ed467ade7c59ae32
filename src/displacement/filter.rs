use std::sync::Arc;

use crate::displacement::map::DisplacementMap;
use crate::displacement::settings::DisplacementSettings;
use crate::foundation::error::{DrapeError, DrapeResult};

/// Identity of one generated displacement filter. Strictly increasing per registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterToken(pub u64);

/// A generated map plus the token it was published under.
#[derive(Clone, Debug)]
pub struct DisplacementFilter {
    pub token: FilterToken,
    pub map: Arc<DisplacementMap>,
    /// Garment the map was derived from.
    pub source_url: String,
}

impl DisplacementFilter {
    /// Warp a canvas-sized premultiplied layer into `dst`.
    ///
    /// Each destination pixel inside the garment sprite samples `src` at
    /// `p + ((v - 0.5) * scale_x, (v - 0.5) * scale_y)` bilinearly; pixels outside are copied.
    pub fn apply(
        &self,
        src: &[u8],
        dst: &mut [u8],
        width: u32,
        height: u32,
        settings: &DisplacementSettings,
    ) -> DrapeResult<()> {
        let expected = (width as usize) * (height as usize) * 4;
        if src.len() != expected || dst.len() != expected {
            return Err(DrapeError::render(
                "displacement expects canvas-sized rgba8 buffers",
            ));
        }
        if settings.is_flat() {
            dst.copy_from_slice(src);
            return Ok(());
        }

        for y in 0..height {
            for x in 0..width {
                let idx = ((y as usize) * (width as usize) + x as usize) * 4;
                let px = match self.map.sample(i64::from(x), i64::from(y)) {
                    Some((vx, vy)) => {
                        let sx = x as f32 + (vx - 0.5) * settings.scale_x;
                        let sy = y as f32 + (vy - 0.5) * settings.scale_y;
                        sample_bilinear(src, width, height, sx, sy)
                    }
                    None => [src[idx], src[idx + 1], src[idx + 2], src[idx + 3]],
                };
                dst[idx..idx + 4].copy_from_slice(&px);
            }
        }
        Ok(())
    }
}

fn sample_px(src: &[u8], width: u32, height: u32, x: i64, y: i64) -> [f32; 4] {
    if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
        return [0.0; 4];
    }
    let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
    [
        f32::from(src[idx]),
        f32::from(src[idx + 1]),
        f32::from(src[idx + 2]),
        f32::from(src[idx + 3]),
    ]
}

/// Bilinear fetch at pixel coordinates `(x, y)`; samples outside the layer are transparent.
fn sample_bilinear(src: &[u8], width: u32, height: u32, x: f32, y: f32) -> [u8; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (ix, iy) = (x0 as i64, y0 as i64);

    let p00 = sample_px(src, width, height, ix, iy);
    let p10 = sample_px(src, width, height, ix + 1, iy);
    let p01 = sample_px(src, width, height, ix, iy + 1);
    let p11 = sample_px(src, width, height, ix + 1, iy + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] + (p10[c] - p00[c]) * fx;
        let bottom = p01[c] + (p11[c] - p01[c]) * fx;
        out[c] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
    }
    // Premultiplied channels may not exceed alpha after rounding.
    for c in 0..3 {
        out[c] = out[c].min(out[3]);
    }
    out
}

/// Owns the current displacement filter and issues tokens for it.
#[derive(Debug, Default)]
pub struct FilterRegistry {
    last_token: u64,
    current: Option<DisplacementFilter>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&DisplacementFilter> {
        self.current.as_ref()
    }

    pub fn current_token(&self) -> Option<FilterToken> {
        self.current.as_ref().map(|f| f.token)
    }

    /// Whether the current filter was built from `url` with `contrast_boost`.
    pub fn is_current_for(&self, url: &str, contrast_boost: f32) -> bool {
        self.current
            .as_ref()
            .is_some_and(|f| f.source_url == url && f.map.contrast_boost() == contrast_boost)
    }

    /// Replace the current filter wholesale. The previous map is dropped before the new one is
    /// published.
    pub fn publish(&mut self, source_url: impl Into<String>, map: DisplacementMap) -> FilterToken {
        self.current = None;
        self.last_token += 1;
        let token = FilterToken(self.last_token);
        self.current = Some(DisplacementFilter {
            token,
            map: Arc::new(map),
            source_url: source_url.into(),
        });
        tracing::debug!(token = token.0, "displacement filter published");
        token
    }

    /// Drop the current filter; layers render unwarped until the next publish.
    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            self.last_token += 1;
            tracing::debug!(token = self.last_token, "displacement filter cleared");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/displacement/filter.rs"]
mod tests;
