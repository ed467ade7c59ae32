//! Raster image adjustments: colour matrix (brightness, contrast, saturation, hue) and box blur.

use crate::assets::decode::PreparedImage;
use crate::foundation::error::DrapeResult;
use crate::model::element::ImageFilters;

/// Row-major 4x5 colour matrix over straight RGBA in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ColorMatrix(pub(crate) [f32; 20]);

impl ColorMatrix {
    pub(crate) const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    pub(crate) fn brightness(offset: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.0[4] = offset;
        m.0[9] = offset;
        m.0[14] = offset;
        m
    }

    pub(crate) fn contrast(factor: f32) -> Self {
        let t = 0.5 * (1.0 - factor);
        Self([
            factor, 0.0, 0.0, 0.0, t, //
            0.0, factor, 0.0, 0.0, t, //
            0.0, 0.0, factor, 0.0, t, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    pub(crate) fn saturation(s: f32) -> Self {
        let (lr, lg, lb) = (0.2126 * (1.0 - s), 0.7152 * (1.0 - s), 0.0722 * (1.0 - s));
        Self([
            lr + s, lg, lb, 0.0, 0.0, //
            lr, lg + s, lb, 0.0, 0.0, //
            lr, lg, lb + s, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    pub(crate) fn hue_rotate(deg: f32) -> Self {
        let (sin, cos) = deg.to_radians().sin_cos();
        Self([
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
            0.0,
            0.0,
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
            0.0,
            0.0,
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            0.0,
        ])
    }

    /// `next ∘ self`: apply `self` first.
    pub(crate) fn then(self, next: Self) -> Self {
        let a = &self.0;
        let b = &next.0;
        let mut out = [0.0f32; 20];
        for row in 0..4 {
            for col in 0..5 {
                let mut v = 0.0;
                for k in 0..4 {
                    v += b[row * 5 + k] * a[k * 5 + col];
                }
                if col == 4 {
                    v += b[row * 5 + 4];
                }
                out[row * 5 + col] = v;
            }
        }
        Self(out)
    }

    pub(crate) fn for_filters(f: &ImageFilters) -> Self {
        let mut m = Self::IDENTITY;
        if f.brightness != 0.0 {
            m = m.then(Self::brightness((f.brightness / 100.0) as f32));
        }
        if f.contrast != 0.0 {
            m = m.then(Self::contrast((1.0 + f.contrast / 100.0) as f32));
        }
        if f.saturation != 0.0 {
            m = m.then(Self::saturation((1.0 + f.saturation / 100.0) as f32));
        }
        if f.hue != 0.0 {
            m = m.then(Self::hue_rotate(f.hue as f32));
        }
        m
    }
}

pub(crate) fn color_matrix_rgba8_premul(src: &[u8], dst: &mut [u8], m: &ColorMatrix) {
    debug_assert_eq!(src.len(), dst.len());
    let m = &m.0;
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let pa = f32::from(s[3]) / 255.0;
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let r = f32::from(s[0]) / 255.0 * inv_a;
        let g = f32::from(s[1]) / 255.0 * inv_a;
        let b = f32::from(s[2]) / 255.0 * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        d[0] = (out_r * out_a * 255.0).round() as u8;
        d[1] = (out_g * out_a * 255.0).round() as u8;
        d[2] = (out_b * out_a * 255.0).round() as u8;
        d[3] = (out_a * 255.0).round() as u8;
    }
}

/// Uniform kernel of `2 * radius + 1` taps in Q16, summing to exactly 65536.
pub(crate) fn box_kernel_q16(radius: u32) -> Vec<u32> {
    let taps = 2 * radius as usize + 1;
    let w = 65536 / taps as u32;
    let mut k = vec![w; taps];
    k[taps / 2] += 65536 - w * taps as u32;
    k
}

pub(crate) fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    tmp: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }
    horizontal_blur_q16(src, tmp, width, height, kernel_q16);
    vertical_blur_q16(tmp, dst, width, height, kernel_q16);
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    for y in 0..i64::from(height) {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i64 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out + c] = q16_to_u8(*a);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let h = i64::from(height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i64 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out + c] = q16_to_u8(*a);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

/// Apply `filters` to a source image. `blur_scale` converts display-pixel blur radii into
/// source pixels.
pub(crate) fn apply_image_filters(
    img: &PreparedImage,
    filters: &ImageFilters,
    blur_scale: f64,
) -> DrapeResult<PreparedImage> {
    let f = filters.clamped();
    if f.is_identity() {
        return Ok(img.clone());
    }
    let src = img.rgba8_premul.as_slice();
    let mut out = src.to_vec();

    let m = ColorMatrix::for_filters(&f);
    if m != ColorMatrix::IDENTITY {
        color_matrix_rgba8_premul(src, &mut out, &m);
    }

    let radius = (f.blur * blur_scale).round().max(0.0) as u32;
    if radius > 0 && img.width > 0 && img.height > 0 {
        let k = box_kernel_q16(radius);
        let input = out.clone();
        let mut tmp = vec![0u8; out.len()];
        blur_rgba8_premul_q16(&input, &mut out, &mut tmp, img.width, img.height, &k);
    }

    PreparedImage::from_premul(img.width, img.height, out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/filters.rs"]
mod tests;
