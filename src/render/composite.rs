//! Premultiplied RGBA8 compositing kernels used by the view pipeline.

use crate::foundation::core::Rgb8;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};
use crate::model::blend::BlendMode;

fn check_pair(dst: &[u8], src: &[u8], what: &str) -> DrapeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(DrapeError::render(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

/// Multiply every premultiplied channel by the tint colour. Alpha is kept.
pub(crate) fn tint_multiply_in_place(buf: &mut [u8], tint: Rgb8) {
    let (tr, tg, tb) = (u16::from(tint.r), u16::from(tint.g), u16::from(tint.b));
    for px in buf.chunks_exact_mut(4) {
        px[0] = mul_div255_u8(u16::from(px[0]), tr);
        px[1] = mul_div255_u8(u16::from(px[1]), tg);
        px[2] = mul_div255_u8(u16::from(px[2]), tb);
    }
}

/// Scale `buf` by the alpha of `mask`.
pub(crate) fn mask_apply_alpha_in_place(buf: &mut [u8], mask: &[u8]) -> DrapeResult<()> {
    check_pair(buf, mask, "mask_apply_alpha_in_place")?;
    for (d, m) in buf.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        if w == 255 {
            continue;
        }
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), w);
        }
    }
    Ok(())
}

pub(crate) fn premul_over_in_place_opacity(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
) -> DrapeResult<()> {
    check_pair(dst, src, "premul_over_in_place_opacity")?;
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return Ok(());
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);

        d[3] = add_sat_u8(sa, mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = add_sat_u8(sc, dc);
        }
    }
    Ok(())
}

/// Composite `src` over `dst` with `blend`, scaling the source by `opacity`.
pub(crate) fn composite_over_rgba8_premul(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    blend: BlendMode,
) -> DrapeResult<()> {
    check_pair(dst, src, "composite_over_rgba8_premul")?;

    // Dispatch once per layer; each arm monomorphizes its own kernel.
    match blend {
        BlendMode::Normal => premul_over_in_place_opacity(dst, src, opacity),
        BlendMode::Multiply => blend_over(dst, src, opacity, separable(|s, d| s * d)),
        BlendMode::Screen => blend_over(dst, src, opacity, separable(|s, d| s + d - s * d)),
        BlendMode::Overlay => blend_over(dst, src, opacity, separable(|s, d| hard_light(d, s))),
        BlendMode::Darken => blend_over(dst, src, opacity, separable(f32::min)),
        BlendMode::Lighten => blend_over(dst, src, opacity, separable(f32::max)),
        BlendMode::ColorDodge => blend_over(
            dst,
            src,
            opacity,
            separable(|s, d| {
                if d <= 0.0 {
                    0.0
                } else if s >= 1.0 {
                    1.0
                } else {
                    (d / (1.0 - s)).min(1.0)
                }
            }),
        ),
        BlendMode::ColorBurn => blend_over(
            dst,
            src,
            opacity,
            separable(|s, d| {
                if d >= 1.0 {
                    1.0
                } else if s <= 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - d) / s).min(1.0)
                }
            }),
        ),
        BlendMode::HardLight => blend_over(dst, src, opacity, separable(hard_light)),
        BlendMode::SoftLight => blend_over(
            dst,
            src,
            opacity,
            separable(|s, d| {
                if s <= 0.5 {
                    d - (1.0 - 2.0 * s) * d * (1.0 - d)
                } else {
                    let g = if d <= 0.25 {
                        ((16.0 * d - 12.0) * d + 4.0) * d
                    } else {
                        d.sqrt()
                    };
                    d + (2.0 * s - 1.0) * (g - d)
                }
            }),
        ),
        BlendMode::Difference => blend_over(dst, src, opacity, separable(|s, d| (d - s).abs())),
        BlendMode::Exclusion => {
            blend_over(dst, src, opacity, separable(|s, d| d + s - 2.0 * d * s))
        }
        BlendMode::Hue => blend_over(dst, src, opacity, |s, d| {
            set_lum(set_sat(s, sat(d)), lum(d))
        }),
        BlendMode::Saturation => blend_over(dst, src, opacity, |s, d| {
            set_lum(set_sat(d, sat(s)), lum(d))
        }),
        BlendMode::Color => blend_over(dst, src, opacity, |s, d| set_lum(s, lum(d))),
        BlendMode::Luminosity => blend_over(dst, src, opacity, |s, d| set_lum(d, lum(s))),
    }
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

#[inline(always)]
fn separable(f: impl Fn(f32, f32) -> f32) -> impl Fn([f32; 3], [f32; 3]) -> [f32; 3] {
    move |s, d| [f(s[0], d[0]), f(s[1], d[1]), f(s[2], d[2])]
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && l - n > 0.0 {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 && x - l > 0.0 {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    if max <= min {
        return [0.0; 3];
    }
    c.map(|v| (v - min) * s / (max - min))
}

fn unpremul(p: [f32; 3], a: f32) -> [f32; 3] {
    if a > 0.0 {
        [
            (p[0] / a).clamp(0.0, 1.0),
            (p[1] / a).clamp(0.0, 1.0),
            (p[2] / a).clamp(0.0, 1.0),
        ]
    } else {
        [0.0; 3]
    }
}

#[inline(always)]
fn blend_over<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F) -> DrapeResult<()>
where
    F: Fn([f32; 3], [f32; 3]) -> [f32; 3],
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return Ok(());
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sp = [
            f32::from(s[0]) / 255.0 * opacity,
            f32::from(s[1]) / 255.0 * opacity,
            f32::from(s[2]) / 255.0 * opacity,
        ];
        let sa = f32::from(s[3]) / 255.0 * opacity;
        let dp = [
            f32::from(d[0]) / 255.0,
            f32::from(d[1]) / 255.0,
            f32::from(d[2]) / 255.0,
        ];
        let da = f32::from(d[3]) / 255.0;

        let b = blend_fn(unpremul(sp, sa), unpremul(dp, da));
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);
        for c in 0..3 {
            let out = sp[c] * (1.0 - da) + dp[c] * (1.0 - sa) + b[c].clamp(0.0, 1.0) * sa * da;
            d[c] = (out.clamp(0.0, out_a) * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
