use crate::assets::decode::PreparedImage;
use crate::foundation::core::Rect;
use crate::foundation::error::{DrapeError, DrapeResult};

/// Boosted garment luminance, one texel per canvas pixel of the garment sprite.
///
/// Texels are RGBA8 with the boosted value in R (x displacement) and G (y displacement), stored
/// as `128 + (v - 0.5) * 254` so that 128 decodes to exactly "no offset". Transparent garment
/// pixels encode as neutral.
#[derive(Clone, Debug)]
pub struct DisplacementMap {
    placement: Rect,
    origin_x: i64,
    origin_y: i64,
    width: u32,
    height: u32,
    texels: Vec<u8>,
    mean_luminance: f32,
    contrast_boost: f32,
}

impl DisplacementMap {
    /// Build the map for a garment drawn at `placement` (canvas pixels).
    #[tracing::instrument(skip(garment), fields(w = garment.width, h = garment.height))]
    pub fn generate(garment: &PreparedImage, placement: Rect, contrast_boost: f32) -> DrapeResult<Self> {
        if garment.width == 0 || garment.height == 0 {
            return Err(DrapeError::render("garment image is empty"));
        }
        if !(placement.width() >= 1.0 && placement.height() >= 1.0) {
            return Err(DrapeError::render("garment placement is degenerate"));
        }
        let width = placement.width().round() as u32;
        let height = placement.height().round() as u32;

        let straight = garment.to_straight_rgba();
        let resized = image::imageops::resize(
            &straight,
            width,
            height,
            image::imageops::FilterType::Triangle,
        );

        let mut luma = Vec::<Option<f32>>::with_capacity((width as usize) * (height as usize));
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for px in resized.pixels() {
            let [r, g, b, a] = px.0;
            if a == 0 {
                luma.push(None);
                continue;
            }
            let l = (0.2126 * f32::from(r) + 0.7152 * f32::from(g) + 0.0722 * f32::from(b)) / 255.0;
            sum += f64::from(l);
            count += 1;
            luma.push(Some(l));
        }
        let mean = if count == 0 { 0.5 } else { (sum / count as f64) as f32 };

        let mut texels = Vec::with_capacity(luma.len() * 4);
        for l in luma {
            let v = match l {
                Some(l) => encode(boosted(l, mean, contrast_boost)),
                None => 128,
            };
            texels.extend_from_slice(&[v, v, 0, 255]);
        }

        Ok(Self {
            placement,
            origin_x: placement.x0.round() as i64,
            origin_y: placement.y0.round() as i64,
            width,
            height,
            texels,
            mean_luminance: mean,
            contrast_boost,
        })
    }

    pub fn placement(&self) -> Rect {
        self.placement
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mean_luminance(&self) -> f32 {
        self.mean_luminance
    }

    pub fn contrast_boost(&self) -> f32 {
        self.contrast_boost
    }

    pub fn texels(&self) -> &[u8] {
        &self.texels
    }

    /// Displacement values in `[0, 1]` for the canvas pixel `(x, y)`, or `None` outside the
    /// garment sprite.
    pub fn sample(&self, x: i64, y: i64) -> Option<(f32, f32)> {
        let tx = x - self.origin_x;
        let ty = y - self.origin_y;
        if tx < 0 || ty < 0 || tx >= i64::from(self.width) || ty >= i64::from(self.height) {
            return None;
        }
        let idx = ((ty as usize) * (self.width as usize) + tx as usize) * 4;
        Some((decode(self.texels[idx]), decode(self.texels[idx + 1])))
    }
}

fn boosted(l: f32, mean: f32, boost: f32) -> f32 {
    (0.5 + (l - mean) * boost).clamp(0.0, 1.0)
}

fn encode(v: f32) -> u8 {
    (128.0 + (v - 0.5) * 254.0).round().clamp(1.0, 255.0) as u8
}

fn decode(t: u8) -> f32 {
    (0.5 + (f32::from(t) - 128.0) / 254.0).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/displacement/map.rs"]
mod tests;
