fn default_scale() -> f32 {
    20.0
}

fn default_contrast_boost() -> f32 {
    1.5
}

/// User-tunable displacement strength, shared by every view of a document.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplacementSettings {
    /// Horizontal warp amplitude in pixels at full luminance deviation.
    #[serde(default = "default_scale")]
    pub scale_x: f32,
    #[serde(default = "default_scale")]
    pub scale_y: f32,
    /// Multiplier on the luminance deviation from the mean.
    #[serde(default = "default_contrast_boost")]
    pub contrast_boost: f32,
}

impl Default for DisplacementSettings {
    fn default() -> Self {
        Self {
            scale_x: default_scale(),
            scale_y: default_scale(),
            contrast_boost: default_contrast_boost(),
        }
    }
}

impl DisplacementSettings {
    pub const MAX_SCALE: f32 = 100.0;
    pub const MIN_BOOST: f32 = 1.0;
    pub const MAX_BOOST: f32 = 5.0;

    /// Force every field into its accepted range. Non-finite values fall back to defaults.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        let fix = |v: f32, lo: f32, hi: f32, fallback: f32| {
            if v.is_finite() { v.clamp(lo, hi) } else { fallback }
        };
        Self {
            scale_x: fix(self.scale_x, 0.0, Self::MAX_SCALE, d.scale_x),
            scale_y: fix(self.scale_y, 0.0, Self::MAX_SCALE, d.scale_y),
            contrast_boost: fix(
                self.contrast_boost,
                Self::MIN_BOOST,
                Self::MAX_BOOST,
                d.contrast_boost,
            ),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.scale_x == 0.0 && self.scale_y == 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/displacement/settings.rs"]
mod tests;
