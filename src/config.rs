use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::units::{CanvasLayout, PhysicalSize};

/// Engine-wide tunables.
///
/// Every field has a default matching the editor's stock behavior, so an empty JSON object is a
/// valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Canvas size and padding shared by every view.
    #[serde(default)]
    pub canvas: CanvasLayout,
    /// Scale used when a view's physical size is zero or negative.
    #[serde(default = "default_fallback_px_per_inch")]
    pub fallback_px_per_inch: f64,
    /// Physical garment size assumed when the catalog omits it.
    #[serde(default = "default_physical_size")]
    pub default_physical_size: PhysicalSize,
    /// Normalized tint luminance below which a garment counts as dark.
    #[serde(default = "default_dark_threshold")]
    pub dark_luminance_threshold: f32,
    /// Opacity of the default multiply blend on light garments.
    #[serde(default = "default_light_opacity")]
    pub light_default_opacity: f32,
    /// Maximum number of undo snapshots.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Average glyph advance as a fraction of the font size, for approximate measurement.
    #[serde(default = "default_glyph_advance")]
    pub glyph_advance_em: f64,
    /// Text box height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    /// Arrow-key nudge distance in pixels.
    #[serde(default = "default_nudge_px")]
    pub nudge_px: f64,
    /// Offset applied to duplicated elements.
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset_px: f64,
    /// Garment/asset loads older than this are reported as failed.
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
}

fn default_fallback_px_per_inch() -> f64 {
    10.0
}

fn default_physical_size() -> PhysicalSize {
    PhysicalSize {
        width_in: 20.0,
        height_in: 24.0,
    }
}

fn default_dark_threshold() -> f32 {
    0.5
}

fn default_light_opacity() -> f32 {
    0.9
}

fn default_history_depth() -> usize {
    50
}

fn default_glyph_advance() -> f64 {
    0.6
}

fn default_line_height() -> f64 {
    1.2
}

fn default_nudge_px() -> f64 {
    1.0
}

fn default_duplicate_offset() -> f64 {
    20.0
}

fn default_load_timeout_ms() -> u64 {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasLayout::default(),
            fallback_px_per_inch: default_fallback_px_per_inch(),
            default_physical_size: default_physical_size(),
            dark_luminance_threshold: default_dark_threshold(),
            light_default_opacity: default_light_opacity(),
            history_depth: default_history_depth(),
            glyph_advance_em: default_glyph_advance(),
            line_height: default_line_height(),
            nudge_px: default_nudge_px(),
            duplicate_offset_px: default_duplicate_offset(),
            load_timeout_ms: default_load_timeout_ms(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json(s: &str) -> DrapeResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| DrapeError::validation(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> DrapeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DrapeError::validation(format!("open engine config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| DrapeError::validation(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> DrapeResult<()> {
        self.canvas.validate()?;
        if !(self.fallback_px_per_inch.is_finite() && self.fallback_px_per_inch > 0.0) {
            return Err(DrapeError::validation(
                "fallback_px_per_inch must be finite and > 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.dark_luminance_threshold) {
            return Err(DrapeError::validation(
                "dark_luminance_threshold must be in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.light_default_opacity) {
            return Err(DrapeError::validation(
                "light_default_opacity must be in [0, 1]",
            ));
        }
        if self.glyph_advance_em <= 0.0 || self.line_height <= 0.0 {
            return Err(DrapeError::validation(
                "glyph_advance_em and line_height must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
