use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{DrapeError, DrapeResult};

/// Canvas size and the padding reserved around the garment.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasLayout {
    #[serde(default = "default_canvas_width")]
    pub width: f64,
    #[serde(default = "default_canvas_height")]
    pub height: f64,
    #[serde(default = "default_canvas_padding")]
    pub padding: f64,
}

fn default_canvas_width() -> f64 {
    800.0
}

fn default_canvas_height() -> f64 {
    600.0
}

fn default_canvas_padding() -> f64 {
    40.0
}

impl Default for CanvasLayout {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            padding: default_canvas_padding(),
        }
    }
}

impl CanvasLayout {
    pub fn validate(&self) -> DrapeResult<()> {
        if !(self.width.is_finite() && self.height.is_finite() && self.padding.is_finite()) {
            return Err(DrapeError::validation("canvas dimensions must be finite"));
        }
        if self.padding < 0.0 || self.width <= 2.0 * self.padding || self.height <= 2.0 * self.padding
        {
            return Err(DrapeError::validation(
                "canvas must be larger than twice its padding",
            ));
        }
        if self.width > f64::from(u16::MAX) || self.height > f64::from(u16::MAX) {
            return Err(DrapeError::validation("canvas dimensions exceed u16"));
        }
        Ok(())
    }

    /// Area available to the garment.
    pub fn padded_rect(&self) -> Rect {
        Rect::new(
            self.padding,
            self.padding,
            self.width - self.padding,
            self.height - self.padding,
        )
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width.round() as u32, self.height.round() as u32)
    }
}

/// Physical garment dimensions in inches.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl PhysicalSize {
    fn is_usable(&self) -> bool {
        self.width_in.is_finite()
            && self.height_in.is_finite()
            && self.width_in > 0.0
            && self.height_in > 0.0
    }
}

/// The single inches/pixels mapping for one view.
///
/// Placeholders, the interaction layer, the overlay and the raster pipeline all convert through
/// this type. Nothing else in the crate multiplies by a pixels-per-inch factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewGeometry {
    px_per_inch: f64,
    padding: f64,
    degenerate: bool,
}

impl ViewGeometry {
    /// Derive the scale for a view.
    ///
    /// A missing physical size uses `default_size`. A size that is present but zero, negative, or
    /// non-finite uses `fallback_px_per_inch` and marks the geometry as degenerate.
    pub fn for_view(
        layout: &CanvasLayout,
        physical: Option<PhysicalSize>,
        default_size: PhysicalSize,
        fallback_px_per_inch: f64,
    ) -> Self {
        let size = physical.unwrap_or(default_size);
        if !size.is_usable() {
            tracing::debug!(?size, fallback_px_per_inch, "degenerate physical size");
            return Self {
                px_per_inch: fallback_px_per_inch,
                padding: layout.padding,
                degenerate: true,
            };
        }

        let avail_w = layout.width - 2.0 * layout.padding;
        let avail_h = layout.height - 2.0 * layout.padding;
        let px_per_inch = (avail_w / size.width_in).min(avail_h / size.height_in);
        Self {
            px_per_inch,
            padding: layout.padding,
            degenerate: false,
        }
    }

    /// Geometry with an explicit scale, used by tests and fixed-scale hosts.
    pub fn with_scale(px_per_inch: f64, padding: f64) -> Self {
        Self {
            px_per_inch,
            padding,
            degenerate: false,
        }
    }

    pub fn px_per_inch(&self) -> f64 {
        self.px_per_inch
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Whether the fallback scale is in use.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Canvas coordinate of a position measured in inches from the garment origin.
    pub fn to_pixels(&self, value_in: f64) -> f64 {
        self.padding + value_in * self.px_per_inch
    }

    /// Inverse of [`ViewGeometry::to_pixels`].
    pub fn to_inches(&self, px: f64) -> f64 {
        (px - self.padding) / self.px_per_inch
    }

    /// Pixel length of a distance in inches (no padding offset).
    pub fn length_to_pixels(&self, len_in: f64) -> f64 {
        len_in * self.px_per_inch
    }

    pub fn length_to_inches(&self, len_px: f64) -> f64 {
        len_px / self.px_per_inch
    }

    pub fn point_to_pixels(&self, x_in: f64, y_in: f64) -> Point {
        Point::new(self.to_pixels(x_in), self.to_pixels(y_in))
    }
}

/// Aspect-fit the garment photo into the padded canvas area and center it.
///
/// The displacement map is generated for exactly this rectangle.
pub fn fit_garment(layout: &CanvasLayout, image_w: u32, image_h: u32) -> Rect {
    fit_contain(f64::from(image_w), f64::from(image_h), layout.padded_rect())
}

/// Largest rectangle with the content's aspect ratio that fits in `region`, centered.
pub fn fit_contain(content_w: f64, content_h: f64, region: Rect) -> Rect {
    if content_w <= 0.0 || content_h <= 0.0 {
        return Rect::from_center_size(region.center(), (0.0, 0.0));
    }
    let scale = (region.width() / content_w).min(region.height() / content_h);
    Rect::from_center_size(region.center(), (content_w * scale, content_h * scale))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/units.rs"]
mod tests;
