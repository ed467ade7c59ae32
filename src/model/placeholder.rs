use crate::foundation::core::{BezPath, PlaceholderId, Point, Rect, Vec2};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::bounds::points_bounds;
use crate::geometry::units::ViewGeometry;

/// A point measured in inches from the garment origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InchPoint {
    pub x_in: f64,
    pub y_in: f64,
}

impl InchPoint {
    pub fn new(x_in: f64, y_in: f64) -> Self {
        Self { x_in, y_in }
    }
}

/// Stored geometry of a print region. Always inches; pixels are derived per view.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "shapeType", rename_all = "kebab-case")]
pub enum PlaceholderShape {
    #[serde(rename_all = "camelCase")]
    Rect {
        x_in: f64,
        y_in: f64,
        width_in: f64,
        height_in: f64,
    },
    #[serde(rename_all = "camelCase")]
    Polygon { polygon_points: Vec<InchPoint> },
}

/// A print region on one garment view.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub id: PlaceholderId,
    #[serde(flatten)]
    pub shape: PlaceholderShape,
    #[serde(default)]
    pub rotation_deg: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Freezes the size of this region and of every element bound to it.
    #[serde(default)]
    pub lock_size: bool,
}

fn default_scale() -> f64 {
    1.0
}

/// Exact outline of a region in canvas pixels.
///
/// The raster mask and the interactive overlay are both built from this value, so they share one
/// boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipShape {
    Rect(Rect),
    Polygon(Vec<Point>),
}

impl ClipShape {
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::Polygon(pts) => points_bounds(pts).unwrap_or(Rect::ZERO),
        }
    }

    /// Outline vertices in drawing order.
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Self::Rect(r) => vec![
                Point::new(r.x0, r.y0),
                Point::new(r.x1, r.y0),
                Point::new(r.x1, r.y1),
                Point::new(r.x0, r.y1),
            ],
            Self::Polygon(pts) => pts.clone(),
        }
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let verts = self.vertices();
        let mut it = verts.iter();
        if let Some(first) = it.next() {
            path.move_to(*first);
            for p in it {
                path.line_to(*p);
            }
            path.close_path();
        }
        path
    }

    /// Even-odd point-in-shape test on the outline vertices.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Rect(r) => p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1,
            Self::Polygon(pts) => {
                let mut inside = false;
                let n = pts.len();
                let mut j = n.wrapping_sub(1);
                for i in 0..n {
                    let (a, b) = (pts[i], pts[j]);
                    if (a.y > p.y) != (b.y > p.y) {
                        let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                        if p.x < x_cross {
                            inside = !inside;
                        }
                    }
                    j = i;
                }
                inside
            }
        }
    }
}

fn is_axis_aligned(rotation_deg: f64) -> bool {
    let r = rotation_deg.rem_euclid(360.0);
    r < 1e-9 || 360.0 - r < 1e-9
}

fn rotate_about(p: Point, center: Point, sin: f64, cos: f64, scale: f64) -> Point {
    let d = (p - center) * scale;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

impl Placeholder {
    pub fn rect(id: impl Into<PlaceholderId>, x_in: f64, y_in: f64, w_in: f64, h_in: f64) -> Self {
        Self {
            id: id.into(),
            shape: PlaceholderShape::Rect {
                x_in,
                y_in,
                width_in: w_in,
                height_in: h_in,
            },
            rotation_deg: 0.0,
            scale: 1.0,
            lock_size: false,
        }
    }

    pub fn polygon(id: impl Into<PlaceholderId>, points: Vec<InchPoint>) -> Self {
        Self {
            id: id.into(),
            shape: PlaceholderShape::Polygon {
                polygon_points: points,
            },
            rotation_deg: 0.0,
            scale: 1.0,
            lock_size: false,
        }
    }

    pub fn validate(&self) -> DrapeResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(DrapeError::validation(format!(
                "placeholder '{}' scale must be finite and > 0",
                self.id
            )));
        }
        if !self.rotation_deg.is_finite() {
            return Err(DrapeError::validation(format!(
                "placeholder '{}' rotation must be finite",
                self.id
            )));
        }
        match &self.shape {
            PlaceholderShape::Rect {
                x_in,
                y_in,
                width_in,
                height_in,
            } => {
                if ![*x_in, *y_in, *width_in, *height_in]
                    .iter()
                    .all(|v| v.is_finite())
                    || *width_in <= 0.0
                    || *height_in <= 0.0
                {
                    return Err(DrapeError::validation(format!(
                        "placeholder '{}' rectangle must have finite, positive size",
                        self.id
                    )));
                }
            }
            PlaceholderShape::Polygon { polygon_points } => {
                if polygon_points.len() < 3 {
                    return Err(DrapeError::validation(format!(
                        "placeholder '{}' polygon needs at least 3 points",
                        self.id
                    )));
                }
                if !polygon_points
                    .iter()
                    .all(|p| p.x_in.is_finite() && p.y_in.is_finite())
                {
                    return Err(DrapeError::validation(format!(
                        "placeholder '{}' polygon points must be finite",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Exact clip outline in canvas pixels.
    ///
    /// Rectangles are scaled and rotated about their own center; polygon points about the center
    /// of their pixel bounds.
    pub fn clip_shape(&self, geom: &ViewGeometry) -> ClipShape {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        match &self.shape {
            PlaceholderShape::Rect {
                x_in,
                y_in,
                width_in,
                height_in,
            } => {
                let origin = geom.point_to_pixels(*x_in, *y_in);
                let size = (
                    geom.length_to_pixels(*width_in) * self.scale,
                    geom.length_to_pixels(*height_in) * self.scale,
                );
                let rect = Rect::from_origin_size(origin, size);
                if is_axis_aligned(self.rotation_deg) {
                    return ClipShape::Rect(rect);
                }
                let c = rect.center();
                let corners = ClipShape::Rect(rect)
                    .vertices()
                    .into_iter()
                    .map(|p| rotate_about(p, c, sin, cos, 1.0))
                    .collect();
                ClipShape::Polygon(corners)
            }
            PlaceholderShape::Polygon { polygon_points } => {
                let px: Vec<Point> = polygon_points
                    .iter()
                    .map(|p| geom.point_to_pixels(p.x_in, p.y_in))
                    .collect();
                let Some(b) = points_bounds(&px) else {
                    return ClipShape::Polygon(Vec::new());
                };
                let c = b.center();
                ClipShape::Polygon(
                    px.into_iter()
                        .map(|p| rotate_about(p, c, sin, cos, self.scale))
                        .collect(),
                )
            }
        }
    }

    /// Axis-aligned pixel bounds of the clip outline.
    pub fn pixel_bounds(&self, geom: &ViewGeometry) -> Rect {
        self.clip_shape(geom).bounds()
    }

    /// Move the region so its pixel bounds start at `origin`.
    pub fn move_to(&mut self, geom: &ViewGeometry, origin: Point) {
        let current = self.pixel_bounds(geom);
        let dx = geom.length_to_inches(origin.x - current.x0);
        let dy = geom.length_to_inches(origin.y - current.y0);
        match &mut self.shape {
            PlaceholderShape::Rect { x_in, y_in, .. } => {
                *x_in += dx;
                *y_in += dy;
            }
            PlaceholderShape::Polygon { polygon_points } => {
                for p in polygon_points {
                    p.x_in += dx;
                    p.y_in += dy;
                }
            }
        }
    }

    /// Resize the unrotated region to `width_px`×`height_px`.
    ///
    /// With `lock_size` only the display scale changes (uniformly, from the width ratio); the
    /// stored inch dimensions stay fixed.
    pub fn resize_to(&mut self, geom: &ViewGeometry, width_px: f64, height_px: f64) {
        if width_px <= 0.0 || height_px <= 0.0 {
            return;
        }
        let base = self.unscaled_size_px(geom);
        if base.x <= 0.0 || base.y <= 0.0 {
            return;
        }
        if self.lock_size {
            self.scale = width_px / base.x;
            return;
        }
        let sx = width_px / (base.x * self.scale);
        let sy = height_px / (base.y * self.scale);
        match &mut self.shape {
            PlaceholderShape::Rect {
                width_in,
                height_in,
                ..
            } => {
                *width_in *= sx;
                *height_in *= sy;
            }
            PlaceholderShape::Polygon { polygon_points } => {
                let Some((min_x, min_y)) = polygon_points.iter().fold(None, |acc, p| match acc {
                    None => Some((p.x_in, p.y_in)),
                    Some((x, y)) => Some((p.x_in.min(x), p.y_in.min(y))),
                }) else {
                    return;
                };
                for p in polygon_points {
                    p.x_in = min_x + (p.x_in - min_x) * sx;
                    p.y_in = min_y + (p.y_in - min_y) * sy;
                }
            }
        }
    }

    pub fn rotate_to(&mut self, rotation_deg: f64) {
        if rotation_deg.is_finite() {
            self.rotation_deg = rotation_deg.rem_euclid(360.0);
        }
    }

    /// Pixel size at scale 1 and no rotation.
    fn unscaled_size_px(&self, geom: &ViewGeometry) -> Vec2 {
        match &self.shape {
            PlaceholderShape::Rect {
                width_in,
                height_in,
                ..
            } => Vec2::new(
                geom.length_to_pixels(*width_in),
                geom.length_to_pixels(*height_in),
            ),
            PlaceholderShape::Polygon { polygon_points } => {
                let px: Vec<Point> = polygon_points
                    .iter()
                    .map(|p| geom.point_to_pixels(p.x_in, p.y_in))
                    .collect();
                points_bounds(&px)
                    .map(|r| Vec2::new(r.width(), r.height()))
                    .unwrap_or(Vec2::ZERO)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/placeholder.rs"]
mod tests;
