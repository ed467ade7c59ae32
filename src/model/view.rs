use std::collections::BTreeMap;

use crate::foundation::core::{PlaceholderId, ViewId};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::units::{CanvasLayout, PhysicalSize, ViewGeometry};
use crate::model::constrain::RegionBounds;
use crate::model::placeholder::Placeholder;

/// Per-view map from print region to the uploaded design's URL.
pub type DesignUrlMap = BTreeMap<PlaceholderId, String>;

/// One garment view as supplied by the catalog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSpec {
    pub id: ViewId,
    /// Garment photo for this view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garment_url: Option<String>,
    /// Physical garment size; absent means "use the configured default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical: Option<PhysicalSize>,
    /// Garment length in inches. Informational; not used for the canvas scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_in: Option<f64>,
    #[serde(default)]
    pub placeholders: Vec<Placeholder>,
}

impl ViewSpec {
    pub fn new(id: impl Into<ViewId>) -> Self {
        Self {
            id: id.into(),
            garment_url: None,
            physical: None,
            length_in: None,
            placeholders: Vec::new(),
        }
    }

    pub fn validate(&self) -> DrapeResult<()> {
        let mut seen = std::collections::BTreeSet::new();
        for p in &self.placeholders {
            p.validate()?;
            if !seen.insert(&p.id) {
                return Err(DrapeError::validation(format!(
                    "duplicate placeholder id '{}' in view '{}'",
                    p.id, self.id
                )));
            }
        }
        Ok(())
    }

    pub fn geometry(
        &self,
        layout: &CanvasLayout,
        default_size: PhysicalSize,
        fallback_px_per_inch: f64,
    ) -> ViewGeometry {
        ViewGeometry::for_view(layout, self.physical, default_size, fallback_px_per_inch)
    }

    pub fn placeholder(&self, id: &PlaceholderId) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| &p.id == id)
    }

    pub fn placeholder_mut(&mut self, id: &PlaceholderId) -> Option<&mut Placeholder> {
        self.placeholders.iter_mut().find(|p| &p.id == id)
    }

    /// Clamp bounds for elements bound to `id`.
    pub fn region_bounds(&self, id: &PlaceholderId, geom: &ViewGeometry) -> Option<RegionBounds> {
        self.placeholder(id).map(|p| RegionBounds {
            bounds: p.pixel_bounds(geom),
            lock_size: p.lock_size,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/view.rs"]
mod tests;
